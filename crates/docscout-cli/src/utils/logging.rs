//! Logging initialization and color control.

use anyhow::Result;
use colored::control as color_control;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::Cli;

/// Install the global tracing subscriber for this invocation.
///
/// Logs always go to stderr so stdout stays parseable. JSON output drops
/// the level to `ERROR` unless `--verbose` was given, and `RUST_LOG`
/// replaces the flag-derived level entirely when set.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let machine_output = cli.format.is_machine();
    let level = level_for(cli.verbose, cli.quiet, machine_output);

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        let subscriber = builder.with_env_filter(EnvFilter::from_default_env()).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = builder.with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let env_no_color = std::env::var_os("NO_COLOR").is_some();
    if cli.no_color || env_no_color || machine_output {
        color_control::set_override(false);
    }
    Ok(())
}

const fn level_for(verbose: bool, quiet: bool, machine_output: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet || machine_output {
        Level::ERROR
    } else {
        Level::WARN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_selection() {
        assert_eq!(level_for(false, false, false), Level::WARN);
        assert_eq!(level_for(true, false, false), Level::DEBUG);
        assert_eq!(level_for(false, true, false), Level::ERROR);
        assert_eq!(level_for(false, false, true), Level::ERROR);
        assert_eq!(level_for(true, false, true), Level::DEBUG);
    }
}
