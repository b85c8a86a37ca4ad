//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Find documentation for one or more packages
//! docscout discover react @aws-sdk/client-s3 left-pad
//!
//! # Map a documentation site into sections
//! docscout crawl https://vitest.dev/guide/
//!
//! # Browse or search the curated override table
//! docscout known
//! docscout known "state management"
//! ```
//!
//! Global options (`--verbose`, `--quiet`, `--no-color`, `--format`,
//! `--config`) may appear before or after the subcommand.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `docscout` command
#[derive(Parser, Clone, Debug)]
#[command(name = "docscout")]
#[command(version)]
#[command(about = "docscout - find and map npm package documentation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logs on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output format
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value_t = OutputFormat::Text,
        env = "DOCSCOUT_FORMAT",
        global = true
    )]
    pub format: OutputFormat,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "PATH", env = "DOCSCOUT_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Discover documentation URLs for npm packages
    #[command(visible_alias = "d")]
    Discover {
        /// Package names, scope included (e.g. `@tanstack/react-query`)
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },

    /// Crawl a documentation site and list its sections
    Crawl {
        /// Absolute http(s) URL of the documentation page
        url: String,

        /// Only print the first N sections in text output
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,
    },

    /// List or fuzzy-search the curated documentation overrides
    Known {
        /// Search query; lists every entry when omitted
        query: Option<String>,

        /// Maximum number of search results
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["docscout", "discover", "react", "zod", "--format", "json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Discover { names } => assert_eq!(names, vec!["react", "zod"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_discover_requires_a_name() {
        assert!(Cli::try_parse_from(["docscout", "discover"]).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["docscout", "-v", "-q", "known"]).is_err());
    }
}
