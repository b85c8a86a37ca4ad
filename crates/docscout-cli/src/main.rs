//! docscout CLI - find and map npm package documentation
//!
//! This is the main entry point for the `docscout` command-line interface.
//! Command implementations live in [`commands`]; rendering lives in
//! [`output`].

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::initialize_logging(&cli)?;

    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let config = utils::load_config(cli.config.as_deref())?;
    let format = cli.format;

    match cli.command {
        Commands::Discover { names } => {
            commands::discover_packages(&names, config, format).await?;
        },

        Commands::Crawl { url, limit } => {
            commands::crawl_site(&url, limit, &config, format).await?;
        },

        Commands::Known { query, limit } => {
            commands::list_known(query.as_deref(), limit, &config, format)?;
        },
    }

    Ok(())
}
