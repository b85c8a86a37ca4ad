//! Crawl command implementation

use anyhow::{Context, Result};
use docscout_core::{Config, SiteCrawler};

use crate::output::{OutputFormat, json, text};

/// Crawl `url` and print its structure.
pub async fn execute(url: &str, limit: Option<usize>, config: &Config, format: OutputFormat) -> Result<()> {
    let crawler = SiteCrawler::from_config(config)?;
    let result = crawler
        .crawl(url)
        .await
        .with_context(|| format!("Cannot crawl '{url}'"))?;

    match format {
        OutputFormat::Json => println!("{}", json::render(&result)?),
        OutputFormat::Text => print!("{}", text::render_crawl(&result, limit)),
    }
    Ok(())
}
