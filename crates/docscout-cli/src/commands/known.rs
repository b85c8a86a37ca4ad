//! Known command implementation

use anyhow::Result;
use docscout_core::{Config, KnownDocs};

use crate::output::{OutputFormat, json, text};

/// List the override table, or fuzzy-search it when `query` is given.
///
/// Configured `[overrides]` are included.
pub fn execute(query: Option<&str>, limit: usize, config: &Config, format: OutputFormat) -> Result<()> {
    let known = KnownDocs::new().with_overrides(&config.overrides);

    let Some(query) = query else {
        match format {
            OutputFormat::Json => println!("{}", json::render(&json::known_entries(known.all_entries()))?),
            OutputFormat::Text => print!("{}", text::render_known_entries(known.all_entries())),
        }
        return Ok(());
    };

    let results: Vec<_> = known.search(query).into_iter().take(limit).collect();
    match format {
        OutputFormat::Json => println!("{}", json::render(&json::known_results(&results))?),
        OutputFormat::Text => print!("{}", text::render_known_results(query, &results)),
    }
    Ok(())
}
