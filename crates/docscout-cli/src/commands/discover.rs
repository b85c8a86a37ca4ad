//! Discover command implementation

use anyhow::Result;
use docscout_core::{Config, DiscoveredPackage, DiscoveryEngine};
use std::collections::HashSet;

use crate::output::{OutputFormat, json, text};

/// Discover documentation for `names` and print one record per distinct
/// name, in the order given.
pub async fn execute(names: &[String], config: Config, format: OutputFormat) -> Result<()> {
    let engine = DiscoveryEngine::with_config(config)?;
    let results = engine.discover_packages(names).await;

    let mut seen = HashSet::new();
    let ordered: Vec<&DiscoveredPackage> = names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .filter_map(|name| results.get(name).map(|pkg| pkg.as_ref()))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", json::render(&ordered)?),
        OutputFormat::Text => {
            let blocks: Vec<String> = ordered.iter().map(|pkg| text::render_package(pkg)).collect();
            print!("{}", blocks.join("\n"));
        },
    }
    Ok(())
}
