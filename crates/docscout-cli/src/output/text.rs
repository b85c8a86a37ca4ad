//! Human-readable rendering.

use colored::{ColoredString, Colorize};
use docscout_core::discovery::{KnownEntry, KnownSearchResult};
use docscout_core::{Confidence, CrawlResult, DiscoveredPackage};

fn confidence_label(confidence: Confidence) -> ColoredString {
    let label = format!("[{confidence}]");
    match confidence {
        Confidence::High => label.green().bold(),
        Confidence::Medium => label.yellow(),
        Confidence::Low => label.red(),
    }
}

/// One discovered package as a short block.
pub fn render_package(pkg: &DiscoveredPackage) -> String {
    let mut lines = vec![format!(
        "{}@{}  {}  {}",
        pkg.name.bold(),
        pkg.version,
        confidence_label(pkg.confidence),
        pkg.source.to_string().dimmed()
    )];
    let docs = pkg.docs_url.as_deref().unwrap_or("-");
    lines.push(format!("  docs:   {}", docs.cyan()));
    if let Some(github) = &pkg.github_url {
        lines.push(format!("  github: {github}"));
    }
    lines.push(format!("  npm:    {}", pkg.npm_url));
    if let Some(description) = pkg.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("  {}", description.dimmed()));
    }
    finish(&lines)
}

/// Crawl summary followed by one line per section.
pub fn render_crawl(result: &CrawlResult, limit: Option<usize>) -> String {
    let title = result.title.as_deref().unwrap_or("(untitled)");
    let verdict = if result.is_valid_docs {
        "yes".green()
    } else {
        "no".red()
    };
    let mut lines = vec![
        title.bold().to_string(),
        format!("  url:        {}", result.base_url),
        format!("  docs page:  {verdict}"),
        format!(
            "  navigation: {}   sitemap: {}",
            yes_no(result.navigation_found),
            yes_no(result.sitemap_found)
        ),
        String::new(),
    ];

    if result.sections.is_empty() {
        lines.push("No sections found".to_string());
        return finish(&lines);
    }

    lines.push(format!("{} sections:", result.sections.len()));
    let shown = limit.unwrap_or(result.sections.len());
    let width = result
        .sections
        .iter()
        .take(shown)
        .map(|s| s.title.chars().count())
        .max()
        .unwrap_or(0);
    lines.extend(
        result
            .sections
            .iter()
            .take(shown)
            .map(|section| format!("  {:<width$}  {}", section.title, section.url.dimmed())),
    );
    if shown < result.sections.len() {
        lines.push(format!("  ... {} more", result.sections.len() - shown));
    }
    finish(&lines)
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Every entry of the override table.
pub fn render_known_entries(entries: &[KnownEntry]) -> String {
    let width = entries
        .iter()
        .map(|e| e.package.chars().count())
        .max()
        .unwrap_or(0);
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| format!("{:<width$}  {}", entry.package, entry.docs_url))
        .collect();
    finish(&lines)
}

/// Ranked search hits over the override table.
pub fn render_known_results(query: &str, results: &[KnownSearchResult]) -> String {
    if results.is_empty() {
        return format!("No matches found for '{query}'\n");
    }
    let mut lines = Vec::with_capacity(results.len() * 3);
    for (i, result) in results.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, result.entry.package.bold()));
        lines.push(format!("   {}", result.entry.docs_url.cyan()));
        lines.push(format!("   {}", result.entry.description.dimmed()));
    }
    finish(&lines)
}

/// Join lines, terminating each with a newline.
fn finish(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}
