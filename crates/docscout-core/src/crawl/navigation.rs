//! Sidebar and navigation link extraction.

use crate::DocSection;
use crate::discovery::filter::{is_likely_docs_path, is_nested_path, normalize_path, title_from_path};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Navigation container selectors, most specific first.
pub const NAV_SELECTORS: &[&str] = &[
    "nav.sidebar",
    ".sidebar",
    "aside nav",
    "[class*=\"sidebar\"]",
    "[class*=\"Sidebar\"]",
    ".menu__list",
    ".VPSidebar",
    ".sidebar-nav",
    ".docs-nav",
    ".doc-nav",
    "[role=\"navigation\"]",
    "nav",
    ".toc",
    ".table-of-contents",
    "aside",
];

static COMPILED_NAV_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    NAV_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static ANCHOR_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("a[href]").ok());

/// True when any navigation selector matches an element of the page.
pub fn has_navigation(document: &Html) -> bool {
    COMPILED_NAV_SELECTORS
        .iter()
        .any(|selector| document.select(selector).next().is_some())
}

/// Sections linked from the first navigation container found.
///
/// Only the first selector that matches anything is used; all of its
/// matching elements contribute links. Links are kept when they stay on
/// `page_url`'s origin, are not bare anchors, and point at a doc-shaped or
/// nested path. Output is in document order with duplicate paths removed.
pub fn extract_navigation(document: &Html, page_url: &Url) -> Vec<DocSection> {
    let Some(anchor) = ANCHOR_SELECTOR.as_ref() else {
        return Vec::new();
    };
    let Some(selector) = COMPILED_NAV_SELECTORS
        .iter()
        .find(|selector| document.select(selector).next().is_some())
    else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut sections = Vec::new();
    for container in document.select(selector) {
        for link in container.select(anchor) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(path) = resolve_internal_path(href, page_url) else {
                continue;
            };
            if !(is_likely_docs_path(&path) || is_nested_path(&path)) {
                continue;
            }
            if !seen.insert(path.clone()) {
                continue;
            }

            let text = collapse_whitespace(&link.text().collect::<String>());
            let title = if text.is_empty() {
                title_from_path(&path)
            } else {
                text
            };
            sections.push(DocSection {
                title,
                url: section_url(page_url, &path),
                path,
            });
        }
    }
    sections
}

/// Resolve `href` against `page_url` and return its normalized path when it
/// stays on the same origin.
pub fn resolve_internal_path(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let resolved = page_url.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") || resolved.origin() != page_url.origin() {
        return None;
    }
    Some(normalize_path(resolved.path()))
}

/// Absolute URL for a normalized in-origin path.
pub fn section_url(page_url: &Url, path: &str) -> String {
    let mut url = page_url.clone();
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url.to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::disallowed_macros)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://lib.example.com/docs/intro").unwrap()
    }

    fn paths(sections: &[DocSection]) -> Vec<&str> {
        sections.iter().map(|s| s.path.as_str()).collect()
    }

    #[test]
    fn test_sidebar_links_filtered_and_normalized() {
        let html = Html::parse_document(
            r##"<html><body>
            <header><nav><a href="/pricing">Pricing</a></nav></header>
            <nav class="sidebar">
              <a href="/docs/intro">Introduction</a>
              <a href="getting-started/">  Getting
                 Started </a>
              <a href="/docs/api?tab=ts#top">API</a>
              <a href="#on-this-page">On this page</a>
              <a href="https://elsewhere.example.com/docs/x">External</a>
              <a href="mailto:help@lib.example.com">Mail</a>
              <a href="/about">About</a>
              <a href="/docs/intro/">Intro again</a>
            </nav>
            </body></html>"##,
        );

        let sections = extract_navigation(&html, &page());
        assert_eq!(
            paths(&sections),
            vec!["/docs/intro", "/docs/getting-started", "/docs/api"]
        );
        assert_eq!(sections[1].title, "Getting Started");
        assert_eq!(sections[2].url, "https://lib.example.com/docs/api");
    }

    #[test]
    fn test_first_matching_selector_wins() {
        let html = Html::parse_document(
            r#"<nav><a href="/guide/one">One</a></nav>
               <div class="menu__list"><a href="/guide/two">Two</a></div>"#,
        );
        assert_eq!(paths(&extract_navigation(&html, &page())), vec!["/guide/two"]);
    }

    #[test]
    fn test_nested_unconventional_paths_are_kept() {
        let html = Html::parse_document(
            r#"<aside><a href="/handbook-x/chapter-1">Ch 1</a><a href="/team">Team</a></aside>"#,
        );
        assert_eq!(
            paths(&extract_navigation(&html, &page())),
            vec!["/handbook-x/chapter-1"]
        );
    }

    #[test]
    fn test_empty_link_text_uses_path_title() {
        let html = Html::parse_document(r#"<nav class="sidebar"><a href="/docs/data-fetching"><img></a></nav>"#);
        let sections = extract_navigation(&html, &page());
        assert_eq!(sections[0].title, "Data Fetching");
    }

    #[test]
    fn test_no_navigation() {
        let html = Html::parse_document("<main><a href='/docs/a'>A</a></main>");
        assert!(!has_navigation(&html));
        assert!(extract_navigation(&html, &page()).is_empty());
    }

    #[test]
    fn test_all_selectors_compile() {
        assert_eq!(COMPILED_NAV_SELECTORS.len(), NAV_SELECTORS.len());
    }

    #[test]
    fn test_resolve_internal_path() {
        let page = page();
        assert_eq!(resolve_internal_path("../api/", &page).as_deref(), Some("/api"));
        assert_eq!(resolve_internal_path("//cdn.example.com/docs", &page), None);
        assert_eq!(resolve_internal_path("http://lib.example.com/docs", &page), None);
        assert_eq!(resolve_internal_path("   ", &page), None);
    }
}
