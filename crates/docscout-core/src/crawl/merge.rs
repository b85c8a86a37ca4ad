//! Combining navigation and sitemap sections.

use crate::DocSection;
use crate::crawl::navigation::section_url;
use crate::crawl::sitemap::SitemapEntry;
use crate::discovery::filter::{is_likely_docs_path, normalize_path, title_from_path};
use std::collections::HashSet;
use url::Url;

/// Turn sitemap entries into sections for the crawled site.
///
/// Entries on another host or with a path that does not look like
/// documentation are dropped, then at most `max_entries` sections are kept.
/// Titles are synthesized from the last path segment.
pub fn sitemap_sections(entries: &[SitemapEntry], page_url: &Url, max_entries: usize) -> Vec<DocSection> {
    let host = page_url.host_str();
    let mut seen = HashSet::new();

    entries
        .iter()
        .filter_map(|entry| Url::parse(&entry.url).ok())
        .filter(|url| url.host_str() == host)
        .map(|url| normalize_path(url.path()))
        .filter(|path| is_likely_docs_path(path))
        .filter(|path| seen.insert(path.clone()))
        .take(max_entries)
        .map(|path| DocSection {
            title: title_from_path(&path),
            url: section_url(page_url, &path),
            path,
        })
        .collect()
}

/// Merge navigation and sitemap sections.
///
/// Navigation sections come first and win on conflicts; sitemap sections
/// only fill paths navigation did not cover. Duplicates are detected by
/// normalized path and the output is capped at `max_sections`.
pub fn merge_sections(
    navigation: Vec<DocSection>,
    sitemap: Vec<DocSection>,
    max_sections: usize,
) -> Vec<DocSection> {
    let mut seen = HashSet::new();
    navigation
        .into_iter()
        .chain(sitemap)
        .filter(|section| seen.insert(normalize_path(&section.path)))
        .take(max_sections)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn section(title: &str, path: &str) -> DocSection {
        DocSection {
            title: title.to_string(),
            path: path.to_string(),
            url: format!("https://lib.example.com{path}"),
        }
    }

    fn entry(url: &str) -> SitemapEntry {
        SitemapEntry {
            url: url.to_string(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }

    #[test]
    fn test_navigation_takes_priority() {
        let nav = vec![section("Intro (nav)", "/docs/intro"), section("API", "/docs/api")];
        let sitemap = vec![
            section("Intro", "/docs/intro/"),
            section("Hooks", "/docs/hooks"),
            section("Config", "/docs/config"),
        ];

        let merged = merge_sections(nav, sitemap, 200);
        let titles: Vec<_> = merged.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro (nav)", "API", "Hooks", "Config"]);
    }

    #[test]
    fn test_merge_is_capped() {
        let sitemap = (0..10).map(|i| section("x", &format!("/docs/{i}"))).collect();
        assert_eq!(merge_sections(Vec::new(), sitemap, 3).len(), 3);
    }

    #[test]
    fn test_sitemap_sections_filter_host_and_shape() {
        let page = Url::parse("https://lib.example.com/docs").unwrap();
        let entries = vec![
            entry("https://lib.example.com/docs/getting-started"),
            entry("https://lib.example.com/blog/launch"),
            entry("https://other.example.com/docs/intro"),
            entry("https://lib.example.com/docs/getting-started/#install"),
            entry("not a url"),
            entry("https://lib.example.com/api/client"),
        ];

        let sections = sitemap_sections(&entries, &page, 500);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Getting Started");
        assert_eq!(sections[0].url, "https://lib.example.com/docs/getting-started");
        assert_eq!(sections[1].path, "/api/client");
    }

    #[test]
    fn test_sitemap_entry_cap() {
        let page = Url::parse("https://lib.example.com/").unwrap();
        let entries: Vec<_> = (0..20)
            .map(|i| entry(&format!("https://lib.example.com/docs/page-{i}")))
            .collect();
        assert_eq!(sitemap_sections(&entries, &page, 5).len(), 5);
    }

    #[test]
    fn test_sitemap_cap_counts_only_kept_sections() {
        let page = Url::parse("https://lib.example.com/").unwrap();
        let entries: Vec<_> = (0..10)
            .map(|i| entry(&format!("https://lib.example.com/blog/post-{i}")))
            .chain((0..3).map(|i| entry(&format!("https://lib.example.com/docs/page-{i}"))))
            .collect();

        let sections = sitemap_sections(&entries, &page, 5);
        let paths: Vec<_> = sections.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/docs/page-0", "/docs/page-1", "/docs/page-2"]);
    }

    #[test]
    fn test_sitemap_keeps_marketing_words_under_docs() {
        let page = Url::parse("https://lib.example.com/docs").unwrap();
        let entries = vec![
            entry("https://lib.example.com/docs/about"),
            entry("https://lib.example.com/docs/guides/register"),
            entry("https://lib.example.com/docs/api/static"),
            entry("https://lib.example.com/docs/team/permissions"),
            entry("https://lib.example.com/about"),
        ];

        let sections = sitemap_sections(&entries, &page, 500);
        let paths: Vec<_> = sections.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/docs/about",
                "/docs/guides/register",
                "/docs/api/static",
                "/docs/team/permissions"
            ]
        );
    }
}
