//! Sitemap XML parsing.
//!
//! Handles both `<urlset>` sitemaps and `<sitemapindex>` files. Index files
//! are followed recursively (bounded depth and fan-out) and their children
//! fetched concurrently.
//!
//! ```
//! use docscout_core::crawl::sitemap::parse_sitemap;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url><loc>https://example.com/docs/intro</loc><lastmod>2024-01-15</lastmod></url>
//! </urlset>"#;
//!
//! let entries = parse_sitemap(xml).unwrap();
//! assert_eq!(entries[0].url, "https://example.com/docs/intro");
//! ```

use crate::{Error, Fetcher, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, instrument, warn};

/// Maximum recursion depth for sitemap index files.
pub const MAX_INDEX_DEPTH: u8 = 2;

/// Maximum number of child sitemaps fetched from one index.
pub const MAX_CHILD_SITEMAPS: usize = 50;

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    /// Page URL from `<loc>`.
    pub url: String,
    /// Last modification time, if parseable.
    pub lastmod: Option<DateTime<Utc>>,
    /// Change frequency hint.
    pub changefreq: Option<ChangeFrequency>,
    /// Clamped to `0.0..=1.0`.
    pub priority: Option<f32>,
}

/// `<changefreq>` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum ChangeFrequency {
    /// Changes on every access.
    Always,
    /// Changes hourly.
    Hourly,
    /// Changes daily.
    Daily,
    /// Changes weekly.
    Weekly,
    /// Changes monthly.
    Monthly,
    /// Changes yearly.
    Yearly,
    /// Archived; never changes.
    Never,
}

impl std::str::FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(Error::Parse(format!("Invalid changefreq value: {s}"))),
        }
    }
}

#[derive(Debug)]
enum SitemapContent {
    Entries(Vec<SitemapEntry>),
    /// Child sitemap locations.
    Index(Vec<String>),
}

/// Parse a `<urlset>` sitemap.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed XML or when given a sitemap index.
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapEntry>> {
    match parse_sitemap_content(xml)? {
        SitemapContent::Entries(entries) => Ok(entries),
        SitemapContent::Index(_) => Err(Error::Parse(
            "XML is a sitemap index; use fetch_sitemap to follow it".to_string(),
        )),
    }
}

/// True when the document's root is `<sitemapindex>`.
pub fn is_sitemap_index(xml: &str) -> bool {
    xml.contains("<sitemapindex") || xml.contains(":sitemapindex")
}

/// Fetch a sitemap and flatten any index into its entries.
///
/// Child sitemaps that fail to load are skipped with a warning.
///
/// # Errors
///
/// Fails if the top-level sitemap cannot be fetched or parsed.
#[instrument(skip(fetcher))]
pub async fn fetch_sitemap(fetcher: &Fetcher, url: &str) -> Result<Vec<SitemapEntry>> {
    fetch_recursive(fetcher.clone(), url.to_string(), 0).await
}

type SitemapFuture = Pin<Box<dyn Future<Output = Result<Vec<SitemapEntry>>> + Send>>;

fn fetch_recursive(fetcher: Fetcher, url: String, depth: u8) -> SitemapFuture {
    Box::pin(async move {
        if depth > MAX_INDEX_DEPTH {
            return Err(Error::ResourceLimited(format!(
                "Sitemap index nesting exceeds {MAX_INDEX_DEPTH} levels"
            )));
        }

        debug!(url = %url, depth, "Fetching sitemap");
        let xml = fetcher.get_text(&url).await?;

        match parse_sitemap_content(&xml)? {
            SitemapContent::Entries(entries) => Ok(entries),
            SitemapContent::Index(children) => {
                debug!(children = children.len(), "Following sitemap index");
                let handles: Vec<_> = children
                    .into_iter()
                    .take(MAX_CHILD_SITEMAPS)
                    .map(|child| tokio::spawn(fetch_recursive(fetcher.clone(), child, depth + 1)))
                    .collect();

                let mut entries = Vec::new();
                for handle in handles {
                    match handle.await {
                        Ok(Ok(child_entries)) => entries.extend(child_entries),
                        Ok(Err(e)) => warn!(error = %e, "Skipping child sitemap"),
                        Err(e) => warn!(error = %e, "Child sitemap task failed"),
                    }
                }
                Ok(entries)
            },
        }
    })
}

fn parse_sitemap_content(xml: &str) -> Result<SitemapContent> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    if is_sitemap_index(xml) {
        parse_index(&mut reader).map(SitemapContent::Index)
    } else {
        parse_urlset(&mut reader).map(SitemapContent::Entries)
    }
}

fn parse_urlset(reader: &mut Reader<&[u8]>) -> Result<Vec<SitemapEntry>> {
    let mut entries = Vec::new();
    let mut current: Option<SitemapEntry> = None;
    let mut element: Option<String> = None;
    let mut loc = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "url" => {
                        current = Some(SitemapEntry {
                            url: String::new(),
                            lastmod: None,
                            changefreq: None,
                            priority: None,
                        });
                        loc.clear();
                    },
                    "loc" | "lastmod" | "changefreq" | "priority" if current.is_some() => {
                        element = Some(name);
                    },
                    _ => {},
                }
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"url" {
                    if let Some(mut entry) = current.take() {
                        if !loc.is_empty() {
                            entry.url = std::mem::take(&mut loc);
                            entries.push(entry);
                        }
                    }
                }
                element = None;
            },
            Ok(Event::Text(e)) => {
                if let (Some(name), Some(entry)) = (element.as_deref(), current.as_mut()) {
                    let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    let text = text.trim();
                    match name {
                        "loc" => loc.push_str(text),
                        "lastmod" => entry.lastmod = parse_lastmod(text),
                        "changefreq" => entry.changefreq = text.parse().ok(),
                        "priority" => entry.priority = parse_priority(text),
                        _ => {},
                    }
                }
            },
            Ok(Event::CData(e)) => {
                if element.as_deref() == Some("loc") {
                    loc.push_str(String::from_utf8_lossy(&e).trim());
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            _ => {},
        }
    }

    Ok(entries)
}

fn parse_index(reader: &mut Reader<&[u8]>) -> Result<Vec<String>> {
    let mut locations = Vec::new();
    let mut in_sitemap = false;
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sitemap" => in_sitemap = true,
                b"loc" if in_sitemap => in_loc = true,
                _ => {},
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"sitemap" {
                    in_sitemap = false;
                }
                in_loc = false;
            },
            Ok(Event::Text(e)) if in_loc => {
                let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                let text = text.trim();
                if !text.is_empty() {
                    locations.push(text.to_string());
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            _ => {},
        }
    }

    Ok(locations)
}

/// Accepts RFC 3339, bare dates, and naive datetimes (assumed UTC).
fn parse_lastmod(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }
    debug!(date_str = %s, "Unparseable lastmod");
    None
}

fn parse_priority(s: &str) -> Option<f32> {
    s.parse::<f32>()
        .ok()
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 1.0))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unnecessary_wraps,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parses_entry_metadata() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://example.com/docs/a</loc>
            <lastmod>2024-01-15T10:30:00+00:00</lastmod>
            <changefreq>Weekly</changefreq>
            <priority>1.7</priority>
          </url>
          <url><loc>https://example.com/docs/b</loc></url>
          <url><lastmod>2024-01-01</lastmod></url>
        </urlset>"#;

        let entries = parse_sitemap(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].lastmod.unwrap().day(), 15);
        assert_eq!(entries[0].changefreq, Some(ChangeFrequency::Weekly));
        assert_eq!(entries[0].priority, Some(1.0));
        assert_eq!(entries[1].url, "https://example.com/docs/b");
        assert!(entries[1].lastmod.is_none());
    }

    #[test]
    fn test_lastmod_formats() {
        assert!(parse_lastmod("2024-01-15").is_some());
        assert!(parse_lastmod("2024-01-15T10:30:00Z").is_some());
        assert!(parse_lastmod("2024-01-15T10:30:00.123").is_some());
        assert!(parse_lastmod("last tuesday").is_none());
    }

    #[test]
    fn test_escaped_and_cdata_locations() {
        let xml = r#"<urlset>
          <url><loc>https://example.com/docs?a=1&amp;b=2</loc></url>
          <url><loc><![CDATA[https://example.com/docs/cdata]]></loc></url>
        </urlset>"#;
        let entries = parse_sitemap(xml).unwrap();
        assert_eq!(entries[0].url, "https://example.com/docs?a=1&b=2");
        assert_eq!(entries[1].url, "https://example.com/docs/cdata");
    }

    #[test]
    fn test_index_is_rejected_by_parse_sitemap() {
        let xml = r#"<sitemapindex><sitemap><loc>https://example.com/a.xml</loc></sitemap></sitemapindex>"#;
        assert!(is_sitemap_index(xml));
        assert!(matches!(parse_sitemap(xml), Err(Error::Parse(_))));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        assert!(parse_sitemap("<urlset><url><loc>x</url>").is_err());
        assert!(parse_sitemap("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_follows_index_and_skips_broken_children() {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<sitemapindex>\
                   <sitemap><loc>{base}/one.xml</loc></sitemap>\
                   <sitemap><loc>{base}/missing.xml</loc></sitemap>\
                   <sitemap><loc>{base}/two.xml</loc></sitemap>\
                 </sitemapindex>"
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/one.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<urlset><url><loc>{base}/docs/a</loc></url></urlset>"
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/two.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<urlset><url><loc>{base}/docs/b</loc></url><url><loc>{base}/docs/c</loc></url></urlset>"
            )))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let entries = fetch_sitemap(&fetcher, &format!("{base}/sitemap.xml"))
            .await
            .unwrap();
        let urls: Vec<_> = entries.iter().map(|e| e.url.clone()).collect();
        assert_eq!(
            urls,
            vec![
                format!("{base}/docs/a"),
                format!("{base}/docs/b"),
                format!("{base}/docs/c"),
            ]
        );
    }

    #[tokio::test]
    async fn test_self_referencing_index_is_bounded() {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/loop.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<sitemapindex><sitemap><loc>{base}/loop.xml</loc></sitemap></sitemapindex>"
            )))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let entries = fetch_sitemap(&fetcher, &format!("{base}/loop.xml"))
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_missing_sitemap_is_error() {
        let server = MockServer::start().await;
        let fetcher = Fetcher::new().unwrap();
        let result = fetch_sitemap(&fetcher, &format!("{}/sitemap.xml", server.uri())).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
