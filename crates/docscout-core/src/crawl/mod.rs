//! Documentation site crawler.
//!
//! Given a documentation URL, [`SiteCrawler::crawl`] fetches the page and
//! maps the site's structure into [`DocSection`]s:
//!
//! 1. navigation links from the first matching sidebar/nav container
//! 2. documentation-shaped URLs from the first sitemap that loads
//! 3. if both are empty, conventional entry paths that answer a HEAD probe
//!
//! Every step is best-effort. A page that cannot be fetched produces an
//! empty, invalid result rather than an error.

pub mod merge;
pub mod navigation;
pub mod sitemap;

use crate::config::{Config, CrawlConfig};
use crate::discovery::filter::{is_docs_indicative, normalize_path, title_from_path};
use crate::{CrawlResult, DocSection, Error, Fetcher, Result};
use futures::future::join_all;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, instrument};
use url::Url;

pub use merge::{merge_sections, sitemap_sections};
pub use navigation::{NAV_SELECTORS, extract_navigation, has_navigation};
pub use sitemap::{ChangeFrequency, SitemapEntry, fetch_sitemap, parse_sitemap};

/// Heading terms that mark a page as reference documentation.
pub const DOC_HEADING_TERMS: &[&str] = &[
    "api",
    "usage",
    "installation",
    "getting started",
    "props",
    "methods",
    "options",
];

static TITLE_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("title").ok());
static H1_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("h1").ok());
static HEADING_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4").ok());
static CODE_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("pre, code").ok());

/// What a single page tells us before any further requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAnalysis {
    /// Page `<title>`, or the first `<h1>`.
    pub title: Option<String>,
    /// Documentation verdict from URL and page signals.
    pub is_valid_docs: bool,
    /// Sections from the first matching navigation container.
    pub navigation: Vec<DocSection>,
}

/// Inspect a fetched page: title, documentation verdict, navigation links.
pub fn analyze_page(html: &str, page_url: &Url) -> PageAnalysis {
    let document = Html::parse_document(html);

    let is_valid_docs = is_docs_indicative(page_url.as_str())
        || matches_any(&document, CODE_SELECTOR.as_ref())
        || has_navigation(&document)
        || has_doc_headings(&document);

    PageAnalysis {
        title: page_title(&document),
        is_valid_docs,
        navigation: extract_navigation(&document, page_url),
    }
}

fn first_text(document: &Html, selector: Option<&Selector>) -> Option<String> {
    let element = document.select(selector?).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn page_title(document: &Html) -> Option<String> {
    first_text(document, TITLE_SELECTOR.as_ref()).or_else(|| first_text(document, H1_SELECTOR.as_ref()))
}

fn matches_any(document: &Html, selector: Option<&Selector>) -> bool {
    selector.is_some_and(|s| document.select(s).next().is_some())
}

fn has_doc_headings(document: &Html) -> bool {
    let Some(selector) = HEADING_SELECTOR.as_ref() else {
        return false;
    };
    document.select(selector).any(|heading| {
        let text = heading.text().collect::<String>().to_lowercase();
        DOC_HEADING_TERMS.iter().any(|term| text.contains(term))
    })
}

/// Crawls documentation sites into navigable sections.
#[derive(Debug, Clone)]
pub struct SiteCrawler {
    fetcher: Fetcher,
    config: CrawlConfig,
}

impl SiteCrawler {
    /// Crawler with default settings.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        Self::from_config(&Config::default())
    }

    /// Crawler using the HTTP and crawl settings of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_fetcher(
            Fetcher::from_config(&config.discovery)?,
            config.crawl.clone(),
        ))
    }

    /// Crawler sharing an existing fetcher.
    pub const fn with_fetcher(fetcher: Fetcher, config: CrawlConfig) -> Self {
        Self { fetcher, config }
    }

    /// Crawl `url` and describe the site's documentation structure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] only when `url` is not an absolute
    /// http(s) URL. Network and parse failures are folded into the result.
    #[instrument(skip(self))]
    pub async fn crawl(&self, url: &str) -> Result<CrawlResult> {
        let page_url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("'{url}': {e}")))?;
        if !matches!(page_url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "'{url}': only http and https URLs can be crawled"
            )));
        }

        let html = match self.fetcher.get_text(url).await {
            Ok(html) => html,
            Err(e) => {
                debug!(error = %e, "Page fetch failed");
                return Ok(CrawlResult::unreachable(url));
            },
        };

        let page = analyze_page(&html, &page_url);
        let navigation_found = !page.navigation.is_empty();

        let sitemap = self.sitemap_sections(&page_url).await;
        let sitemap_found = !sitemap.is_empty();

        let mut sections = merge_sections(page.navigation, sitemap, self.config.max_sections);
        if sections.is_empty() {
            sections = self.probe_common_paths(&page_url).await;
        }

        info!(
            sections = sections.len(),
            navigation_found,
            sitemap_found,
            is_valid_docs = page.is_valid_docs,
            "Crawled documentation site"
        );

        Ok(CrawlResult {
            base_url: url.to_string(),
            is_valid_docs: page.is_valid_docs,
            title: page.title,
            sections,
            sitemap_found,
            navigation_found,
        })
    }

    /// Sections from the first configured sitemap location that loads.
    async fn sitemap_sections(&self, page_url: &Url) -> Vec<DocSection> {
        for path in &self.config.sitemap_paths {
            let Ok(sitemap_url) = page_url.join(path) else {
                continue;
            };
            match fetch_sitemap(&self.fetcher, sitemap_url.as_str()).await {
                Ok(entries) => {
                    debug!(url = %sitemap_url, entries = entries.len(), "Loaded sitemap");
                    return sitemap_sections(&entries, page_url, self.config.max_sitemap_entries);
                },
                Err(e) => debug!(url = %sitemap_url, error = %e, "No sitemap"),
            }
        }
        Vec::new()
    }

    /// HEAD every configured entry path concurrently; keep responders in
    /// configured order.
    async fn probe_common_paths(&self, page_url: &Url) -> Vec<DocSection> {
        let probes = self.config.probe_paths.iter().map(|path| async move {
            let path = normalize_path(path);
            let url = navigation::section_url(page_url, &path);
            self.fetcher.exists(&url).await.then(|| DocSection {
                title: title_from_path(&path),
                path,
                url,
            })
        });

        let found: Vec<DocSection> = join_all(probes).await.into_iter().flatten().collect();
        debug!(found = found.len(), "Probed common documentation paths");
        found.into_iter().take(self.config.max_sections).collect()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unnecessary_wraps
)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_title_prefers_title_element() {
        let page = analyze_page(
            "<html><head><title> Widget\n Docs </title></head><body><h1>Welcome</h1></body></html>",
            &url("https://widget.example.com/"),
        );
        assert_eq!(page.title.as_deref(), Some("Widget Docs"));

        let page = analyze_page("<h1>Only <em>heading</em></h1>", &url("https://widget.example.com/"));
        assert_eq!(page.title.as_deref(), Some("Only heading"));
    }

    #[test]
    fn test_validity_signals() {
        let plain = url("https://widget.example.com/");
        assert!(!analyze_page("<p>Buy now</p>", &plain).is_valid_docs);
        assert!(analyze_page("<p>x</p>", &url("https://widget.example.com/docs")).is_valid_docs);
        assert!(analyze_page("<pre>npm i widget</pre>", &plain).is_valid_docs);
        assert!(analyze_page("<aside>menu</aside>", &plain).is_valid_docs);
        assert!(analyze_page("<h2>Installation</h2>", &plain).is_valid_docs);
        assert!(!analyze_page("<h2>Testimonials</h2>", &plain).is_valid_docs);
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let crawler = SiteCrawler::new().unwrap();
        assert!(matches!(crawler.crawl("not a url").await, Err(Error::InvalidUrl(_))));
        assert!(matches!(
            crawler.crawl("ftp://files.example.com/docs").await,
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(crawler.crawl("/docs/intro").await, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let target = format!("{}/docs", server.uri());
        let result = SiteCrawler::new().unwrap().crawl(&target).await.unwrap();
        assert_eq!(result, CrawlResult::unreachable(target));
    }

    #[tokio::test]
    async fn test_probe_fallback_keeps_configured_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Landing</p>"))
            .mount(&server)
            .await;
        for probe in ["/reference", "/docs"] {
            Mock::given(method("HEAD"))
                .and(path(probe))
                .respond_with(ResponseTemplate::new(200))
                .mount(&server)
                .await;
        }

        let result = SiteCrawler::new()
            .unwrap()
            .crawl(&format!("{}/", server.uri()))
            .await
            .unwrap();
        assert!(!result.navigation_found);
        assert!(!result.sitemap_found);
        let paths: Vec<_> = result.sections.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/docs", "/reference"]);
        assert_eq!(result.sections[1].title, "Reference");
        assert_eq!(result.sections[0].url, format!("{}/docs", server.uri()));
    }

    #[tokio::test]
    async fn test_second_sitemap_location_used() {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/docs/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Docs</h1>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sitemap_index.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<urlset><url><loc>{base}/docs/a</loc></url><url><loc>{base}/pricing</loc></url></urlset>"
            )))
            .mount(&server)
            .await;

        let result = SiteCrawler::new()
            .unwrap()
            .crawl(&format!("{base}/docs/"))
            .await
            .unwrap();
        assert!(result.sitemap_found);
        assert!(!result.navigation_found);
        assert_eq!(result.sections.len(), 1);
        assert_eq!(result.sections[0].path, "/docs/a");
        assert_eq!(result.title.as_deref(), Some("Docs"));
    }
}
