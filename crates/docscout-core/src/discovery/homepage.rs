//! Homepage content analysis: find a documentation link on a project site.

use crate::Fetcher;
use crate::discovery::filter::{is_docs_host, is_docs_indicative};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, instrument};
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("a[href]").ok());

const SKIPPED_SCHEMES: &[&str] = &["mailto:", "javascript:", "tel:", "data:"];

/// Fetch `homepage` and return the first link that looks like documentation.
///
/// Fetch failures and pages without a qualifying link both yield `None`.
#[instrument(skip(fetcher))]
pub async fn find_docs_link(fetcher: &Fetcher, homepage: &str) -> Option<String> {
    let base = Url::parse(homepage).ok()?;
    let html = match fetcher.get_text(homepage).await {
        Ok(html) => html,
        Err(e) => {
            debug!(error = %e, "Homepage fetch failed");
            return None;
        },
    };
    let link = extract_docs_link(&html, &base);
    debug!(found = ?link, "Analyzed homepage links");
    link
}

/// Scan anchors in document order for a documentation link.
///
/// An anchor qualifies when its href, visible text, `title`, or
/// `aria-label` contains a documentation indicator, or when it resolves to
/// a `docs.` host. Relative hrefs are resolved against `base`; fragment-only,
/// `mailto:`/`javascript:` and non-http(s) links are skipped.
pub fn extract_docs_link(html: &str, base: &Url) -> Option<String> {
    let selector = ANCHOR_SELECTOR.as_ref()?;
    let document = Html::parse_document(html);

    document.select(selector).find_map(|anchor| {
        let href = anchor.value().attr("href")?.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let lower = href.to_ascii_lowercase();
        if SKIPPED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
            return None;
        }

        let resolved = base.join(href).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }

        let qualifies = is_docs_indicative(href)
            || is_docs_indicative(&anchor_context(&anchor))
            || is_docs_host(resolved.as_str());
        qualifies.then(|| resolved.to_string())
    })
}

fn anchor_context(anchor: &ElementRef<'_>) -> String {
    let mut context: String = anchor.text().collect::<Vec<_>>().join(" ");
    for attr in ["title", "aria-label"] {
        if let Some(value) = anchor.value().attr(attr) {
            context.push(' ');
            context.push_str(value);
        }
    }
    context
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

    fn base() -> Url {
        Url::parse("https://widget.example.com/home/").unwrap()
    }

    #[test]
    fn test_relative_href_resolved_against_homepage() {
        let html = r#"<a href="/about">About</a><a href="/docs/intro">Start</a>"#;
        assert_eq!(
            extract_docs_link(html, &base()).as_deref(),
            Some("https://widget.example.com/docs/intro")
        );
    }

    #[test]
    fn test_link_text_qualifies() {
        let html = r#"<a href="/blog">Blog</a><a href="/learn">Read the Documentation</a>"#;
        assert_eq!(
            extract_docs_link(html, &base()).as_deref(),
            Some("https://widget.example.com/learn")
        );
    }

    #[test]
    fn test_aria_label_qualifies() {
        let html = r#"<a href="/start" aria-label="API reference"><svg></svg></a>"#;
        assert!(extract_docs_link(html, &base()).is_none());

        let html = r#"<a href="/start" aria-label="Guide"><svg></svg></a>"#;
        assert_eq!(
            extract_docs_link(html, &base()).as_deref(),
            Some("https://widget.example.com/start")
        );
    }

    #[test]
    fn test_docs_host_qualifies() {
        let html = r#"<a href="https://docs.widget.dev/">Learn more</a>"#;
        assert_eq!(
            extract_docs_link(html, &base()).as_deref(),
            Some("https://docs.widget.dev/")
        );
    }

    #[test]
    fn test_skips_fragments_and_pseudo_schemes() {
        let html = r##"
            <a href="#docs">Docs</a>
            <a href="mailto:docs@widget.example.com">Email docs</a>
            <a href="javascript:void(0)">Docs</a>
            <a href="ftp://files.example.com/docs">Docs archive</a>
            <a href="guide.html">Guide</a>
        "##;
        assert_eq!(
            extract_docs_link(html, &base()).as_deref(),
            Some("https://widget.example.com/home/guide.html")
        );
    }

    #[test]
    fn test_no_match_and_malformed_markup() {
        assert!(extract_docs_link("<a href='/pricing'>Pricing</a>", &base()).is_none());
        assert!(extract_docs_link("<<<not html at all", &base()).is_none());
        assert!(extract_docs_link("", &base()).is_none());
    }

    #[tokio::test]
    async fn test_find_docs_link_from_mock_homepage() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<html><body><a href="/documentation/">Docs</a></body></html>"#),
            )
            .mount(&mock_server)
            .await;

        let homepage = format!("{}/", mock_server.uri());
        let link = find_docs_link(&Fetcher::new().unwrap(), &homepage).await;
        assert_eq!(link, Some(format!("{}/documentation/", mock_server.uri())));
    }

    #[tokio::test]
    async fn test_find_docs_link_absorbs_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        assert!(find_docs_link(&fetcher, &mock_server.uri()).await.is_none());
        assert!(find_docs_link(&fetcher, "not a url").await.is_none());
    }
}
