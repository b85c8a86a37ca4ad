//! Crawler behavior against synthetic documentation sites.
#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::disallowed_macros,
    missing_docs
)]

use docscout_core::{Config, SiteCrawler};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawler() -> SiteCrawler {
    let mut config = Config::default();
    config.discovery.probe_timeout_secs = 1;
    config.discovery.fetch_timeout_secs = 2;
    SiteCrawler::from_config(&config).unwrap()
}

async fn serve_page(server: &MockServer, at: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(html.to_string()),
        )
        .mount(server)
        .await;
}

const SIDEBAR_PAGE: &str = r##"<!doctype html>
<html>
<head><title>Widget Docs</title></head>
<body>
  <nav class="sidebar">
    <a href="/docs/intro">Introduction</a>
    <a href="/docs/install">Installation</a>
    <a href="/docs/guides/routing">Routing</a>
    <a href="/docs/api">API</a>
    <a href="/docs/faq">FAQ</a>
    <a href="#top">Back to top</a>
    <a href="https://github.com/acme/widget">GitHub</a>
  </nav>
  <main><h1>Introduction</h1><pre><code>npm install widget</code></pre></main>
</body>
</html>"##;

#[tokio::test]
async fn sidebar_without_sitemap_yields_navigation_sections() {
    let server = MockServer::start().await;
    serve_page(&server, "/docs/intro", SIDEBAR_PAGE).await;

    let result = crawler()
        .crawl(&format!("{}/docs/intro", server.uri()))
        .await
        .unwrap();

    assert!(result.navigation_found);
    assert!(!result.sitemap_found);
    assert!(result.is_valid_docs);
    assert_eq!(result.title.as_deref(), Some("Widget Docs"));
    assert_eq!(result.sections.len(), 5);
    let titles: Vec<_> = result.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Introduction", "Installation", "Routing", "API", "FAQ"]);
}

#[tokio::test]
async fn sitemap_fills_gaps_behind_navigation() {
    let server = MockServer::start().await;
    let base = server.uri();
    serve_page(
        &server,
        "/docs",
        r#"<html><body>
             <aside><a href="/docs/start">Start here</a><a href="/docs/config">Config</a></aside>
           </body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{base}/docs/config/</loc></url>
              <url><loc>{base}/docs/plugins</loc></url>
              <url><loc>{base}/guide/migration</loc></url>
              <url><loc>{base}/blog/release-notes</loc></url>
            </urlset>"#
        )))
        .mount(&server)
        .await;

    let result = crawler().crawl(&format!("{base}/docs")).await.unwrap();

    assert!(result.navigation_found);
    assert!(result.sitemap_found);
    let paths: Vec<_> = result.sections.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/docs/start", "/docs/config", "/docs/plugins", "/guide/migration"]
    );
    // The navigation title wins for the overlapping path.
    assert_eq!(result.sections[1].title, "Config");
    assert_eq!(result.sections[3].title, "Migration");
}

#[tokio::test]
async fn crawling_a_static_page_is_idempotent() {
    let server = MockServer::start().await;
    serve_page(&server, "/docs/intro", SIDEBAR_PAGE).await;
    let target = format!("{}/docs/intro", server.uri());

    let crawler = crawler();
    let first = crawler.crawl(&target).await.unwrap();
    let second = crawler.crawl(&target).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn unreachable_site_is_not_an_error() {
    let result = crawler().crawl("http://127.0.0.1:1/docs").await.unwrap();
    assert!(!result.is_valid_docs);
    assert!(result.sections.is_empty());
    assert_eq!(result.base_url, "http://127.0.0.1:1/docs");
}
