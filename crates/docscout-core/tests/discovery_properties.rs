//! End-to-end discovery behavior against a mock registry and mock sites.
#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::disallowed_macros,
    missing_docs
)]

use docscout_core::discovery::OrganizationPatterns;
use docscout_core::{Confidence, Config, DiscoveryEngine, DiscoverySource, KnownDocs};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.discovery.registry_url = server.uri();
    config.discovery.registry_page_url = format!("{}/package", server.uri());
    config.discovery.probe_timeout_secs = 1;
    config.discovery.fetch_timeout_secs = 2;
    config
}

fn engine_for(server: &MockServer) -> DiscoveryEngine {
    DiscoveryEngine::with_config(config_for(server)).unwrap()
}

async fn registry_responds(server: &MockServer, name: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{name}")))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn every_override_entry_is_high_confidence_and_exact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let known = KnownDocs::new();
    let names: Vec<&str> = known.all_entries().iter().map(|e| e.package.as_str()).collect();
    let results = engine.discover_packages(names.iter().copied()).await;

    assert_eq!(results.len(), known.len());
    for entry in known.all_entries() {
        let pkg = &results[&entry.package];
        assert_eq!(pkg.confidence, Confidence::High, "{}", entry.package);
        assert_eq!(pkg.docs_url.as_deref(), Some(entry.docs_url.as_str()));
        assert_eq!(pkg.source, DiscoverySource::KnownOverride);
    }
}

#[tokio::test]
async fn override_beats_registry_homepage() {
    let server = MockServer::start().await;
    registry_responds(
        &server,
        "react",
        200,
        json!({
            "name": "react",
            "dist-tags": { "latest": "19.0.0" },
            "versions": { "19.0.0": { "homepage": "https://react.dev/" } },
            "repository": { "type": "git", "url": "git+https://github.com/facebook/react.git" }
        }),
    )
    .await;

    let pkg = engine_for(&server).discover_package("react").await;
    assert_eq!(pkg.docs_url.as_deref(), Some("https://react.dev/reference/react"));
    assert_eq!(pkg.confidence, Confidence::High);
    // Metadata enrichment still runs on an override hit.
    assert_eq!(pkg.version, "19.0.0");
    assert_eq!(pkg.github_url.as_deref(), Some("https://github.com/facebook/react"));
}

#[tokio::test]
async fn docs_url_is_never_null() {
    let server = MockServer::start().await;
    registry_responds(&server, "docscout-fixture-ok", 200, json!({ "name": "docscout-fixture-ok" })).await;
    registry_responds(&server, "docscout-fixture-500", 500, json!({})).await;
    Mock::given(method("GET"))
        .and(path("/docscout-fixture-garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    for name in [
        "docscout-fixture-ok",
        "docscout-fixture-500",
        "docscout-fixture-garbage",
        "docscout-fixture-missing",
        "@docscout-fixture/scoped",
    ] {
        let pkg = engine.discover_package(name).await;
        assert!(pkg.docs_url.is_some(), "{name}");
        assert!(!pkg.npm_url.is_empty());
    }
}

#[tokio::test]
async fn cached_results_are_reference_stable_until_cleared() {
    let server = MockServer::start().await;
    registry_responds(
        &server,
        "docscout-fixture-cache",
        200,
        json!({ "name": "docscout-fixture-cache", "homepage": "https://cache.example.dev" }),
    )
    .await;

    let engine = engine_for(&server);
    let first = engine.discover_package("docscout-fixture-cache").await;
    let second = engine.discover_package("docscout-fixture-cache").await;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.cache_len(), 1);

    engine.clear_cache();
    assert_eq!(engine.cache_len(), 0);

    let third = engine.discover_package("docscout-fixture-cache").await;
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(*first, *third);
}

#[tokio::test]
async fn registry_failure_falls_back_to_registry_page() {
    let server = MockServer::start().await;
    registry_responds(&server, "docscout-fixture-down", 500, json!({ "error": "boom" })).await;

    let pkg = engine_for(&server).discover_package("docscout-fixture-down").await;
    assert_eq!(pkg.confidence, Confidence::Low);
    assert_eq!(pkg.docs_url.as_deref(), Some(pkg.npm_url.as_str()));
    assert_eq!(pkg.version, "unknown");
    assert_eq!(pkg.source, DiscoverySource::Registry);
}

#[tokio::test]
async fn organization_first_candidate_wins_with_high_confidence() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "name": "@docscout-fixture/widget" })),
        )
        .mount(&server)
        .await;
    for probe in ["/org/widget/docs", "/org/widget"] {
        Mock::given(method("HEAD"))
            .and(path(probe))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }

    let mut config = config_for(&server);
    config.organizations.insert(
        "@docscout-fixture".to_string(),
        vec![format!("{base}/org/{{pkg}}/docs"), format!("{base}/org/{{pkg}}")],
    );
    let engine = DiscoveryEngine::with_config(config).unwrap();

    let pkg = engine.discover_package("@docscout-fixture/widget").await;
    assert_eq!(pkg.docs_url, Some(format!("{base}/org/widget/docs")));
    assert_eq!(pkg.confidence, Confidence::High);
    assert_eq!(pkg.source, DiscoverySource::OrganizationPattern);
}

#[tokio::test]
async fn organization_probing_skips_missing_candidates() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "@acme/gizmo" })))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/acme/gizmo"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let engine = engine_for(&server).with_organizations(OrganizationPatterns::empty().with_org(
        "@acme",
        [format!("{base}/missing/{{pkg}}"), format!("{base}/acme/{{pkg}}")],
    ));

    let pkg = engine.discover_package("@acme/gizmo").await;
    assert_eq!(pkg.docs_url, Some(format!("{base}/acme/gizmo")));
    assert_eq!(pkg.source, DiscoverySource::OrganizationPattern);
}

#[tokio::test]
async fn repository_homepage_is_not_accepted_directly() {
    let server = MockServer::start().await;
    let homepage = "https://github.com/docscout-fixture/thing#readme";
    registry_responds(
        &server,
        "docscout-fixture-thing",
        200,
        json!({ "name": "docscout-fixture-thing", "homepage": homepage }),
    )
    .await;

    let pkg = engine_for(&server).discover_package("docscout-fixture-thing").await;
    assert_ne!(pkg.docs_url.as_deref(), Some(homepage));
    assert_ne!(pkg.source, DiscoverySource::Homepage);
}

#[tokio::test]
async fn github_pages_homepage_is_accepted() {
    let server = MockServer::start().await;
    registry_responds(
        &server,
        "docscout-fixture-pages",
        200,
        json!({
            "name": "docscout-fixture-pages",
            "homepage": "https://docscout-fixture.github.io/pages/",
            "repository": "github:docscout-fixture/pages"
        }),
    )
    .await;

    let pkg = engine_for(&server).discover_package("docscout-fixture-pages").await;
    assert_eq!(pkg.docs_url.as_deref(), Some("https://docscout-fixture.github.io/pages/"));
    assert_eq!(pkg.confidence, Confidence::High);
    assert_eq!(pkg.source, DiscoverySource::Homepage);
}

#[tokio::test]
async fn batch_returns_every_key_even_when_one_fails() {
    let server = MockServer::start().await;
    registry_responds(
        &server,
        "docscout-fixture-a",
        200,
        json!({ "name": "docscout-fixture-a", "homepage": "https://a.example.dev" }),
    )
    .await;
    registry_responds(&server, "docscout-fixture-b", 500, json!({})).await;
    registry_responds(
        &server,
        "docscout-fixture-c",
        200,
        json!({ "name": "docscout-fixture-c", "homepage": "https://c.example.com/docs" }),
    )
    .await;

    let mut config = config_for(&server);
    config.discovery.batch_size = 2;
    let engine = DiscoveryEngine::with_config(config).unwrap();

    let results = engine
        .discover_packages(["docscout-fixture-a", "docscout-fixture-b", "docscout-fixture-c"])
        .await;

    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["docscout-fixture-a", "docscout-fixture-b", "docscout-fixture-c"]);
    assert_eq!(results["docscout-fixture-a"].confidence, Confidence::High);
    assert_eq!(results["docscout-fixture-b"].confidence, Confidence::Low);
    assert_eq!(
        results["docscout-fixture-c"].docs_url.as_deref(),
        Some("https://c.example.com/docs")
    );

    // Batch results share the cache with single lookups.
    let again = engine.discover_package("docscout-fixture-a").await;
    assert!(Arc::ptr_eq(&again, &results["docscout-fixture-a"]));
}
