//! End-to-end runs of the `docscout` binary against mock servers.
#![allow(clippy::unwrap_used, clippy::panic, missing_docs)]

mod common;

use common::{docscout_cmd, write_config};
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn discover_json_reports_homepage_and_override() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docscout-fixture-cli"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "docscout-fixture-cli",
            "dist-tags": { "latest": "2.0.1" },
            "versions": {
                "2.0.1": {
                    "description": "Fixture package",
                    "homepage": "https://fixture.example.com/docs"
                }
            }
        })))
        .mount(&server)
        .await;
    let config = write_config(
        tmp.path(),
        &server.uri(),
        "[overrides]\n\"docscout-fixture-pinned\" = \"https://pinned.example.com/guide\"\n",
    );

    let out = docscout_cmd(&config)
        .args(["discover", "docscout-fixture-cli", "docscout-fixture-pinned", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: Value = serde_json::from_slice(&out)?;
    let arr = v.as_array().cloned().unwrap_or_default();
    assert_eq!(arr.len(), 2);

    assert_eq!(arr[0]["name"], "docscout-fixture-cli");
    assert_eq!(arr[0]["version"], "2.0.1");
    assert_eq!(arr[0]["docsUrl"], "https://fixture.example.com/docs");
    assert_eq!(arr[0]["confidence"], "high");
    assert_eq!(arr[0]["source"], "homepage");

    // Registry has no record of it, the override still wins.
    assert_eq!(arr[1]["name"], "docscout-fixture-pinned");
    assert_eq!(arr[1]["docsUrl"], "https://pinned.example.com/guide");
    assert_eq!(arr[1]["confidence"], "high");
    for key in ["npmUrl", "githubUrl", "keywords"] {
        assert!(arr[1].get(key).is_some(), "missing key: {key}");
    }
    Ok(())
}

#[tokio::test]
async fn discover_text_falls_back_to_registry_page() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let config = write_config(tmp.path(), &server.uri(), "");

    docscout_cmd(&config)
        .args(["discover", "docscout-fixture-gone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docscout-fixture-gone@unknown"))
        .stdout(predicate::str::contains("[low]"))
        .stdout(predicate::str::contains(
            "https://www.npmjs.com/package/docscout-fixture-gone",
        ));
    Ok(())
}

#[tokio::test]
async fn crawl_json_lists_navigation_sections() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let server = MockServer::start().await;
    let page = r#"<html><head><title>Fixture Docs</title></head><body>
        <nav><a href="/docs/intro">Intro</a><a href="/docs/setup">Setup</a><a href="/docs/api">API</a></nav>
        <main><h1>Intro</h1></main></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(page),
        )
        .mount(&server)
        .await;
    let config = write_config(tmp.path(), &server.uri(), "");

    let out = docscout_cmd(&config)
        .args(["crawl", &format!("{}/docs/intro", server.uri()), "-f", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: Value = serde_json::from_slice(&out)?;
    assert_eq!(v["title"], "Fixture Docs");
    assert_eq!(v["navigationFound"], true);
    assert_eq!(v["sitemapFound"], false);
    let paths: Vec<_> = v["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["/docs/intro", "/docs/setup", "/docs/api"]);
    Ok(())
}

#[test]
fn crawl_rejects_relative_url() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path(), "https://registry.npmjs.org", "");

    docscout_cmd(&config)
        .args(["crawl", "docs/intro"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot crawl 'docs/intro'"));
}

#[test]
fn known_search_finds_entry() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path(), "https://registry.npmjs.org", "");

    docscout_cmd(&config)
        .args(["known", "vitest", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. vitest"))
        .stdout(predicate::str::contains("https://vitest.dev/guide/"));
}

#[test]
fn known_lists_configured_overrides() {
    let tmp = tempdir().unwrap();
    let config = write_config(
        tmp.path(),
        "https://registry.npmjs.org",
        "[overrides]\n\"docscout-fixture-pinned\" = \"https://pinned.example.com/guide\"\n",
    );

    let out = docscout_cmd(&config)
        .args(["known", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    let entries = v.as_array().unwrap();
    assert!(entries.iter().any(|e| e["package"] == "react"));
    assert!(entries.iter().any(|e| e["package"] == "docscout-fixture-pinned"
        && e["docsUrl"] == "https://pinned.example.com/guide"));
}

#[test]
fn invalid_config_fails_before_running() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path(), "ftp://registry.example.com", "");

    docscout_cmd(&config)
        .args(["known"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("registry_url"));
}

#[test]
fn help_lists_subcommands() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path(), "https://registry.npmjs.org", "");

    docscout_cmd(&config)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("crawl"))
        .stdout(predicate::str::contains("known"));
}
