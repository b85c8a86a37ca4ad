//! The discovery cascade.
//!
//! For each package the engine walks a fixed sequence of tiers and stops at
//! the first one that produces a URL:
//!
//! 1. curated override table
//! 2. registry metadata (always fetched, for version and repository)
//! 3. homepage accepted directly, unless it is a repository host
//! 4. organization URL conventions for scoped packages, probed in order
//! 5. generic URL conventions, probed in order
//! 6. documentation link found on the homepage
//! 7. GitHub repository
//! 8. registry package page
//!
//! Tier 8 cannot fail, so every result carries a `docs_url`.

use crate::config::Config;
use crate::discovery::cache::DiscoveryCache;
use crate::discovery::filter::{homepage_confidence, is_repository_host};
use crate::discovery::homepage::find_docs_link;
use crate::discovery::known::KnownDocs;
use crate::discovery::npm::{PackageMetadata, RegistryClient};
use crate::discovery::patterns::{Candidate, OrganizationPatterns, generic_patterns};
use crate::types::UNKNOWN_VERSION;
use crate::{Confidence, DiscoveredPackage, DiscoverySource, Fetcher, Result};
use futures::future::join_all;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

/// An accepted `docs_url` and how it was found.
#[derive(Debug, Clone)]
struct Resolution {
    url: String,
    confidence: Confidence,
    source: DiscoverySource,
}

impl Resolution {
    fn new(url: impl Into<String>, confidence: Confidence, source: DiscoverySource) -> Self {
        Self {
            url: url.into(),
            confidence,
            source,
        }
    }

    fn from_candidate(candidate: Candidate, source: DiscoverySource) -> Self {
        Self::new(candidate.url, candidate.confidence, source)
    }
}

/// Finds the best documentation URL for packages and memoizes the answers.
///
/// Discovery never fails: network and parse errors only move the cascade to
/// the next tier. Results are shared as `Arc`s and stay cached until
/// [`DiscoveryEngine::clear_cache`].
#[derive(Debug)]
pub struct DiscoveryEngine {
    fetcher: Fetcher,
    registry: RegistryClient,
    known: KnownDocs,
    organizations: OrganizationPatterns,
    cache: DiscoveryCache,
    registry_page_url: String,
    batch_size: usize,
    strict_homepage: bool,
}

impl DiscoveryEngine {
    /// Engine with default configuration.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Engine built from `config`.
    ///
    /// `[overrides]` are merged over the built-in override table and
    /// `[organizations]` replace built-in rules for the same scope.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the configuration is invalid, or
    /// [`crate::Error::Network`] if the HTTP client cannot be constructed.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::from_config(&config.discovery)?;
        let registry = RegistryClient::new(fetcher.clone(), config.discovery.registry_url.as_str());
        let known = KnownDocs::new().with_overrides(&config.overrides);
        let organizations = config
            .organizations
            .iter()
            .fold(OrganizationPatterns::new(), |patterns, (org, templates)| {
                patterns.with_org(org, templates.iter().cloned())
            });

        Ok(Self {
            fetcher,
            registry,
            known,
            organizations,
            cache: DiscoveryCache::new(),
            registry_page_url: config
                .discovery
                .registry_page_url
                .trim_end_matches('/')
                .to_string(),
            batch_size: config.discovery.batch_size.max(1),
            strict_homepage: config.discovery.strict_homepage,
        })
    }

    /// Add exact-name overrides ahead of the built-in table.
    #[must_use]
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.known = self.known.with_overrides(overrides);
        self
    }

    /// Replace the override table entirely.
    #[must_use]
    pub fn with_known_docs(mut self, known: KnownDocs) -> Self {
        self.known = known;
        self
    }

    /// Replace the organization pattern table.
    #[must_use]
    pub fn with_organizations(mut self, organizations: OrganizationPatterns) -> Self {
        self.organizations = organizations;
        self
    }

    /// The override table in use.
    pub const fn known_docs(&self) -> &KnownDocs {
        &self.known
    }

    /// Registry page URL for a package.
    pub fn npm_url(&self, name: &str) -> String {
        format!("{}/{name}", self.registry_page_url)
    }

    /// Discover documentation for one package, using the cache when possible.
    #[instrument(skip(self))]
    pub async fn discover_package(&self, name: &str) -> Arc<DiscoveredPackage> {
        if let Some(hit) = self.cache.get(name) {
            debug!("Cache hit");
            return hit;
        }

        let package = self.discover_uncached(name).await;
        info!(
            docs_url = ?package.docs_url,
            confidence = %package.confidence,
            source = %package.source,
            "Discovered documentation"
        );
        self.cache.set(name, package)
    }

    /// Discover many packages.
    ///
    /// Names are de-duplicated, then processed in batches of `batch_size`:
    /// packages within a batch run concurrently, batches run one after
    /// another. The result has exactly one entry per distinct input name.
    #[instrument(skip_all)]
    pub async fn discover_packages<I, S>(&self, names: I) -> BTreeMap<String, Arc<DiscoveredPackage>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .filter(|n| seen.insert(n.clone()))
            .collect();

        let mut results = BTreeMap::new();
        for batch in unique.chunks(self.batch_size) {
            debug!(batch_len = batch.len(), "Discovering batch");
            let discovered = join_all(batch.iter().map(|name| async move {
                (name.clone(), self.discover_package(name).await)
            }))
            .await;
            results.extend(discovered);
        }
        results
    }

    /// Forget every memoized result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of memoized results.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    async fn discover_uncached(&self, name: &str) -> DiscoveredPackage {
        let npm_url = self.npm_url(name);
        let known = self.known.get(name).map(|url| {
            debug!(url = %url, "Matched known override");
            Resolution::new(url, Confidence::High, DiscoverySource::KnownOverride)
        });

        let Some(metadata) = self.registry.get_metadata(name).await else {
            let resolution = known.unwrap_or_else(|| {
                Resolution::new(npm_url.as_str(), Confidence::Low, DiscoverySource::Registry)
            });
            return DiscoveredPackage {
                name: name.to_string(),
                version: UNKNOWN_VERSION.to_string(),
                description: None,
                keywords: Vec::new(),
                docs_url: Some(resolution.url),
                github_url: None,
                npm_url,
                confidence: resolution.confidence,
                source: resolution.source,
            };
        };

        let resolution = match known {
            Some(resolution) => resolution,
            None => self.resolve(name, &metadata, &npm_url).await,
        };

        DiscoveredPackage {
            name: name.to_string(),
            version: metadata
                .version
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            description: metadata.description,
            keywords: metadata.keywords,
            docs_url: Some(resolution.url),
            github_url: metadata.github_url,
            npm_url,
            confidence: resolution.confidence,
            source: resolution.source,
        }
    }

    /// Tiers 3 through 8.
    async fn resolve(&self, name: &str, metadata: &PackageMetadata, npm_url: &str) -> Resolution {
        let homepage = metadata
            .homepage
            .as_deref()
            .filter(|h| is_http_url(h) && !is_repository_host(h));

        if let Some(homepage) = homepage {
            let confidence = homepage_confidence(homepage);
            if !self.strict_homepage || confidence == Confidence::High {
                debug!(url = %homepage, %confidence, "Accepted homepage");
                return Resolution::new(homepage, confidence, DiscoverySource::Homepage);
            }
            debug!(url = %homepage, "Deferring medium-confidence homepage");
        } else if let Some(rejected) = metadata.homepage.as_deref() {
            debug!(url = %rejected, "Homepage disqualified");
        }

        if let Some(hit) = self.probe_first(self.organizations.candidates(name)).await {
            return Resolution::from_candidate(hit, DiscoverySource::OrganizationPattern);
        }

        let generic = generic_patterns(homepage, metadata.github_url.as_deref(), name);
        if let Some(hit) = self.probe_first(generic).await {
            return Resolution::from_candidate(hit, DiscoverySource::GenericPattern);
        }

        if let Some(homepage) = homepage {
            if let Some(link) = find_docs_link(&self.fetcher, homepage).await {
                return Resolution::new(link, Confidence::High, DiscoverySource::HomepageContent);
            }
            // Only reachable with strict_homepage; the homepage still beats GitHub.
            return Resolution::new(homepage, homepage_confidence(homepage), DiscoverySource::Homepage);
        }

        if let Some(github) = metadata.github_url.as_deref() {
            debug!(url = %github, "Falling back to GitHub repository");
            return Resolution::new(github, Confidence::Medium, DiscoverySource::GitHub);
        }

        debug!("Falling back to registry page");
        Resolution::new(npm_url, Confidence::Low, DiscoverySource::Registry)
    }

    /// Probe candidates sequentially; the first that exists wins.
    async fn probe_first(&self, candidates: Vec<Candidate>) -> Option<Candidate> {
        for candidate in candidates {
            if self.fetcher.exists(&candidate.url).await {
                debug!(url = %candidate.url, confidence = %candidate.confidence, "Candidate exists");
                return Some(candidate);
            }
        }
        None
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
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
    use crate::Error;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine_for(server: &MockServer, strict_homepage: bool) -> DiscoveryEngine {
        let mut config = Config::default();
        config.discovery.registry_url = server.uri();
        config.discovery.registry_page_url = format!("{}/package", server.uri());
        config.discovery.probe_timeout_secs = 1;
        config.discovery.fetch_timeout_secs = 2;
        config.discovery.strict_homepage = strict_homepage;
        DiscoveryEngine::with_config(config).unwrap()
    }

    async fn mount_registry(server: &MockServer, name: &str, doc: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(doc))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_project_homepage_accepted_with_high_confidence() {
        let server = MockServer::start().await;
        mount_registry(
            &server,
            "docscout-fixture-widget",
            json!({
                "name": "docscout-fixture-widget",
                "dist-tags": { "latest": "1.2.3" },
                "versions": { "1.2.3": { "homepage": "https://widget.dev" } }
            }),
        )
        .await;

        let pkg = engine_for(&server, false)
            .discover_package("docscout-fixture-widget")
            .await;
        assert_eq!(pkg.docs_url.as_deref(), Some("https://widget.dev"));
        assert_eq!(pkg.confidence, Confidence::High);
        assert_eq!(pkg.source, DiscoverySource::Homepage);
        assert_eq!(pkg.version, "1.2.3");
    }

    #[tokio::test]
    async fn test_plain_homepage_accepted_with_medium_confidence() {
        let server = MockServer::start().await;
        mount_registry(
            &server,
            "docscout-fixture-plain",
            json!({ "name": "docscout-fixture-plain", "homepage": "https://plain.example.com" }),
        )
        .await;

        let pkg = engine_for(&server, false)
            .discover_package("docscout-fixture-plain")
            .await;
        assert_eq!(pkg.docs_url.as_deref(), Some("https://plain.example.com"));
        assert_eq!(pkg.confidence, Confidence::Medium);
        assert_eq!(pkg.version, UNKNOWN_VERSION);
    }

    #[tokio::test]
    async fn test_strict_homepage_falls_through_to_content_analysis() {
        let server = MockServer::start().await;
        let homepage = format!("{}/home", server.uri());
        mount_registry(
            &server,
            "docscout-fixture-strict",
            json!({ "name": "docscout-fixture-strict", "homepage": homepage }),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/home"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><a href="/pricing">Pricing</a><a href="/manual">Documentation</a></body></html>"#,
            ))
            .mount(&server)
            .await;

        let pkg = engine_for(&server, true)
            .discover_package("docscout-fixture-strict")
            .await;
        assert_eq!(pkg.docs_url, Some(format!("{}/manual", server.uri())));
        assert_eq!(pkg.confidence, Confidence::High);
        assert_eq!(pkg.source, DiscoverySource::HomepageContent);
    }

    #[tokio::test]
    async fn test_strict_homepage_generic_docs_path_wins() {
        let server = MockServer::start().await;
        let homepage = format!("{}/site", server.uri());
        mount_registry(
            &server,
            "docscout-fixture-generic",
            json!({ "name": "docscout-fixture-generic", "homepage": homepage }),
        )
        .await;
        Mock::given(method("HEAD"))
            .and(path("/site/docs"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let pkg = engine_for(&server, true)
            .discover_package("docscout-fixture-generic")
            .await;
        assert_eq!(pkg.docs_url, Some(format!("{}/site/docs", server.uri())));
        assert_eq!(pkg.confidence, Confidence::High);
        assert_eq!(pkg.source, DiscoverySource::GenericPattern);
    }

    #[tokio::test]
    async fn test_strict_homepage_kept_when_nothing_better() {
        let server = MockServer::start().await;
        let homepage = format!("{}/home", server.uri());
        mount_registry(
            &server,
            "docscout-fixture-deferred",
            json!({
                "name": "docscout-fixture-deferred",
                "homepage": homepage,
                "repository": "https://github.com/docscout-fixture/deferred"
            }),
        )
        .await;

        let pkg = engine_for(&server, true)
            .discover_package("docscout-fixture-deferred")
            .await;
        assert_eq!(pkg.docs_url.as_deref(), Some(homepage.as_str()));
        assert_eq!(pkg.confidence, Confidence::Medium);
        assert_eq!(pkg.source, DiscoverySource::Homepage);
    }

    #[tokio::test]
    async fn test_github_fallback_when_homepage_is_repository() {
        let server = MockServer::start().await;
        mount_registry(
            &server,
            "docscout-fixture-repo",
            json!({
                "name": "docscout-fixture-repo",
                "homepage": "https://github.com/docscout-fixture/repo#readme",
                "repository": { "type": "git", "url": "git+https://github.com/docscout-fixture/repo.git" }
            }),
        )
        .await;

        let pkg = engine_for(&server, false)
            .discover_package("docscout-fixture-repo")
            .await;
        assert_eq!(pkg.docs_url.as_deref(), Some("https://github.com/docscout-fixture/repo"));
        assert_eq!(pkg.github_url.as_deref(), Some("https://github.com/docscout-fixture/repo"));
        assert_eq!(pkg.confidence, Confidence::Medium);
        assert_eq!(pkg.source, DiscoverySource::GitHub);
    }

    #[tokio::test]
    async fn test_registry_page_fallback_keeps_metadata() {
        let server = MockServer::start().await;
        mount_registry(
            &server,
            "docscout-fixture-bare",
            json!({
                "name": "docscout-fixture-bare",
                "description": "Nothing to see",
                "keywords": ["bare"],
                "dist-tags": { "latest": "0.0.1" },
                "versions": { "0.0.1": {} }
            }),
        )
        .await;

        let pkg = engine_for(&server, false)
            .discover_package("docscout-fixture-bare")
            .await;
        assert_eq!(pkg.docs_url.as_deref(), Some(pkg.npm_url.as_str()));
        assert_eq!(pkg.npm_url, format!("{}/package/docscout-fixture-bare", server.uri()));
        assert_eq!(pkg.confidence, Confidence::Low);
        assert_eq!(pkg.source, DiscoverySource::Registry);
        assert_eq!(pkg.description.as_deref(), Some("Nothing to see"));
        assert_eq!(pkg.keywords, vec!["bare"]);
    }

    #[tokio::test]
    async fn test_override_survives_registry_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let engine = engine_for(&server, false)
            .with_overrides([("docscout-fixture-known", "https://known.example.com/docs")]);
        let pkg = engine.discover_package("docscout-fixture-known").await;
        assert_eq!(pkg.docs_url.as_deref(), Some("https://known.example.com/docs"));
        assert_eq!(pkg.confidence, Confidence::High);
        assert_eq!(pkg.source, DiscoverySource::KnownOverride);
        assert_eq!(pkg.version, UNKNOWN_VERSION);
    }

    #[tokio::test]
    async fn test_batch_deduplicates_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let engine = engine_for(&server, false);
        let results = engine
            .discover_packages(["docscout-fixture-a", "docscout-fixture-a", "docscout-fixture-b"])
            .await;
        assert_eq!(results.len(), 2);
        assert_eq!(engine.cache_len(), 2);
    }

    #[tokio::test]
    async fn test_batches_run_one_after_another() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(400))
                    .set_body_json(json!({ "homepage": "https://fixture.example.com/docs" })),
            )
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.discovery.registry_url = server.uri();
        config.discovery.fetch_timeout_secs = 5;
        config.discovery.batch_size = 2;
        let engine = DiscoveryEngine::with_config(config).unwrap();

        let started = std::time::Instant::now();
        let results = engine
            .discover_packages([
                "docscout-fixture-b1",
                "docscout-fixture-b2",
                "docscout-fixture-b3",
                "docscout-fixture-b4",
            ])
            .await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 4);
        assert!(
            results.values().all(|pkg| pkg.source == DiscoverySource::Homepage),
            "every lookup should reach the registry"
        );
        // Two batches of two: each batch waits on one delayed response.
        assert!(elapsed >= std::time::Duration::from_millis(800), "batches overlapped: {elapsed:?}");
        assert!(elapsed < std::time::Duration::from_millis(1500), "batch members ran serially: {elapsed:?}");
    }

    #[test]
    fn test_npm_url_keeps_scope() {
        let engine = DiscoveryEngine::new().unwrap();
        assert_eq!(
            engine.npm_url("@babel/core"),
            "https://www.npmjs.com/package/@babel/core"
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.discovery.batch_size = 0;
        assert!(matches!(
            DiscoveryEngine::with_config(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_configured_overrides_and_organizations_are_applied() {
        let mut config = Config::default();
        config
            .overrides
            .insert("react".to_string(), "https://mirror.example.com/react".to_string());
        config.organizations.insert(
            "@acme".to_string(),
            vec!["https://docs.acme.dev/{pkg}".to_string()],
        );

        let engine = DiscoveryEngine::with_config(config).unwrap();
        assert_eq!(
            engine.known_docs().get("react"),
            Some("https://mirror.example.com/react")
        );
        assert_eq!(
            engine.organizations.candidates("@acme/widgets")[0].url,
            "https://docs.acme.dev/widgets"
        );
    }
}
