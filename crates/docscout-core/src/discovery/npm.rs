//! npm registry client.
//!
//! Reads `{registry_url}/{name}`, resolves the `latest` dist-tag, and merges
//! version-specific fields over package-level ones. The raw JSON shapes stay
//! private to this module; callers only see [`PackageMetadata`].

use crate::discovery::filter::extract_github_url;
use crate::{Fetcher, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Normalized registry metadata for one package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageMetadata {
    /// Package name as published.
    pub name: String,
    /// Version the `latest` dist-tag points at.
    pub version: Option<String>,
    /// Package description.
    pub description: Option<String>,
    /// Package keywords.
    pub keywords: Vec<String>,
    /// Homepage URL as published.
    pub homepage: Option<String>,
    /// Repository URL as published (not canonicalized).
    pub repository: Option<String>,
    /// Canonical GitHub URL from `repository`, falling back to `bugs.url`.
    pub github_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    name: Option<String>,
    description: Option<String>,
    homepage: Option<String>,
    repository: Option<RepositoryField>,
    bugs: Option<BugsField>,
    #[serde(default)]
    keywords: Option<KeywordsField>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, VersionDocument>,
}

#[derive(Debug, Deserialize)]
struct VersionDocument {
    description: Option<String>,
    homepage: Option<String>,
    repository: Option<RepositoryField>,
    bugs: Option<BugsField>,
    keywords: Option<KeywordsField>,
}

/// `repository` is either a string or `{ "type": "git", "url": "..." }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RepositoryField {
    Url(String),
    Object { url: Option<String> },
}

impl RepositoryField {
    fn into_url(self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url),
            Self::Object { url } => url,
        }
    }
}

/// `bugs` is either a string URL or `{ "url": "...", "email": "..." }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BugsField {
    Url(String),
    Object { url: Option<String> },
}

impl BugsField {
    fn into_url(self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url),
            Self::Object { url } => url,
        }
    }
}

/// Some packages publish `keywords` as a single comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordsField {
    List(Vec<String>),
    Text(String),
}

impl KeywordsField {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(list) => list,
            Self::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl RegistryDocument {
    fn into_metadata(mut self, requested: &str) -> PackageMetadata {
        let version = self.dist_tags.remove("latest");
        let latest = version.as_ref().and_then(|v| self.versions.remove(v));

        let (v_description, v_homepage, v_repository, v_bugs, v_keywords) = latest.map_or(
            (None, None, None, None, None),
            |v| (v.description, v.homepage, v.repository, v.bugs, v.keywords),
        );

        let description = non_empty(v_description).or_else(|| non_empty(self.description));
        let homepage = non_empty(v_homepage).or_else(|| non_empty(self.homepage));
        let repository = non_empty(v_repository.and_then(RepositoryField::into_url))
            .or_else(|| non_empty(self.repository.and_then(RepositoryField::into_url)));
        let bugs = non_empty(v_bugs.and_then(BugsField::into_url))
            .or_else(|| non_empty(self.bugs.and_then(BugsField::into_url)));
        let keywords = v_keywords
            .or(self.keywords)
            .map(KeywordsField::into_vec)
            .unwrap_or_default();

        let github_url = repository
            .as_deref()
            .and_then(extract_github_url)
            .or_else(|| bugs.as_deref().and_then(extract_github_url));

        PackageMetadata {
            name: self.name.unwrap_or_else(|| requested.to_string()),
            version,
            description,
            keywords,
            homepage,
            repository,
            github_url,
        }
    }
}

/// Parse a registry document. Exposed for tests and offline tooling.
pub fn parse_registry_document(json: &str, requested: &str) -> Result<PackageMetadata> {
    let doc: RegistryDocument = serde_json::from_str(json)?;
    Ok(doc.into_metadata(requested))
}

/// Registry API path for a package; scoped names keep `@` and encode `/`.
pub fn registry_path(name: &str) -> String {
    name.replace('/', "%2F")
}

/// Client for the package registry HTTP API.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    fetcher: Fetcher,
    base_url: String,
}

impl RegistryClient {
    /// Create a client against `base_url` (e.g. `https://registry.npmjs.org`).
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    /// Fetch and normalize metadata for a package.
    ///
    /// Fails soft: network errors, non-2xx responses, and malformed payloads
    /// all yield `None`.
    #[instrument(skip(self))]
    pub async fn get_metadata(&self, name: &str) -> Option<PackageMetadata> {
        let url = format!("{}/{}", self.base_url, registry_path(name));
        let doc: RegistryDocument = match self.fetcher.get_json(&url).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(package = %name, category = e.category(), error = %e, "Registry lookup failed");
                return None;
            },
        };

        let metadata = doc.into_metadata(name);
        debug!(
            package = %name,
            version = ?metadata.version,
            homepage = ?metadata.homepage,
            github = ?metadata.github_url,
            "Resolved registry metadata"
        );
        Some(metadata)
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
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_version_fields_override_package_fields() {
        let doc = json!({
            "name": "widget",
            "description": "package-level",
            "homepage": "https://old.example.com",
            "repository": "git+https://github.com/acme/old.git",
            "keywords": ["old"],
            "dist-tags": { "latest": "2.0.0", "next": "3.0.0-rc.1" },
            "versions": {
                "1.0.0": { "homepage": "https://v1.example.com" },
                "2.0.0": {
                    "homepage": "https://widget.dev",
                    "repository": { "type": "git", "url": "git+https://github.com/acme/widget.git" },
                    "keywords": ["ui", "widget"]
                }
            }
        });

        let meta = parse_registry_document(&doc.to_string(), "widget").unwrap();
        assert_eq!(meta.version.as_deref(), Some("2.0.0"));
        assert_eq!(meta.homepage.as_deref(), Some("https://widget.dev"));
        assert_eq!(meta.github_url.as_deref(), Some("https://github.com/acme/widget"));
        assert_eq!(meta.keywords, vec!["ui", "widget"]);
        // Not set on the version, so the package-level value is used.
        assert_eq!(meta.description.as_deref(), Some("package-level"));
    }

    #[test]
    fn test_package_level_fallback_without_latest() {
        let doc = json!({
            "name": "bare",
            "homepage": "https://bare.example.com",
            "repository": { "url": "https://github.com/acme/bare" }
        });

        let meta = parse_registry_document(&doc.to_string(), "bare").unwrap();
        assert_eq!(meta.version, None);
        assert_eq!(meta.homepage.as_deref(), Some("https://bare.example.com"));
        assert_eq!(meta.github_url.as_deref(), Some("https://github.com/acme/bare"));
    }

    #[test]
    fn test_bugs_url_used_when_repository_missing() {
        let doc = json!({
            "name": "buggy",
            "bugs": { "url": "https://github.com/acme/buggy/issues" }
        });

        let meta = parse_registry_document(&doc.to_string(), "buggy").unwrap();
        assert_eq!(meta.repository, None);
        assert_eq!(meta.github_url.as_deref(), Some("https://github.com/acme/buggy"));
    }

    #[test]
    fn test_blank_fields_are_ignored() {
        let doc = json!({
            "name": "blank",
            "homepage": "https://blank.example.com",
            "dist-tags": { "latest": "1.0.0" },
            "versions": { "1.0.0": { "homepage": "  ", "keywords": "a, b,,c" } }
        });

        let meta = parse_registry_document(&doc.to_string(), "blank").unwrap();
        assert_eq!(meta.homepage.as_deref(), Some("https://blank.example.com"));
        assert_eq!(meta.keywords, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(parse_registry_document("[1, 2, 3]", "x").is_err());
        assert!(parse_registry_document("{", "x").is_err());
    }

    #[test]
    fn test_registry_path_encodes_scope() {
        assert_eq!(registry_path("@babel/core"), "@babel%2Fcore");
        assert_eq!(registry_path("lodash"), "lodash");
    }

    #[tokio::test]
    async fn test_get_metadata_from_mock_registry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lodash"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "lodash",
                "description": "Lodash modular utilities.",
                "dist-tags": { "latest": "4.17.21" },
                "versions": { "4.17.21": { "homepage": "https://lodash.com/" } }
            })))
            .mount(&mock_server)
            .await;

        let client = RegistryClient::new(Fetcher::new().unwrap(), mock_server.uri());
        let meta = client.get_metadata("lodash").await.unwrap();
        assert_eq!(meta.version.as_deref(), Some("4.17.21"));
        assert_eq!(meta.homepage.as_deref(), Some("https://lodash.com/"));
    }

    #[tokio::test]
    async fn test_get_metadata_fails_soft() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&mock_server)
            .await;

        let client = RegistryClient::new(Fetcher::new().unwrap(), mock_server.uri());
        assert!(client.get_metadata("broken").await.is_none());
        assert!(client.get_metadata("garbage").await.is_none());
        assert!(client.get_metadata("unmocked").await.is_none());
    }
}
