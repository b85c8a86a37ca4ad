use serde::{Deserialize, Serialize};
use std::fmt;

/// Version recorded when registry metadata could not be fetched.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Ordinal trust level attached to a discovered documentation URL.
///
/// Variants are declared low-to-high so `Ord` matches trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Terminal registry-page fallback.
    Low,
    /// Plausible but unverified against documentation signals.
    Medium,
    /// Curated, organization-convention, or strongly docs-shaped.
    High,
}

impl Confidence {
    /// Lowercase label, as serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which discovery tier produced a package's `docs_url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    /// Curated override table.
    KnownOverride,
    /// Homepage from registry metadata, accepted directly.
    Homepage,
    /// Organization-specific URL convention.
    OrganizationPattern,
    /// Generic URL convention (docs subdomain, `/docs`, GitHub Pages, ...).
    GenericPattern,
    /// Documentation link found on the homepage.
    HomepageContent,
    /// GitHub repository fallback.
    GitHub,
    /// Registry package page fallback.
    Registry,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::KnownOverride => "known override",
            Self::Homepage => "homepage",
            Self::OrganizationPattern => "organization pattern",
            Self::GenericPattern => "generic pattern",
            Self::HomepageContent => "homepage content",
            Self::GitHub => "github",
            Self::Registry => "registry",
        };
        f.write_str(label)
    }
}

/// The discovery engine's answer for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredPackage {
    /// Package name as requested, scope included.
    pub name: String,
    /// Latest version from the registry, or [`UNKNOWN_VERSION`].
    pub version: String,
    /// Registry description, if any.
    pub description: Option<String>,
    /// Registry keywords; empty when unknown.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Best documentation URL; always filled by at least the registry fallback.
    pub docs_url: Option<String>,
    /// Canonical `https://github.com/{owner}/{repo}` when the repository is on GitHub.
    pub github_url: Option<String>,
    /// Registry page for the package.
    pub npm_url: String,
    /// Trust level of `docs_url`.
    pub confidence: Confidence,
    /// Tier that produced `docs_url`.
    pub source: DiscoverySource,
}

/// One navigable section of a documentation site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocSection {
    /// Link text, or a title synthesized from the path.
    pub title: String,
    /// Normalized in-origin path (no query or fragment, no trailing slash).
    pub path: String,
    /// Absolute URL for the section.
    pub url: String,
}

/// Output of one crawl of a documentation site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// The URL that was crawled.
    pub base_url: String,
    /// Whether the page looks like documentation.
    pub is_valid_docs: bool,
    /// Page `<title>`, or the first `<h1>`.
    pub title: Option<String>,
    /// Ordered sections, unique by normalized path.
    pub sections: Vec<DocSection>,
    /// A sitemap contributed at least one section.
    pub sitemap_found: bool,
    /// Sidebar navigation contributed at least one section.
    pub navigation_found: bool,
}

impl CrawlResult {
    /// Result for a page that could not be fetched at all.
    pub fn unreachable(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            is_valid_docs: false,
            title: None,
            sections: Vec::new(),
            sitemap_found: false,
            navigation_found: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
        assert_eq!(
            [Confidence::Low, Confidence::High, Confidence::Medium]
                .into_iter()
                .max(),
            Some(Confidence::High)
        );
    }

    #[test]
    fn test_discovered_package_serializes_camel_case() {
        let pkg = DiscoveredPackage {
            name: "@scope/pkg".to_string(),
            version: UNKNOWN_VERSION.to_string(),
            description: None,
            keywords: Vec::new(),
            docs_url: Some("https://www.npmjs.com/package/@scope/pkg".to_string()),
            github_url: None,
            npm_url: "https://www.npmjs.com/package/@scope/pkg".to_string(),
            confidence: Confidence::Low,
            source: DiscoverySource::Registry,
        };

        let json = serde_json::to_value(&pkg).unwrap();
        assert_eq!(json["docsUrl"], json["npmUrl"]);
        assert_eq!(json["confidence"], "low");
        assert_eq!(json["source"], "registry");
        assert!(json["githubUrl"].is_null());
    }

    #[test]
    fn test_unreachable_crawl_result() {
        let result = CrawlResult::unreachable("https://docs.example.com");
        assert!(!result.is_valid_docs);
        assert!(result.sections.is_empty());
        assert!(!result.sitemap_found && !result.navigation_found);
    }
}
