//! Candidate documentation URL generators.
//!
//! Both generators are pure: they build ordered `(url, confidence)` lists,
//! most likely first, and leave existence checks to the engine.

use crate::Confidence;
use crate::discovery::filter::{is_repository_host, sanitize_package_name, split_scope};
use std::collections::{BTreeMap, HashSet};
use url::{Host, Url};

/// Placeholder substituted with the (possibly transformed) unscoped name.
pub const PKG_PLACEHOLDER: &str = "{pkg}";

/// A documentation URL to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute URL to check.
    pub url: String,
    /// Confidence assigned if the URL exists.
    pub confidence: Confidence,
}

impl Candidate {
    fn new(url: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            url: url.into(),
            confidence,
        }
    }
}

/// URL conventions for one organization scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgRule {
    /// Templates tried in order; `{pkg}` is replaced with the service name.
    pub templates: Vec<String>,
    /// Prefixes removed from the unscoped name before substitution
    /// (`client-` for `@aws-sdk/client-s3`).
    pub strip_prefixes: Vec<String>,
    /// Unscoped names whose documentation lives somewhere the templates
    /// cannot express. Tried before the templates.
    pub overrides: BTreeMap<String, String>,
}

impl OrgRule {
    /// Rule with templates only.
    pub fn templates<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    fn strip(mut self, prefixes: &[&str]) -> Self {
        self.strip_prefixes = prefixes.iter().map(|p| (*p).to_string()).collect();
        self
    }

    #[must_use]
    fn special(mut self, pkg: &str, url: &str) -> Self {
        self.overrides.insert(pkg.to_string(), url.to_string());
        self
    }

    fn service_name<'a>(&self, pkg: &'a str) -> &'a str {
        self.strip_prefixes
            .iter()
            .find_map(|prefix| pkg.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(pkg)
    }

    fn candidates(&self, pkg: &str) -> Vec<Candidate> {
        let service = self.service_name(pkg);
        let special = self
            .overrides
            .get(pkg)
            .or_else(|| self.overrides.get(service))
            .cloned();

        special
            .into_iter()
            .chain(
                self.templates
                    .iter()
                    .map(|t| t.replace(PKG_PLACEHOLDER, service)),
            )
            .map(|url| Candidate::new(url, Confidence::High))
            .collect()
    }
}

/// Organization table keyed by scope (`@aws-sdk`).
#[derive(Debug, Clone)]
pub struct OrganizationPatterns {
    rules: BTreeMap<String, OrgRule>,
}

impl OrganizationPatterns {
    /// Table with the built-in organizations.
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Table with no organizations.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Register templates for a scope, replacing any existing rule.
    ///
    /// `org` may be given with or without the leading `@`.
    #[must_use]
    pub fn with_org<I, S>(mut self, org: &str, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.insert(scope_key(org), OrgRule::templates(templates));
        self
    }

    /// Register a full rule for a scope, replacing any existing rule.
    #[must_use]
    pub fn with_rule(mut self, org: &str, rule: OrgRule) -> Self {
        self.rules.insert(scope_key(org), rule);
        self
    }

    /// True when the scope has a rule.
    pub fn knows(&self, org: &str) -> bool {
        self.rules.contains_key(&scope_key(org))
    }

    /// Candidates for a package name.
    ///
    /// Unscoped names and unknown scopes yield an empty list.
    pub fn candidates(&self, name: &str) -> Vec<Candidate> {
        let Some((scope, pkg)) = split_scope(name) else {
            return Vec::new();
        };
        self.rules
            .get(&scope.to_lowercase())
            .map(|rule| dedup(rule.candidates(pkg)))
            .unwrap_or_default()
    }

    /// Known scopes in sorted order.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl Default for OrganizationPatterns {
    fn default() -> Self {
        Self::new()
    }
}

fn scope_key(org: &str) -> String {
    let org = org.trim().to_lowercase();
    if org.starts_with('@') {
        org
    } else {
        format!("@{org}")
    }
}

/// Organization candidates using only the built-in table.
pub fn organization_patterns(name: &str) -> Vec<Candidate> {
    OrganizationPatterns::new().candidates(name)
}

fn builtin_rules() -> BTreeMap<String, OrgRule> {
    const AWS_V3: &str = "https://docs.aws.amazon.com/AWSJavaScriptSDK/v3/latest";
    const FRAMEWORK_PREFIXES: &[&str] = &["react-", "vue-", "solid-", "svelte-", "angular-"];

    let rules = [
        (
            "@aws-sdk",
            OrgRule::templates([format!("{AWS_V3}/client/{PKG_PLACEHOLDER}/")])
                .strip(&["client-"])
                .special("lib-dynamodb", &format!("{AWS_V3}/Package/-aws-sdk-lib-dynamodb/"))
                .special("lib-storage", &format!("{AWS_V3}/Package/-aws-sdk-lib-storage/"))
                .special(
                    "credential-providers",
                    &format!("{AWS_V3}/Package/-aws-sdk-credential-providers/"),
                )
                .special(
                    "s3-request-presigner",
                    &format!("{AWS_V3}/Package/-aws-sdk-s3-request-presigner/"),
                )
                .special("types", &format!("{AWS_V3}/Package/-aws-sdk-types/")),
        ),
        (
            "@azure",
            OrgRule::templates(["https://learn.microsoft.com/en-us/javascript/api/@azure/{pkg}/"]),
        ),
        (
            "@google-cloud",
            OrgRule::templates(["https://cloud.google.com/nodejs/docs/reference/{pkg}/latest"]),
        ),
        (
            "@angular",
            OrgRule::templates(["https://angular.dev/api/{pkg}", "https://angular.dev/overview"])
                .special("cli", "https://angular.dev/cli"),
        ),
        (
            "@mui",
            OrgRule::templates(["https://mui.com/{pkg}/getting-started/"])
                .special("material", "https://mui.com/material-ui/getting-started/")
                .special("joy", "https://mui.com/joy-ui/getting-started/")
                .special("base", "https://mui.com/base-ui/getting-started/")
                .special("x-data-grid", "https://mui.com/x/react-data-grid/")
                .special("x-date-pickers", "https://mui.com/x/react-date-pickers/"),
        ),
        (
            "@tanstack",
            OrgRule::templates(["https://tanstack.com/{pkg}/latest/docs/overview"])
                .strip(FRAMEWORK_PREFIXES),
        ),
        (
            "@babel",
            OrgRule::templates(["https://babeljs.io/docs/babel-{pkg}"]),
        ),
        (
            "@nestjs",
            OrgRule::templates(["https://docs.nestjs.com/techniques/{pkg}", "https://docs.nestjs.com/"])
                .special("core", "https://docs.nestjs.com/")
                .special("common", "https://docs.nestjs.com/"),
        ),
        (
            "@sentry",
            OrgRule::templates([
                "https://docs.sentry.io/platforms/javascript/guides/{pkg}/",
                "https://docs.sentry.io/platforms/javascript/",
            ])
            .special("browser", "https://docs.sentry.io/platforms/javascript/"),
        ),
        (
            "@radix-ui",
            OrgRule::templates(["https://www.radix-ui.com/primitives/docs/components/{pkg}"])
                .strip(&["react-"]),
        ),
        (
            "@prisma",
            OrgRule::templates(["https://www.prisma.io/docs"])
                .special("client", "https://www.prisma.io/docs/orm/prisma-client"),
        ),
        (
            "@trpc",
            OrgRule::templates(["https://trpc.io/docs/{pkg}", "https://trpc.io/docs"]),
        ),
        (
            "@vue",
            OrgRule::templates(["https://vuejs.org/api/"])
                .special("test-utils", "https://test-utils.vuejs.org/")
                .special("devtools", "https://devtools.vuejs.org/"),
        ),
        (
            "@storybook",
            OrgRule::templates(["https://storybook.js.org/docs/{pkg}", "https://storybook.js.org/docs"]),
        ),
    ];

    rules
        .into_iter()
        .map(|(org, rule)| (org.to_string(), rule))
        .collect()
}

/// Generic candidates from the homepage and GitHub repository.
///
/// Homepage-derived candidates are produced only for an http(s) homepage
/// that is not on a repository host. Order: `docs.` subdomain, `/docs`,
/// `/documentation`, `/guide`, GitHub Pages, ReadTheDocs. The first two are
/// `high`; the rest are `medium`.
pub fn generic_patterns(
    homepage: Option<&str>,
    github_url: Option<&str>,
    name: &str,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    if let Some(url) = homepage
        .filter(|h| !is_repository_host(h))
        .and_then(|h| Url::parse(h).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
    {
        if let Some(subdomain) = docs_subdomain(&url) {
            candidates.push(Candidate::new(subdomain, Confidence::High));
        }

        let base = homepage_base(&url);
        candidates.push(Candidate::new(format!("{base}/docs"), Confidence::High));
        candidates.push(Candidate::new(format!("{base}/documentation"), Confidence::Medium));
        candidates.push(Candidate::new(format!("{base}/guide"), Confidence::Medium));
    }

    if let Some((owner, repo)) = github_url.and_then(github_owner_repo) {
        candidates.push(Candidate::new(
            format!("https://{}.github.io/{repo}", owner.to_lowercase()),
            Confidence::Medium,
        ));
    }

    let slug = sanitize_package_name(name);
    if !slug.is_empty() {
        candidates.push(Candidate::new(
            format!("https://{slug}.readthedocs.io"),
            Confidence::Medium,
        ));
    }

    dedup(candidates)
}

/// `docs.` variant of the homepage host, or `None` for IP hosts and hosts
/// that already are a docs subdomain.
fn docs_subdomain(url: &Url) -> Option<String> {
    let Some(Host::Domain(host)) = url.host() else {
        return None;
    };
    let host = host.to_lowercase();
    if host.starts_with("docs.") {
        return None;
    }
    let apex = host.strip_prefix("www.").unwrap_or(&host);
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    Some(format!("{}://docs.{apex}{port}", url.scheme()))
}

/// Homepage without query, fragment, or trailing slash.
fn homepage_base(url: &Url) -> String {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.as_str().trim_end_matches('/').to_string()
}

fn github_owner_repo(github_url: &str) -> Option<(String, String)> {
    let url = Url::parse(github_url).ok()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?.to_string();
    let repo = segments.next()?.trim_end_matches(".git").to_string();
    (!repo.is_empty()).then_some((owner, repo))
}

fn dedup(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::disallowed_macros)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn urls(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn test_unscoped_and_unknown_scopes_yield_nothing() {
        assert!(organization_patterns("lodash").is_empty());
        assert!(organization_patterns("@nobody-knows/thing").is_empty());
        assert!(organization_patterns("@aws-sdk/").is_empty());
    }

    #[test]
    fn test_aws_client_prefix_is_stripped() {
        let candidates = organization_patterns("@aws-sdk/client-s3");
        assert_eq!(
            candidates[0].url,
            "https://docs.aws.amazon.com/AWSJavaScriptSDK/v3/latest/client/s3/"
        );
        assert!(candidates.iter().all(|c| c.confidence == Confidence::High));
    }

    #[test]
    fn test_aws_special_case_comes_first() {
        let candidates = organization_patterns("@aws-sdk/lib-dynamodb");
        assert_eq!(
            candidates[0].url,
            "https://docs.aws.amazon.com/AWSJavaScriptSDK/v3/latest/Package/-aws-sdk-lib-dynamodb/"
        );
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_tanstack_framework_prefix() {
        let candidates = organization_patterns("@tanstack/react-query");
        assert_eq!(
            candidates[0].url,
            "https://tanstack.com/query/latest/docs/overview"
        );
    }

    #[test]
    fn test_scope_lookup_is_case_insensitive() {
        assert_eq!(
            organization_patterns("@Babel/core"),
            organization_patterns("@babel/core")
        );
    }

    #[test]
    fn test_custom_org_replaces_builtin() {
        let patterns = OrganizationPatterns::new()
            .with_org("acme", ["https://docs.acme.dev/{pkg}", "https://acme.dev/{pkg}/docs"])
            .with_org("@babel", ["https://mirror.example.com/babel/{pkg}"]);

        assert!(patterns.knows("@acme"));
        assert_eq!(
            urls(&patterns.candidates("@acme/widgets")),
            vec!["https://docs.acme.dev/widgets", "https://acme.dev/widgets/docs"]
        );
        assert_eq!(
            urls(&patterns.candidates("@babel/core")),
            vec!["https://mirror.example.com/babel/core"]
        );
    }

    #[test]
    fn test_every_builtin_scope_produces_candidates() {
        let patterns = OrganizationPatterns::new();
        let scopes: Vec<String> = patterns.scopes().map(String::from).collect();
        assert!(scopes.len() >= 14);
        for scope in scopes {
            let candidates = patterns.candidates(&format!("{scope}/thing"));
            assert!(!candidates.is_empty(), "{scope}");
            for c in candidates {
                assert!(c.url.starts_with("https://"), "{}", c.url);
                assert!(!c.url.contains(PKG_PLACEHOLDER), "{}", c.url);
            }
        }
    }

    #[test]
    fn test_generic_patterns_full_order() {
        let candidates = generic_patterns(
            Some("https://www.widget.com/"),
            Some("https://github.com/Acme/widget"),
            "@acme/widget",
        );
        assert_eq!(
            urls(&candidates),
            vec![
                "https://docs.widget.com",
                "https://www.widget.com/docs",
                "https://www.widget.com/documentation",
                "https://www.widget.com/guide",
                "https://acme.github.io/widget",
                "https://acme-widget.readthedocs.io",
            ]
        );
        let confidences: Vec<Confidence> = candidates.iter().map(|c| c.confidence).collect();
        assert_eq!(
            confidences,
            vec![
                Confidence::High,
                Confidence::High,
                Confidence::Medium,
                Confidence::Medium,
                Confidence::Medium,
                Confidence::Medium,
            ]
        );
    }

    #[test]
    fn test_generic_patterns_skip_repository_homepage() {
        let candidates = generic_patterns(
            Some("https://github.com/acme/widget#readme"),
            Some("https://github.com/acme/widget"),
            "widget",
        );
        assert_eq!(
            urls(&candidates),
            vec!["https://acme.github.io/widget", "https://widget.readthedocs.io"]
        );
    }

    #[test]
    fn test_generic_patterns_keep_port_and_skip_ip_subdomain() {
        let candidates = generic_patterns(Some("http://127.0.0.1:8080/site/"), None, "x");
        assert_eq!(candidates[0].url, "http://127.0.0.1:8080/site/docs");

        let candidates = generic_patterns(Some("http://example.test:8080"), None, "x");
        assert_eq!(candidates[0].url, "http://docs.example.test:8080");
    }

    #[test]
    fn test_generic_patterns_docs_host_has_no_subdomain_candidate() {
        let candidates = generic_patterns(Some("https://docs.widget.com"), None, "widget");
        assert_eq!(candidates[0].url, "https://docs.widget.com/docs");
    }

    proptest! {
        #[test]
        fn prop_generic_candidates_are_unique(name in "[a-z][a-z0-9-]{0,20}") {
            let homepage = format!("https://{name}.example.com");
            let candidates = generic_patterns(Some(&homepage), None, &name);
            let unique: HashSet<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
            prop_assert_eq!(unique.len(), candidates.len());
        }
    }
}
