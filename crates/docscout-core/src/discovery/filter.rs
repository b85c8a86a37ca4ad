//! Pure heuristics used by discovery and crawling.
//!
//! Every function here is free of I/O so each rule can be tested on its own.
//!
//! ```rust
//! use docscout_core::Confidence;
//! use docscout_core::discovery::filter::{homepage_confidence, is_repository_host, is_likely_docs_path};
//!
//! assert!(is_repository_host("https://github.com/facebook/react"));
//! assert!(!is_repository_host("https://vitejs.github.io/vite"));
//! assert_eq!(homepage_confidence("https://docs.example.com"), Confidence::High);
//! assert!(is_likely_docs_path("/docs/getting-started"));
//! ```

use crate::Confidence;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Substrings that mark a URL or link text as documentation.
pub const DOCS_INDICATORS: &[&str] = &["docs", "documentation", "guide", "api-reference"];

/// Hosts that serve source repositories rather than documentation.
const REPOSITORY_HOSTS: &[&str] = &[
    "github.com",
    "www.github.com",
    "gitlab.com",
    "www.gitlab.com",
    "bitbucket.org",
    "www.bitbucket.org",
];

/// Top-level domains common for project sites that double as documentation.
const INDICATIVE_TLDS: &[&str] = &[".dev", ".io"];

/// Path prefixes that indicate documentation content.
const DOCS_PATH_PREFIXES: &[&str] = &[
    "/docs",
    "/doc",
    "/documentation",
    "/guide",
    "/guides",
    "/api",
    "/reference",
    "/learn",
    "/tutorial",
    "/tutorials",
    "/manual",
    "/handbook",
    "/getting-started",
    "/quickstart",
    "/examples",
    "/concepts",
    "/components",
    "/hooks",
];

/// Path prefixes that indicate non-documentation content.
const NON_DOCS_PATH_PREFIXES: &[&str] = &[
    "/blog",
    "/about",
    "/careers",
    "/pricing",
    "/login",
    "/signup",
    "/sign-up",
    "/signin",
    "/sign-in",
    "/register",
    "/assets",
    "/static",
    "/_next",
    "/_nuxt",
    "/cdn-cgi",
    "/wp-content",
    "/wp-admin",
    "/feed",
    "/contact",
    "/privacy",
    "/terms",
    "/legal",
    "/jobs",
    "/team",
    "/press",
    "/news",
    "/showcase",
    "/sponsors",
];

/// File extensions that indicate non-documentation content.
const NON_DOCS_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", ".css", ".js", ".mjs", ".woff",
    ".woff2", ".ttf", ".pdf", ".zip", ".gz", ".mp4", ".webm", ".json", ".xml", ".txt", ".map",
];

/// `github.com[/:]owner/repo` anywhere in a repository string.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static GITHUB_REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)github\.com[/:]([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)").unwrap()
});

/// npm shorthands: `github:owner/repo` or bare `owner/repo`.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static GITHUB_SHORTHAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:github:)?([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").unwrap()
});

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(str::to_ascii_lowercase)
}

/// True when `text` contains a documentation-indicative substring.
pub fn is_docs_indicative(text: &str) -> bool {
    let lower = text.to_lowercase();
    DOCS_INDICATORS.iter().any(|needle| lower.contains(needle))
}

/// True when the URL's host is exactly a source-repository host.
///
/// `*.github.io` project sites are not repository hosts.
pub fn is_repository_host(url: &str) -> bool {
    host_of(url).is_some_and(|host| REPOSITORY_HOSTS.contains(&host.as_str()))
}

/// True for GitHub Pages hosts (`owner.github.io`).
pub fn is_github_pages(url: &str) -> bool {
    host_of(url).is_some_and(|host| host.ends_with(".github.io"))
}

/// True when the host ends in a TLD that usually hosts project docs.
pub fn has_indicative_tld(url: &str) -> bool {
    host_of(url).is_some_and(|host| INDICATIVE_TLDS.iter().any(|tld| host.ends_with(tld)))
}

/// True when the host itself is a `docs.` subdomain.
pub fn is_docs_host(url: &str) -> bool {
    host_of(url).is_some_and(|host| host.starts_with("docs."))
}

/// Confidence for a homepage accepted directly as documentation.
pub fn homepage_confidence(url: &str) -> Confidence {
    if is_docs_indicative(url) || has_indicative_tld(url) || is_github_pages(url) {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

/// Canonicalize a repository reference to `https://github.com/{owner}/{repo}`.
///
/// Accepts `git+https://`, `git://`, `ssh://git@`, `git@github.com:`,
/// `github:owner/repo`, bare `owner/repo`, and deep links into a repository.
/// Returns `None` for non-GitHub repositories.
pub fn extract_github_url(repository: &str) -> Option<String> {
    let trimmed = repository.trim();
    let caps = GITHUB_REPO_RE
        .captures(trimmed)
        .or_else(|| GITHUB_SHORTHAND_RE.captures(trimmed))?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(format!("https://github.com/{owner}/{repo}"))
}

/// Split `@scope/name` into `("@scope", "name")`.
pub fn split_scope(name: &str) -> Option<(&str, &str)> {
    if !name.starts_with('@') {
        return None;
    }
    let (scope, rest) = name.split_once('/')?;
    (!rest.is_empty() && scope.len() > 1).then_some((scope, rest))
}

/// Package name without its scope.
pub fn unscoped_name(name: &str) -> &str {
    split_scope(name).map_or(name, |(_, rest)| rest)
}

/// Package name reduced to a hostname-safe slug: `@scope/pkg` becomes `scope-pkg`.
pub fn sanitize_package_name(name: &str) -> String {
    name.trim_start_matches('@')
        .replace('/', "-")
        .replace('@', "")
        .to_lowercase()
}

/// Check if a URL path is likely documentation.
///
/// Static-asset extensions and paths that start with a marketing prefix are
/// rejected first, then the path must start with (or contain as a whole
/// segment) a docs prefix. `/docs/about` is kept while `/about` is not.
pub fn is_likely_docs_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();

    if NON_DOCS_EXTENSIONS
        .iter()
        .any(|ext| path_lower.ends_with(ext))
    {
        return false;
    }
    if NON_DOCS_PATH_PREFIXES
        .iter()
        .any(|prefix| starts_with_segment(&path_lower, prefix))
    {
        return false;
    }
    DOCS_PATH_PREFIXES
        .iter()
        .any(|prefix| contains_path_segment(&path_lower, prefix))
}

/// True when the path has at least two non-empty segments (`/a/b`).
pub fn is_nested_path(path: &str) -> bool {
    path.split('/').filter(|s| !s.is_empty()).count() >= 2
}

/// Check if the path's leading segment is exactly `prefix`.
fn starts_with_segment(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

/// Check if a path contains `indicator` as a whole segment.
///
/// `/docs` matches `/docs`, `/docs/intro`, and `/v2/docs`, but not `/docsify`.
fn contains_path_segment(path: &str, indicator: &str) -> bool {
    path.match_indices(indicator).any(|(pos, _)| {
        let rest = &path[pos + indicator.len()..];
        rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') || rest.starts_with('#')
    })
}

/// Normalize a URL path for de-duplication.
///
/// Drops query and fragment, collapses the trailing slash (root stays `/`).
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Human-readable title from the final path segment.
///
/// `/docs/getting-started` becomes `Getting Started`; `/` becomes `Home`.
pub fn title_from_path(path: &str) -> String {
    let segment = normalize_path(path)
        .rsplit('/')
        .find(|s| !s.is_empty())
        .map(|s| s.trim_end_matches(".html").to_string());

    let Some(segment) = segment else {
        return "Home".to_string();
    };

    segment
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
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
    use proptest::prelude::*;

    #[test]
    fn test_repository_hosts_are_disqualified() {
        assert!(is_repository_host("https://github.com/facebook/react"));
        assert!(is_repository_host("https://www.github.com/facebook/react#readme"));
        assert!(is_repository_host("https://gitlab.com/group/project"));
        assert!(is_repository_host("https://bitbucket.org/team/repo"));
    }

    #[test]
    fn test_github_pages_is_not_a_repository_host() {
        assert!(!is_repository_host("https://vitejs.github.io/vite"));
        assert!(is_github_pages("https://vitejs.github.io/vite"));
        assert!(!is_github_pages("https://github.com/vitejs/vite"));
    }

    #[test]
    fn test_homepage_confidence() {
        assert_eq!(homepage_confidence("https://docs.example.com"), Confidence::High);
        assert_eq!(homepage_confidence("https://example.com/guide/"), Confidence::High);
        assert_eq!(homepage_confidence("https://vitest.dev"), Confidence::High);
        assert_eq!(homepage_confidence("https://socket.io"), Confidence::High);
        assert_eq!(homepage_confidence("https://owner.github.io/pkg"), Confidence::High);
        assert_eq!(homepage_confidence("https://lodash.com"), Confidence::Medium);
        assert_eq!(homepage_confidence("https://expressjs.com/"), Confidence::Medium);
    }

    #[test]
    fn test_docs_indicative() {
        assert!(is_docs_indicative("Read the DOCS"));
        assert!(is_docs_indicative("https://example.com/api-reference"));
        assert!(is_docs_indicative("User Guide"));
        assert!(!is_docs_indicative("Pricing"));
    }

    #[test]
    fn test_extract_github_url_variants() {
        let expected = Some("https://github.com/facebook/react".to_string());
        assert_eq!(extract_github_url("git+https://github.com/facebook/react.git"), expected);
        assert_eq!(extract_github_url("git://github.com/facebook/react.git"), expected);
        assert_eq!(extract_github_url("ssh://git@github.com/facebook/react.git"), expected);
        assert_eq!(extract_github_url("git@github.com:facebook/react.git"), expected);
        assert_eq!(extract_github_url("github:facebook/react"), expected);
        assert_eq!(extract_github_url("facebook/react"), expected);
        assert_eq!(
            extract_github_url("https://github.com/facebook/react/tree/main/packages/react"),
            expected
        );
    }

    #[test]
    fn test_extract_github_url_rejects_other_hosts() {
        assert_eq!(extract_github_url("https://gitlab.com/group/project.git"), None);
        assert_eq!(extract_github_url(""), None);
        assert_eq!(extract_github_url("just-a-word"), None);
    }

    #[test]
    fn test_scope_helpers() {
        assert_eq!(split_scope("@aws-sdk/client-s3"), Some(("@aws-sdk", "client-s3")));
        assert_eq!(split_scope("react"), None);
        assert_eq!(split_scope("@broken"), None);
        assert_eq!(split_scope("@/x"), None);
        assert_eq!(unscoped_name("@tanstack/query"), "query");
        assert_eq!(unscoped_name("lodash"), "lodash");
    }

    #[test]
    fn test_sanitize_package_name() {
        assert_eq!(sanitize_package_name("@babel/core"), "babel-core");
        assert_eq!(sanitize_package_name("Lodash"), "lodash");
    }

    #[test]
    fn test_docs_paths() {
        assert!(is_likely_docs_path("/docs"));
        assert!(is_likely_docs_path("/docs/getting-started"));
        assert!(is_likely_docs_path("/v2/api/hooks"));
        assert!(is_likely_docs_path("/reference/cli"));
        assert!(!is_likely_docs_path("/docsify"));
        assert!(!is_likely_docs_path("/blog/docs-release"));
        assert!(!is_likely_docs_path("/docs/logo.png"));
        assert!(!is_likely_docs_path("/pricing"));
        assert!(!is_likely_docs_path("/"));
    }

    #[test]
    fn test_marketing_words_only_reject_at_the_start() {
        for path in [
            "/docs/about",
            "/docs/guides/register",
            "/docs/api/static",
            "/docs/team/permissions",
        ] {
            assert!(is_likely_docs_path(path), "{path} should be doc-shaped");
        }
        assert!(!is_likely_docs_path("/about"));
        assert!(!is_likely_docs_path("/about/docs"));
        assert!(is_likely_docs_path("/blogging/docs"));
    }

    #[test]
    fn test_nested_paths() {
        assert!(is_nested_path("/core/concepts"));
        assert!(is_nested_path("/a/b/c/"));
        assert!(!is_nested_path("/about"));
        assert!(!is_nested_path("/"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/docs/"), "/docs");
        assert_eq!(normalize_path("/docs/intro?x=1#top"), "/docs/intro");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("docs"), "/docs");
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path("/docs/getting-started"), "Getting Started");
        assert_eq!(title_from_path("/api/use_state/"), "Use State");
        assert_eq!(title_from_path("/guide/intro.html"), "Intro");
        assert_eq!(title_from_path("/"), "Home");
    }

    proptest! {
        #[test]
        fn test_sanitized_names_have_no_scope_markers(name in r"@?[a-z0-9._-]{1,20}(/[a-z0-9._-]{1,20})?") {
            let sanitized = sanitize_package_name(&name);
            prop_assert!(!sanitized.contains('@'));
            prop_assert!(!sanitized.contains('/'));
        }

        #[test]
        fn test_normalize_path_is_idempotent(path in r"(/[a-zA-Z0-9_-]{0,8}){0,4}/?(\?[a-z=]{0,5})?") {
            let once = normalize_path(&path);
            prop_assert_eq!(normalize_path(&once), once.clone());
        }
    }
}
