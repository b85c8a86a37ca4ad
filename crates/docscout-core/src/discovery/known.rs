//! Curated table of packages whose documentation location is known.
//!
//! An exact-name hit here short-circuits every URL-determination tier with
//! `high` confidence. The table is also searchable with fuzzy matching for
//! interactive lookups.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A package with a trusted documentation URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownEntry {
    /// Exact package name, scope included.
    pub package: String,
    /// Trusted documentation URL.
    pub docs_url: String,
    /// Short description shown by searches.
    pub description: String,
}

impl KnownEntry {
    /// Create an entry.
    pub fn new(package: &str, docs_url: &str, description: &str) -> Self {
        Self {
            package: package.to_string(),
            docs_url: docs_url.to_string(),
            description: description.to_string(),
        }
    }
}

impl std::fmt::Display for KnownEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}\n   {}", self.package, self.docs_url, self.description)
    }
}

/// Fuzzy search hit over the table.
#[derive(Debug, Clone)]
pub struct KnownSearchResult {
    /// The matching entry.
    pub entry: KnownEntry,
    /// Fuzzy match score; higher is better.
    pub score: i64,
    /// `"package"` or `"description"`.
    pub match_field: &'static str,
}

/// Override table keyed by exact package name.
#[derive(Debug, Clone)]
pub struct KnownDocs {
    entries: Vec<KnownEntry>,
    index: HashMap<String, usize>,
}

impl KnownDocs {
    /// Table with the built-in entries.
    pub fn new() -> Self {
        Self::from_entries(builtin_entries())
    }

    /// Table with no entries.
    pub fn empty() -> Self {
        Self::from_entries(Vec::new())
    }

    fn from_entries(entries: Vec<KnownEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.package.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, package: &str, docs_url: &str) {
        if let Some(&i) = self.index.get(package) {
            self.entries[i].docs_url = docs_url.to_string();
            return;
        }
        self.index.insert(package.to_string(), self.entries.len());
        self.entries
            .push(KnownEntry::new(package, docs_url, "User-configured override"));
    }

    /// Builder-style variant of [`KnownDocs::insert`] for many entries.
    #[must_use]
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (package, url) in overrides {
            self.insert(package.as_ref(), url.as_ref());
        }
        self
    }

    /// Exact lookup of a package's documentation URL.
    pub fn get(&self, package: &str) -> Option<&str> {
        self.index
            .get(package)
            .map(|&i| self.entries[i].docs_url.as_str())
    }

    /// Search entries using fuzzy matching on package name and description.
    ///
    /// Description matches are weighted at half. Results are sorted by score,
    /// best first.
    pub fn search(&self, query: &str) -> Vec<KnownSearchResult> {
        let matcher = SkimMatcherV2::default();
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<KnownSearchResult> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let by_name = matcher
                    .fuzzy_match(&entry.package.to_lowercase(), &query)
                    .map(|s| (s, "package"));
                let by_description = matcher
                    .fuzzy_match(&entry.description.to_lowercase(), &query)
                    .map(|s| (s / 2, "description"));

                let (score, match_field) = match (by_name, by_description) {
                    (Some(a), Some(b)) => {
                        if b.0 > a.0 {
                            b
                        } else {
                            a
                        }
                    },
                    (Some(a), None) => a,
                    (None, Some(b)) => b,
                    (None, None) => return None,
                };

                (score > 0).then(|| KnownSearchResult {
                    entry: entry.clone(),
                    score,
                    match_field,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }

    /// All entries in insertion order.
    pub fn all_entries(&self) -> &[KnownEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KnownDocs {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_entries() -> Vec<KnownEntry> {
    [
        ("react", "https://react.dev/reference/react", "JavaScript library for building user interfaces"),
        ("react-dom", "https://react.dev/reference/react-dom", "React package for working with the DOM"),
        ("vue", "https://vuejs.org/guide/introduction.html", "Progressive JavaScript framework for building UIs"),
        ("next", "https://nextjs.org/docs", "React framework for production with hybrid rendering"),
        ("nuxt", "https://nuxt.com/docs", "Intuitive Vue framework"),
        ("svelte", "https://svelte.dev/docs", "Cybernetically enhanced web apps"),
        ("@sveltejs/kit", "https://svelte.dev/docs/kit", "Web development framework powered by Svelte"),
        ("@angular/core", "https://angular.dev/overview", "Angular core framework"),
        ("express", "https://expressjs.com/en/4x/api.html", "Fast, unopinionated, minimalist web framework for Node.js"),
        ("fastify", "https://fastify.dev/docs/latest/", "Fast and low overhead web framework for Node.js"),
        ("hono", "https://hono.dev/docs", "Web framework built on Web Standards"),
        ("lodash", "https://lodash.com/docs", "Modern JavaScript utility library"),
        ("typescript", "https://www.typescriptlang.org/docs/", "Typed superset of JavaScript"),
        ("vite", "https://vite.dev/guide/", "Next generation frontend tooling"),
        ("vitest", "https://vitest.dev/guide/", "Vite-native unit test framework"),
        ("jest", "https://jestjs.io/docs/getting-started", "Delightful JavaScript testing"),
        ("webpack", "https://webpack.js.org/concepts/", "Module bundler for modern JavaScript applications"),
        ("eslint", "https://eslint.org/docs/latest/", "Pluggable JavaScript linter"),
        ("prettier", "https://prettier.io/docs/", "Opinionated code formatter"),
        ("tailwindcss", "https://tailwindcss.com/docs", "Utility-first CSS framework"),
        ("axios", "https://axios-http.com/docs/intro", "Promise based HTTP client for the browser and Node.js"),
        ("zod", "https://zod.dev/", "TypeScript-first schema validation with static type inference"),
        ("prisma", "https://www.prisma.io/docs", "Next-generation ORM for Node.js and TypeScript"),
        ("@prisma/client", "https://www.prisma.io/docs/orm/prisma-client", "Auto-generated type-safe database client"),
        ("mongoose", "https://mongoosejs.com/docs/", "MongoDB object modeling for Node.js"),
        ("socket.io", "https://socket.io/docs/v4/", "Realtime application framework"),
        ("rxjs", "https://rxjs.dev/guide/overview", "Reactive extensions for JavaScript"),
        ("three", "https://threejs.org/docs/", "JavaScript 3D library"),
        ("d3", "https://d3js.org/getting-started", "Data-driven documents"),
        ("@tanstack/react-query", "https://tanstack.com/query/latest/docs/framework/react/overview", "Powerful asynchronous state management for React"),
        ("redux", "https://redux.js.org/introduction/getting-started", "Predictable state container for JavaScript apps"),
        ("@reduxjs/toolkit", "https://redux-toolkit.js.org/introduction/getting-started", "Official, opinionated toolset for Redux"),
        ("zustand", "https://zustand.docs.pmnd.rs/", "Bear necessities for state management in React"),
        ("date-fns", "https://date-fns.org/docs/Getting-Started", "Modern JavaScript date utility library"),
        ("electron", "https://www.electronjs.org/docs/latest/", "Build cross-platform desktop apps with web technologies"),
        ("@nestjs/core", "https://docs.nestjs.com/", "Progressive Node.js framework"),
    ]
    .into_iter()
    .map(|(package, url, description)| KnownEntry::new(package, url, description))
    .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::disallowed_macros)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        let known = KnownDocs::new();
        assert_eq!(known.get("react"), Some("https://react.dev/reference/react"));
        assert_eq!(known.get("@angular/core"), Some("https://angular.dev/overview"));
        assert_eq!(known.get("React"), None);
        assert_eq!(known.get("left-pad"), None);
    }

    #[test]
    fn test_overrides_replace_builtins_and_add_new() {
        let known = KnownDocs::new().with_overrides([
            ("react", "https://internal.example.com/react"),
            ("left-pad", "https://left-pad.example.com"),
        ]);

        assert_eq!(known.get("react"), Some("https://internal.example.com/react"));
        assert_eq!(known.get("left-pad"), Some("https://left-pad.example.com"));
        assert_eq!(known.len(), KnownDocs::new().len() + 1);
    }

    #[test]
    fn test_empty_table() {
        let known = KnownDocs::empty();
        assert!(known.is_empty());
        assert_eq!(known.get("react"), None);
    }

    #[test]
    fn test_search_exact_match_ranks_first() {
        let results = KnownDocs::new().search("vitest");
        assert!(!results.is_empty());
        assert_eq!(results[0].entry.package, "vitest");
        assert_eq!(results[0].match_field, "package");
    }

    #[test]
    fn test_search_case_insensitive() {
        let lower = KnownDocs::new().search("lodash");
        let upper = KnownDocs::new().search("LODASH");
        assert_eq!(lower[0].entry.package, "lodash");
        assert_eq!(upper[0].entry.package, "lodash");
    }

    #[test]
    fn test_search_blank_query_is_empty() {
        assert!(KnownDocs::new().search("   ").is_empty());
    }

    #[test]
    fn test_search_description_match() {
        let results = KnownDocs::new().search("orm");
        assert!(results.iter().any(|r| r.entry.package.contains("prisma")));
    }

    #[test]
    fn test_builtin_entries_are_well_formed() {
        let known = KnownDocs::new();
        let mut seen = std::collections::HashSet::new();
        for entry in known.all_entries() {
            assert!(entry.docs_url.starts_with("https://"), "{}", entry.docs_url);
            assert!(seen.insert(&entry.package), "duplicate {}", entry.package);
            assert!(!entry.package.chars().any(char::is_uppercase));
        }
    }
}
