//! In-memory memoization of discovery results, owned by one engine.

use crate::DiscoveredPackage;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Package name to shared discovery result.
///
/// Entries are handed out as `Arc`s, so repeated lookups of the same key
/// return the same allocation until [`DiscoveryCache::clear`] is called.
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    entries: RwLock<HashMap<String, Arc<DiscoveredPackage>>>,
}

impl DiscoveryCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<DiscoveredPackage>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Store `package` under `name` unless an entry already exists.
    ///
    /// Returns whichever entry ends up cached, so two racing discoveries of
    /// the same name both observe the first writer's value.
    pub fn set(&self, name: &str, package: DiscoveredPackage) -> Arc<DiscoveredPackage> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(package)),
        )
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Confidence, DiscoverySource};

    fn package(name: &str, docs: &str) -> DiscoveredPackage {
        DiscoveredPackage {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            description: None,
            keywords: Vec::new(),
            docs_url: Some(docs.to_string()),
            github_url: None,
            npm_url: format!("https://www.npmjs.com/package/{name}"),
            confidence: Confidence::High,
            source: DiscoverySource::KnownOverride,
        }
    }

    #[test]
    fn test_get_returns_same_allocation() {
        let cache = DiscoveryCache::new();
        let stored = cache.set("a", package("a", "https://a.dev"));
        let first = cache.get("a").unwrap();
        let second = cache.get("a").unwrap();
        assert!(Arc::ptr_eq(&stored, &first));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_first_writer_wins() {
        let cache = DiscoveryCache::new();
        let first = cache.set("a", package("a", "https://first.dev"));
        let second = cache.set("a", package("a", "https://second.dev"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.docs_url.as_deref(), Some("https://first.dev"));
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = DiscoveryCache::new();
        let before = cache.set("a", package("a", "https://a.dev"));
        cache.set("b", package("b", "https://b.dev"));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());

        let after = cache.set("a", package("a", "https://a.dev"));
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, *after);
    }
}
