//! Configuration for discovery and crawling.
//!
//! Configuration is stored as TOML and every field has a default, so an
//! empty (or missing) file is valid. Environment variables with the
//! `DOCSCOUT_` prefix override file values.
//!
//! ## Configuration Hierarchy
//!
//! 1. **Built-in defaults**: [`Config::default`]
//! 2. **Config file**: platform config directory, `config.toml`
//! 3. **Environment variables**: `DOCSCOUT_*` (see [`Config::apply_env`])
//!
//! ## Example Configuration File
//!
//! ```toml
//! [discovery]
//! registry_url = "https://registry.npmjs.org"
//! probe_timeout_secs = 5
//! batch_size = 10
//!
//! [crawl]
//! max_sections = 200
//!
//! [overrides]
//! "my-internal-lib" = "https://docs.internal.example.com/my-lib"
//!
//! [organizations]
//! "@acme" = ["https://docs.acme.dev/{pkg}"]
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default npm registry API base.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default base for human-facing npm package pages.
pub const DEFAULT_REGISTRY_PAGE_URL: &str = "https://www.npmjs.com/package";

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "docscout/",
    env!("CARGO_PKG_VERSION"),
    " (+documentation discovery)"
);

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Discovery engine settings.
    pub discovery: DiscoveryConfig,
    /// Site crawler settings.
    pub crawl: CrawlConfig,
    /// Extra exact-name documentation overrides, consulted before built-ins.
    pub overrides: BTreeMap<String, String>,
    /// Extra organization URL templates keyed by scope (e.g. `@acme`).
    ///
    /// Templates use `{pkg}` for the unscoped package name.
    pub organizations: BTreeMap<String, Vec<String>>,
}

/// Settings for the discovery cascade and its HTTP traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Registry API base URL; package metadata is read from `{registry_url}/{name}`.
    pub registry_url: String,
    /// Base for the registry's human-facing package page (`npmUrl`).
    pub registry_page_url: String,
    /// Timeout for HEAD existence probes, in seconds.
    pub probe_timeout_secs: u64,
    /// Timeout for GET requests (registry, homepage, sitemap), in seconds.
    pub fetch_timeout_secs: u64,
    /// Number of packages discovered concurrently per batch.
    pub batch_size: usize,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Maximum redirects followed per request.
    pub max_redirects: usize,
    /// Only accept homepages that classify as high confidence at the
    /// homepage tier; medium homepages are deferred until after probing.
    pub strict_homepage: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            registry_page_url: DEFAULT_REGISTRY_PAGE_URL.to_string(),
            probe_timeout_secs: 5,
            fetch_timeout_secs: 10,
            batch_size: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 5,
            strict_homepage: false,
        }
    }
}

/// Settings for the site crawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum sitemap-derived sections kept per crawl.
    pub max_sitemap_entries: usize,
    /// Maximum sections returned per crawl.
    pub max_sections: usize,
    /// Sitemap locations tried in order; the first that parses wins.
    pub sitemap_paths: Vec<String>,
    /// Entry paths probed when neither navigation nor sitemap yield anything.
    pub probe_paths: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_sitemap_entries: 500,
            max_sections: 200,
            sitemap_paths: ["/sitemap.xml", "/sitemap_index.xml", "/docs/sitemap.xml"]
                .map(String::from)
                .to_vec(),
            probe_paths: [
                "/docs",
                "/documentation",
                "/guide",
                "/guides",
                "/api",
                "/reference",
                "/getting-started",
                "/introduction",
                "/tutorial",
                "/learn",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, apply environment
    /// overrides, and validate.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, the
    /// file exists but cannot be read or parsed, or validation fails.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file without applying the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to an explicit file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content).map_err(|e| Error::Config(format!("Failed to write config: {e}")))
    }

    /// Path of the default configuration file.
    ///
    /// - Linux: `~/.config/docscout/config.toml`
    /// - macOS: `~/Library/Application Support/dev.docscout.docscout/config.toml`
    /// - Windows: `%APPDATA%\docscout\docscout\config\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("dev", "docscout", "docscout")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `DOCSCOUT_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (used by tests).
    ///
    /// Recognized keys: `DOCSCOUT_REGISTRY_URL`, `DOCSCOUT_PROBE_TIMEOUT`,
    /// `DOCSCOUT_BATCH_SIZE`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DOCSCOUT_REGISTRY_URL") {
            self.discovery.registry_url = url;
        }
        if let Some(raw) = lookup("DOCSCOUT_PROBE_TIMEOUT") {
            self.discovery.probe_timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Config(format!("DOCSCOUT_PROBE_TIMEOUT must be an integer, got '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup("DOCSCOUT_BATCH_SIZE") {
            self.discovery.batch_size = raw.trim().parse().map_err(|_| {
                Error::Config(format!("DOCSCOUT_BATCH_SIZE must be an integer, got '{raw}'"))
            })?;
        }
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.discovery;
        if d.batch_size == 0 {
            return Err(Error::Config("discovery.batch_size must be at least 1".into()));
        }
        if d.probe_timeout_secs == 0 || d.fetch_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be at least 1 second".into()));
        }
        for (field, value) in [
            ("discovery.registry_url", &d.registry_url),
            ("discovery.registry_page_url", &d.registry_page_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| Error::Config(format!("{field} is not a valid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!("{field} must use http or https")));
            }
        }
        for (org, templates) in &self.organizations {
            if !org.starts_with('@') {
                return Err(Error::Config(format!(
                    "organization '{org}' must start with '@'"
                )));
            }
            if let Some(bad) = templates.iter().find(|t| !t.contains("{pkg}")) {
                return Err(Error::Config(format!(
                    "template '{bad}' for {org} is missing the {{pkg}} placeholder"
                )));
            }
        }
        Ok(())
    }
}

impl DiscoveryConfig {
    /// Probe timeout as a [`Duration`].
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Fetch timeout as a [`Duration`].
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
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
    use proptest::prelude::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.discovery.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(config.discovery.batch_size, 10);
        assert_eq!(config.discovery.probe_timeout_secs, 5);
        assert!(!config.discovery.strict_homepage);
        assert!(config.crawl.probe_paths.contains(&"/docs".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_yields_defaults() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "")?;

        assert_eq!(Config::load_from(&path)?, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[discovery]
batch_size = 3

[overrides]
"left-pad" = "https://example.com/left-pad"

[organizations]
"@acme" = ["https://docs.acme.dev/{pkg}"]
"#,
        )?;

        let config = Config::load_from(&path)?;
        assert_eq!(config.discovery.batch_size, 3);
        assert_eq!(config.discovery.probe_timeout_secs, 5);
        assert_eq!(
            config.overrides.get("left-pad").map(String::as_str),
            Some("https://example.com/left-pad")
        );
        assert_eq!(config.organizations["@acme"].len(), 1);
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_save_and_load_roundtrip() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.discovery.strict_homepage = true;
        config
            .overrides
            .insert("x".to_string(), "https://x.dev".to_string());
        config.save_to(&path)?;

        assert_eq!(Config::load_from(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[discovery\nbatch_size = ").unwrap();

        match Config::load_from(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains("parse")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DOCSCOUT_REGISTRY_URL", "http://127.0.0.1:9999"),
            ("DOCSCOUT_PROBE_TIMEOUT", "2"),
            ("DOCSCOUT_BATCH_SIZE", " 4 "),
        ]);
        let mut config = Config::default();
        config.apply_env_from(|k| env.get(k).map(|v| (*v).to_string()))?;

        assert_eq!(config.discovery.registry_url, "http://127.0.0.1:9999");
        assert_eq!(config.discovery.probe_timeout(), Duration::from_secs(2));
        assert_eq!(config.discovery.batch_size, 4);
        Ok(())
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut config = Config::default();
        let result = config.apply_env_from(|k| {
            (k == "DOCSCOUT_BATCH_SIZE").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.discovery.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.discovery.registry_url = "ftp://registry.example".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .organizations
            .insert("acme".to_string(), vec!["https://acme.dev/{pkg}".to_string()]);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .organizations
            .insert("@acme".to_string(), vec!["https://acme.dev/docs".to_string()]);
        assert!(config.validate().is_err());
    }

    proptest! {
        #[test]
        fn test_batch_size_roundtrip(batch_size in 1usize..=256) {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("config.toml");
            let mut config = Config::default();
            config.discovery.batch_size = batch_size;
            config.save_to(&path).unwrap();
            let loaded = Config::load_from(&path).unwrap();
            prop_assert_eq!(loaded.discovery.batch_size, batch_size);
        }
    }
}
