//! # docscout-core
//!
//! Finds the documentation site for an npm package and maps that site into
//! navigable sections.
//!
//! ## Architecture
//!
//! - **Discovery** ([`discovery`]): a priority cascade over a curated
//!   override table, registry metadata, organization and generic URL
//!   conventions, homepage link analysis, and repository/registry
//!   fallbacks. Each answer carries a [`Confidence`].
//! - **Crawling** ([`crawl`]): sidebar navigation, sitemaps, and
//!   conventional entry paths merged into [`DocSection`]s.
//! - **Ambient**: [`Config`] (TOML + `DOCSCOUT_*` environment), a shared
//!   HTTP [`Fetcher`], and one [`Error`] type.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docscout_core::{DiscoveryEngine, SiteCrawler};
//!
//! # async fn example() -> docscout_core::Result<()> {
//! let engine = DiscoveryEngine::new()?;
//! let pkg = engine.discover_package("zod").await;
//!
//! if let Some(docs) = pkg.docs_url.as_deref().filter(|u| *u != pkg.npm_url) {
//!     let site = SiteCrawler::new()?.crawl(docs).await?;
//!     for section in &site.sections {
//!         println!("{} -> {}", section.title, section.url);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Discovery never returns an error: failures lower confidence or move the
//! cascade to its next tier. Crawling only errors on a malformed input URL.
//!
//! ```rust
//! use docscout_core::Error;
//!
//! let err = Error::InvalidUrl("ftp://example.com".into());
//! assert_eq!(err.category(), "invalid_url");
//! assert!(!err.is_recoverable());
//! ```

/// Configuration file and environment overrides
pub mod config;
/// Site-structure crawler
pub mod crawl;
/// Documentation URL discovery
pub mod discovery;
/// Error types and result aliases
pub mod error;
/// Shared HTTP client and URL verifier
pub mod fetcher;
/// Core data types
pub mod types;

pub use config::{Config, CrawlConfig, DiscoveryConfig};
pub use crawl::SiteCrawler;
pub use discovery::{DiscoveryEngine, KnownDocs};
pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use types::*;
