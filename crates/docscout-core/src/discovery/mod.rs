//! Documentation URL discovery for npm packages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docscout_core::discovery::DiscoveryEngine;
//!
//! # async fn example() -> docscout_core::Result<()> {
//! let engine = DiscoveryEngine::new()?;
//!
//! let pkg = engine.discover_package("@tanstack/react-query").await;
//! println!("{} -> {:?} ({})", pkg.name, pkg.docs_url, pkg.confidence);
//!
//! let batch = engine.discover_packages(["react", "zod", "left-pad"]).await;
//! for (name, pkg) in &batch {
//!     println!("{name}: {}", pkg.source);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! - [`npm`]: registry metadata client
//! - [`known`]: curated override table
//! - [`patterns`]: organization and generic URL candidates
//! - [`homepage`]: documentation links scraped from a homepage
//! - [`filter`]: pure URL/path predicates shared with the crawler
//! - [`engine`] and [`cache`]: the cascade and its memoization

pub mod cache;
pub mod engine;
pub mod filter;
pub mod homepage;
pub mod known;
pub mod npm;
pub mod patterns;

pub use cache::DiscoveryCache;
pub use engine::DiscoveryEngine;
pub use filter::{is_likely_docs_path, is_nested_path, normalize_path};
pub use homepage::find_docs_link;
pub use known::{KnownDocs, KnownEntry, KnownSearchResult};
pub use npm::{PackageMetadata, RegistryClient};
pub use patterns::{Candidate, OrganizationPatterns, generic_patterns, organization_patterns};
