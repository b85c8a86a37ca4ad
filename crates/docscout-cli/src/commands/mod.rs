//! Command implementations for the docscout CLI

mod crawl;
mod discover;
mod known;

pub use crawl::execute as crawl_site;
pub use discover::execute as discover_packages;
pub use known::execute as list_known;
