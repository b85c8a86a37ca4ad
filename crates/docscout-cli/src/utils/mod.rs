//! Shared helpers for the CLI entry point.
//!
//! - [`logging`]: tracing subscriber and color setup
//! - [`config`]: configuration loading for `--config`

pub mod config;
pub mod logging;

pub use config::load_config;
pub use logging::initialize_logging;
