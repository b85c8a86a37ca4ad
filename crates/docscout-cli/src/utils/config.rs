//! Resolve the configuration for one invocation.

use anyhow::{Context, Result};
use docscout_core::Config;
use std::path::Path;

/// Load `path` when given, otherwise the default location.
///
/// Environment overrides and validation apply in both cases.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Config::load().context("failed to load configuration");
    };
    let mut config = Config::load_from(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}
