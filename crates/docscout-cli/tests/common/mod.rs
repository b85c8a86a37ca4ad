#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CMD_TIMEOUT: Duration = Duration::from_secs(20);

/// Write a config file that points the registry at `registry_url` and
/// keeps probes short.
pub fn write_config(dir: &Path, registry_url: &str, extra: &str) -> PathBuf {
    let path = dir.join("config.toml");
    let body = format!(
        "[discovery]\nregistry_url = \"{registry_url}\"\nprobe_timeout_secs = 1\nfetch_timeout_secs = 2\n\n{extra}"
    );
    std::fs::write(&path, body).expect("failed to write test config");
    path
}

/// A `docscout` command isolated from the caller's environment.
pub fn docscout_cmd(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docscout"));
    cmd.timeout(CMD_TIMEOUT);
    for key in [
        "DOCSCOUT_REGISTRY_URL",
        "DOCSCOUT_PROBE_TIMEOUT",
        "DOCSCOUT_BATCH_SIZE",
        "DOCSCOUT_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("NO_COLOR", "1");
    cmd.arg("--config").arg(config);
    cmd
}
