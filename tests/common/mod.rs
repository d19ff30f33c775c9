//! Common test utilities shared across integration tests.
//!
//! Builds `roster` invocations that cannot see the caller's configuration
//! or environment.

use std::path::Path;

use assert_cmd::Command;

/// Environment variables that would leak host settings into a run.
const ROSTER_ENV: &[&str] = &[
    "ROSTER_ROOT",
    "ROSTER_CONFIG",
    "ROSTER_REGISTRY",
    "ROSTER_DESCRIPTORS",
    "ROSTER_DESCRIPTOR_EXTENSION",
    "ROSTER_REGISTRY_PARSER",
    "ROSTER_BASELINE",
    "ROSTER_STRICT",
    "ROSTER_DISABLED_CHECKS",
    "ROSTER_OUTPUT_FORMAT",
    "RUST_LOG",
];

/// `roster` running in `dir`, with the global config directory pointed
/// inside it and every `ROSTER_*` variable cleared.
pub fn roster_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("roster").expect("roster binary");
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("NO_COLOR", "1");
    for name in ROSTER_ENV {
        cmd.env_remove(name);
    }
    cmd
}
