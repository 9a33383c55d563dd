//! Shared test utilities for simpleenvs CLI integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory rooted in a temp directory.
//!
//! Invariants / Assumptions:
//! - `SIMPLEENVS_*`, `ENVIRONMENT` and `ENV` are cleared so host settings cannot
//!   change strictness, the file path or the profile.

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// Returns a hermetic `simpleenvs` command running inside `dir`.
pub fn simpleenvs_cmd(dir: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("simpleenvs");
    cmd.current_dir(dir.path())
        .env_remove("SIMPLEENVS_PATH")
        .env_remove("SIMPLEENVS_STRICT")
        .env_remove("ENVIRONMENT")
        .env_remove("ENV")
        .env_remove("RUST_LOG");
    cmd
}

/// Temp directory holding a `.env` file with `content`.
pub fn env_dir(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), content).unwrap();
    dir
}
