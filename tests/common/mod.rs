//! Common test utilities for siren integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch
//! the user's `~/.config/siren/` or `~/.local/share/siren/` directories.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with isolated config and data storage.
///
/// The `sn()` method returns a `Command` that sets `SN_CONFIG_DIR` and
/// `SN_DATA_DIR` per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub config_dir: TempDir,
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// A fresh environment with a police session.
    pub fn police() -> Self {
        let env = Self::new();
        env.login("police", "dispatcher7");
        env
    }

    /// A fresh environment with a driver session.
    pub fn driver() -> Self {
        let env = Self::new();
        env.login("driver", "medic12");
        env
    }

    /// Get a Command for the sn binary with isolated directories.
    pub fn sn(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sn"));
        cmd.env("SN_CONFIG_DIR", self.config_dir.path());
        cmd.env("SN_DATA_DIR", self.data_dir.path());
        cmd.env_remove("SN_MAP_TOKEN");
        cmd.env_remove("SN_ROSTER");
        cmd.env_remove("SN_LOG");
        cmd
    }

    pub fn login(&self, role: &str, username: &str) {
        self.sn()
            .args(["login", role, "--username", username, "--password", "pw"])
            .assert()
            .success();
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().join("config.kdl")
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.path().join("state.kdl")
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn parse_json(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).unwrap()
}
