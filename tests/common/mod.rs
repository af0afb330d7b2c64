//! Common test utilities for vaultcheck integration tests.
//!
//! Provides `TestEnv` for isolated vaults that never read the user's
//! `~/.config/vaultcheck/config.kdl`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with an isolated vault and config directory.
///
/// Each `TestEnv` creates two temporary directories:
/// - `vault_dir`: Acts as the vault root (and the working directory)
/// - `config_dir`: Holds the system config (via `VCK_CONFIG_DIR` env var)
///
/// The `vck()` method returns a `Command` that sets both per-invocation,
/// making tests parallel-safe.
pub struct TestEnv {
    pub vault_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty vault.
    pub fn new() -> Self {
        Self {
            vault_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the vck binary running inside the vault.
    pub fn vck(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_vck"));
        cmd.current_dir(self.vault_dir.path());
        cmd.env("VCK_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("VCK_VAULT");
        cmd.env_remove("VCK_CONFIG");
        cmd.env_remove("VCK_LOG");
        cmd
    }

    /// Get the vault root.
    pub fn path(&self) -> &Path {
        self.vault_dir.path()
    }

    /// Write a file relative to the vault root, creating parent dirs.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.vault_dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a record file `<folder>/<id>.md` with the given frontmatter body.
    pub fn record(&self, folder: &str, id: &str, frontmatter: &str) -> PathBuf {
        self.write(
            &format!("{}/{}.md", folder, id),
            &format!("---\nid: {}\n{}---\n\n# {}\n", id, frontmatter, id),
        )
    }

    /// Write the system config file.
    pub fn system_config(&self, content: &str) -> PathBuf {
        let path = self.config_dir.path().join("config.kdl");
        fs::write(&path, content).unwrap();
        path
    }

    /// A small vault with one item of each layer and no problems.
    pub fn seeded() -> Self {
        let env = Self::new();
        env.record("milestones", "M-001", "title: Platform\nstatus: active\n");
        env.record("stories", "S-001", "title: Login\nparent: M-001\n");
        env.record(
            "tasks",
            "T-001",
            "title: Login form\nparent: S-001\nimplements: DOC-001\n",
        );
        env.record(
            "decisions",
            "DEC-001",
            "title: Use OAuth\nenables: [S-001, T-001]\n",
        );
        env.record(
            "documents",
            "DOC-001",
            "title: Auth spec\nimplemented_by: T-001\n",
        );
        env
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
