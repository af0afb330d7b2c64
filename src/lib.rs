//! Vaultcheck - relationship validation for planning vaults.
//!
//! This library provides the core functionality for the `vck` CLI tool:
//! loading milestone, story, task, decision and document records from a
//! vault, validating their cross-references against the relationship rule
//! table, and cross-checking a canvas file against the same records.

pub mod canvas;
pub mod cli;
pub mod commands;
pub mod config;
pub mod loader;
pub mod models;
pub mod validate;

/// Test utilities for isolated vault fixtures.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    use crate::models::EntityType;

    /// A throwaway vault on disk.
    ///
    /// Records are written as `<folder>/<name>.md` with a YAML frontmatter
    /// block, mirroring the layout the loader scans.
    pub struct TestVault {
        pub dir: TempDir,
    }

    impl TestVault {
        /// Create an empty vault with no type folders.
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        /// Get the vault root.
        pub fn path(&self) -> &Path {
            self.dir.path()
        }

        /// Write a raw file relative to the vault root, creating parent dirs.
        pub fn write(&self, rel: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content).unwrap();
            path
        }

        /// Write a record into its type's default folder.
        ///
        /// `frontmatter` is the YAML body without delimiters or the `id` key.
        pub fn record(&self, id: &str, frontmatter: &str) -> PathBuf {
            let entity_type = EntityType::classify(id).entity_type().unwrap();
            let rel = format!("{}/{}.md", entity_type.default_folder(), id);
            self.write(
                &rel,
                &format!("---\nid: {}\n{}---\n\n# {}\n", id, frontmatter, id),
            )
        }
    }

    impl Default for TestVault {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for vaultcheck operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for vaultcheck operations.
pub type Result<T> = std::result::Result<T, Error>;
