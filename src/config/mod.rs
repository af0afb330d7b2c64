//! Configuration for vaultcheck.
//!
//! Settings live in KDL files:
//!
//! - System: `~/.config/vaultcheck/config.kdl` (or `$VCK_CONFIG_DIR/config.kdl`)
//! - Vault-local: `<vault>/.vaultcheck.kdl`, replaced by `--config <PATH>` when given
//!
//! Contains:
//! - `vault` - Default vault root (system config only)
//! - `canvas` - Canvas file to cross-check, relative to the vault
//! - `output-format` - "json" or "human"
//! - `extension` - Record file extension
//! - `folders` - Folder name per entity type
//!
//! ## Precedence
//!
//! CLI flag > vault-local config > system config > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigOverrides, Resolved, ResolvedSettings, VAULT_CONFIG_FILE, ValueSource,
    resolve_settings, resolve_settings_with_system, system_config_path,
};
pub use schema::{OutputFormat, VaultConfig, load_config_file, parse_config};
