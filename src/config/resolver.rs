//! Precedence resolution for vaultcheck settings.
//!
//! ## Vault precedence (highest to lowest)
//!
//! 1. `--vault` flag / `VCK_VAULT` environment variable
//! 2. System config.kdl `vault` entry
//! 3. Current working directory
//!
//! ## Setting precedence (highest to lowest)
//!
//! 1. CLI flags
//! 2. Vault-local `.vaultcheck.kdl` (or the file given with `--config`)
//! 3. System config.kdl (`~/.config/vaultcheck/config.kdl`)
//! 4. Built-in defaults

use super::schema::{OutputFormat, VaultConfig, load_config_file};
use crate::loader::{DEFAULT_EXTENSION, VaultLayout};
use crate::models::EntityType;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "VCK_CONFIG_DIR";

/// File name of the vault-local config.
pub const VAULT_CONFIG_FILE: &str = ".vaultcheck.kdl";

/// File name of the system config inside the config directory.
pub const SYSTEM_CONFIG_FILE: &str = "config.kdl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from a CLI flag (or its environment variable)
    CliFlag,
    /// Value from the vault-local or explicit config file
    Vault(PathBuf),
    /// Value from the system config file
    System(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Vault(path) => write!(f, "vault:{}", path.display()),
            ValueSource::System(path) => write!(f, "system:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Vault root from `--vault` / `VCK_VAULT`
    pub vault: Option<PathBuf>,
    /// Explicit config file from `--config` / `VCK_CONFIG`
    pub config_path: Option<PathBuf>,
    /// Output format from `-H` / `--json`
    pub output_format: Option<OutputFormat>,
    /// Canvas file from `--canvas`
    pub canvas: Option<String>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vault(mut self, vault: impl Into<PathBuf>) -> Self {
        self.vault = Some(vault.into());
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_canvas(mut self, canvas: impl Into<String>) -> Self {
        self.canvas = Some(canvas.into());
        self
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSettings {
    /// Vault root
    pub vault: Resolved<PathBuf>,
    /// Canvas file as configured (relative to the vault unless absolute)
    pub canvas: Option<Resolved<String>>,
    pub output_format: Resolved<OutputFormat>,
    pub extension: Resolved<String>,
    /// Folder per entity type
    pub folders: BTreeMap<EntityType, Resolved<String>>,
    /// Config files that were found and applied, lowest precedence first
    pub config_files: Vec<PathBuf>,
}

impl ResolvedSettings {
    /// Vault layout handed to the loader.
    pub fn layout(&self) -> VaultLayout {
        self.folders.iter().fold(
            VaultLayout::default().with_extension(self.extension.value.clone()),
            |layout, (entity_type, folder)| layout.with_folder(*entity_type, folder.value.clone()),
        )
    }

    pub fn vault_path(&self) -> &Path {
        &self.vault.value
    }

    /// Absolute canvas path, if a canvas is configured.
    pub fn canvas_path(&self) -> Option<PathBuf> {
        self.canvas
            .as_ref()
            .map(|canvas| self.vault.value.join(&canvas.value))
    }

    pub fn is_human(&self) -> bool {
        self.output_format.value == OutputFormat::Human
    }
}

/// System config file location: `$VCK_CONFIG_DIR/config.kdl`, else the XDG config dir.
pub fn system_config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => Some(PathBuf::from(dir).join(SYSTEM_CONFIG_FILE)),
        None => dirs::config_dir().map(|d| d.join("vaultcheck").join(SYSTEM_CONFIG_FILE)),
    }
}

/// Resolve settings using the system config location.
pub fn resolve_settings(overrides: &ConfigOverrides, cwd: &Path) -> Result<ResolvedSettings> {
    resolve_settings_with_system(overrides, cwd, system_config_path().as_deref())
}

/// Resolve settings with an explicit system config path (for DI/testing).
pub fn resolve_settings_with_system(
    overrides: &ConfigOverrides,
    cwd: &Path,
    system_path: Option<&Path>,
) -> Result<ResolvedSettings> {
    let mut config_files = Vec::new();

    let system = match system_path {
        Some(path) => load_config_file(path)?.map(|config| {
            config_files.push(path.to_path_buf());
            (config, ValueSource::System(path.to_path_buf()))
        }),
        None => None,
    };

    let system_vault = system
        .as_ref()
        .and_then(|(config, source)| config.vault.as_ref().map(|vault| (vault, source)));
    let vault = match (&overrides.vault, system_vault) {
        (Some(vault), _) => Resolved::new(cwd.join(vault), ValueSource::CliFlag),
        (None, Some((vault, source))) => Resolved::new(cwd.join(vault), source.clone()),
        (None, None) => Resolved::new(cwd.to_path_buf(), ValueSource::Default),
    };

    let local = match &overrides.config_path {
        Some(path) => {
            let path = cwd.join(path);
            let config = load_config_file(&path)?.ok_or_else(|| {
                Error::NotFound(format!("config file {}", path.display()))
            })?;
            Some((config, ValueSource::Vault(path)))
        }
        None => {
            let path = vault.value.join(VAULT_CONFIG_FILE);
            load_config_file(&path)?.map(|config| (config, ValueSource::Vault(path)))
        }
    };
    if let Some((_, ValueSource::Vault(path))) = &local {
        config_files.push(path.clone());
    }

    // Highest precedence last
    let layers: Vec<&(VaultConfig, ValueSource)> = system.iter().chain(local.iter()).collect();
    let pick = |get: &dyn Fn(&VaultConfig) -> Option<String>| -> Option<Resolved<String>> {
        layers
            .iter()
            .rev()
            .find_map(|(config, source)| get(config).map(|v| Resolved::new(v, source.clone())))
    };

    let canvas = match &overrides.canvas {
        Some(canvas) => Some(Resolved::new(canvas.clone(), ValueSource::CliFlag)),
        None => pick(&|c| c.canvas.clone()),
    };

    let output_format = match overrides.output_format {
        Some(format) => Resolved::new(format, ValueSource::CliFlag),
        None => layers
            .iter()
            .rev()
            .find_map(|(config, source)| {
                config
                    .output_format
                    .map(|format| Resolved::new(format, source.clone()))
            })
            .unwrap_or_else(|| Resolved::new(OutputFormat::default(), ValueSource::Default)),
    };

    let extension = pick(&|c| c.extension.clone())
        .unwrap_or_else(|| Resolved::new(DEFAULT_EXTENSION.to_string(), ValueSource::Default));

    let folders = EntityType::all()
        .iter()
        .map(|entity_type| {
            let folder = pick(&|c| c.folders.get(entity_type).cloned()).unwrap_or_else(|| {
                Resolved::new(entity_type.default_folder().to_string(), ValueSource::Default)
            });
            (*entity_type, folder)
        })
        .collect();

    debug!(vault = %vault.value.display(), files = config_files.len(), "resolved settings");

    Ok(ResolvedSettings {
        vault,
        canvas,
        output_format,
        extension,
        folders,
        config_files,
    })
}
