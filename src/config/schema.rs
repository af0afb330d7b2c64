//! KDL schema for vaultcheck config files.
//!
//! This module provides:
//! - `VaultConfig`, the Rust view of a config.kdl / .vaultcheck.kdl file
//! - Parsing from and rendering to KDL
//! - Validation

use crate::models::EntityType;
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings stored in a KDL config file.
///
/// # KDL Schema
///
/// ```kdl
/// vault "/home/me/Obsidian/Projects/AgentPlatform"
/// canvas "AgentPlatform.canvas"
/// output-format "human"  // or "json"
/// extension "md"
/// folders {
///     milestone "milestones"
///     story "stories"
/// }
/// ```
///
/// `vault` is only honoured from the system config; a vault-local file can't
/// relocate the vault it lives in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultConfig {
    /// Vault root
    pub vault: Option<PathBuf>,

    /// Canvas file, relative to the vault root unless absolute
    pub canvas: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Record file extension, without the dot
    pub extension: Option<String>,

    /// Folder overrides per entity type
    pub folders: BTreeMap<EntityType, String>,
}

impl VaultConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ref ext) = self.extension {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(format!(
                    "extension must be non-empty and given without a leading dot, got '{}'",
                    ext
                ));
            }
        }
        if let Some(ref canvas) = self.canvas {
            if canvas.is_empty() {
                return Err("canvas must not be empty".to_string());
            }
        }
        for (entity_type, folder) in &self.folders {
            if folder.trim().is_empty() {
                return Err(format!("folder for {} must not be empty", entity_type));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes, unknown folder types and unrecognized output formats
    /// are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        config.vault = string_arg(doc.get("vault")).map(PathBuf::from);
        config.canvas = string_arg(doc.get("canvas"));
        config.output_format =
            string_arg(doc.get("output-format")).and_then(|s| OutputFormat::parse(&s));
        config.extension = string_arg(doc.get("extension"));

        if let Some(children) = doc.get("folders").and_then(KdlNode::children) {
            for child in children.nodes() {
                let Ok(entity_type) = child.name().value().parse::<EntityType>() else {
                    continue;
                };
                if let Some(folder) = string_arg(Some(child)) {
                    config.folders.insert(entity_type, folder);
                }
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref vault) = self.vault {
            doc.nodes_mut()
                .push(string_node("vault", &vault.display().to_string()));
        }
        if let Some(ref canvas) = self.canvas {
            doc.nodes_mut().push(string_node("canvas", canvas));
        }
        if let Some(format) = self.output_format {
            doc.nodes_mut()
                .push(string_node("output-format", format.as_str()));
        }
        if let Some(ref ext) = self.extension {
            doc.nodes_mut().push(string_node("extension", ext));
        }
        if !self.folders.is_empty() {
            let mut folders = KdlNode::new("folders");
            let children = folders.ensure_children();
            for (entity_type, folder) in &self.folders {
                children
                    .nodes_mut()
                    .push(string_node(entity_type.as_str(), folder));
            }
            doc.nodes_mut().push(folders);
        }

        doc.autoformat();
        doc
    }
}

/// Parse and validate config text.
pub fn parse_config(text: &str) -> Result<VaultConfig> {
    let doc: KdlDocument = text
        .parse()
        .map_err(|e| Error::Config(format!("invalid KDL: {}", e)))?;
    let config = VaultConfig::from_kdl(&doc);
    config.validate().map_err(Error::Config)?;
    Ok(config)
}

/// Load a config file. Returns `Ok(None)` if the file doesn't exist.
pub fn load_config_file(path: &Path) -> Result<Option<VaultConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    parse_config(&text).map(Some).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

fn string_arg(node: Option<&KdlNode>) -> Option<String> {
    node?
        .entries()
        .first()
        .and_then(|entry| entry.value().as_string())
        .map(str::to_string)
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}
