//! Record loading from a vault directory.
//!
//! A vault holds one folder per entity type. Every Markdown file in those
//! folders (recursively) that opens with a YAML frontmatter block carrying a
//! classifiable `id` becomes a [`Record`]. Everything else is treated as a
//! plain document and skipped without error.
//!
//! Relationship values are accepted in three shapes and normalized to an
//! ordered list of ids:
//!
//! ```yaml
//! depends_on: [T-001, T-002]   # sequence
//! depends_on: T-001, T-002     # comma-separated string
//! depends_on: T-001            # single scalar
//! ```

use crate::models::{EntityType, Record, RecordMap, RelationField};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default record file extension.
pub const DEFAULT_EXTENSION: &str = "md";

/// Where records of each type live inside a vault.
///
/// The extension match is exact and case-sensitive: with the default `md`,
/// `T-001.MD` is not a record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    folders: BTreeMap<EntityType, String>,
    extension: String,
}

impl Default for VaultLayout {
    fn default() -> Self {
        Self {
            folders: EntityType::all()
                .iter()
                .map(|t| (*t, t.default_folder().to_string()))
                .collect(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl VaultLayout {
    /// Override the folder scanned for `entity_type`.
    pub fn with_folder(mut self, entity_type: EntityType, folder: impl Into<String>) -> Self {
        self.folders.insert(entity_type, folder.into());
        self
    }

    /// Override the record file extension (without the leading dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Folder (relative to the vault root) holding records of `entity_type`.
    pub fn folder(&self, entity_type: EntityType) -> &str {
        self.folders
            .get(&entity_type)
            .map(String::as_str)
            .unwrap_or_else(|| entity_type.default_folder())
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Result of one load pass.
#[derive(Debug, Clone, Default)]
pub struct LoadedVault {
    /// Authoritative collection; the first record seen for an id wins
    pub records: RecordMap,
    /// Ids seen more than once, with every source location (first winner first)
    pub duplicates: IndexMap<String, Vec<PathBuf>>,
}

impl LoadedVault {
    /// Add a record, diverting repeated ids into `duplicates`.
    pub fn insert(&mut self, record: Record) {
        match self.records.get(&record.id) {
            Some(first) => {
                warn!(
                    id = %record.id,
                    first = %first.source.display(),
                    duplicate = %record.source.display(),
                    "duplicate record id"
                );
                self.duplicates
                    .entry(record.id.clone())
                    .or_insert_with(|| vec![first.source.clone()])
                    .push(record.source);
            }
            None => {
                self.records.insert(record.id.clone(), record);
            }
        }
    }

    /// Number of records per type, including types with none.
    pub fn counts_by_type(&self) -> BTreeMap<EntityType, usize> {
        let mut counts: BTreeMap<EntityType, usize> =
            EntityType::all().iter().map(|t| (*t, 0)).collect();
        for record in self.records.values() {
            *counts.entry(record.entity_type).or_default() += 1;
        }
        counts
    }
}

/// Loads records from a vault according to a [`VaultLayout`].
pub struct Loader<'a> {
    layout: &'a VaultLayout,
}

impl<'a> Loader<'a> {
    pub fn new(layout: &'a VaultLayout) -> Self {
        Self { layout }
    }

    /// Load every record under `root`.
    ///
    /// Folders are visited in entity-type order and files in name order, so
    /// the first-wins rule for duplicate ids is deterministic. Unreadable or
    /// non-record files are skipped; only a missing root is an error.
    pub fn load(&self, root: &Path) -> Result<LoadedVault> {
        if !root.is_dir() {
            return Err(Error::NotFound(format!(
                "vault directory {}",
                root.display()
            )));
        }

        let mut vault = LoadedVault::default();
        for entity_type in EntityType::all() {
            let folder = root.join(self.layout.folder(*entity_type));
            if !folder.is_dir() {
                debug!(folder = %folder.display(), "folder missing, skipping");
                continue;
            }

            for path in self.record_files(&folder) {
                let content = match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to read record file");
                        continue;
                    }
                };
                if let Some(record) = load_record(&path, &content) {
                    vault.insert(record);
                }
            }
        }

        for (entity_type, count) in vault.counts_by_type() {
            debug!(%entity_type, count, "loaded records");
        }
        Ok(vault)
    }

    fn record_files(&self, folder: &Path) -> Vec<PathBuf> {
        let extension = self.layout.extension();
        // Symlinked records and folders count as part of the vault
        WalkDir::new(folder)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "failed to walk vault folder");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some(extension))
            .map(walkdir::DirEntry::into_path)
            .collect()
    }
}

/// Build a record from a file's content, or `None` if it isn't one.
pub fn load_record(source: &Path, content: &str) -> Option<Record> {
    let metadata = match parse_frontmatter(content) {
        Ok(Some(metadata)) => metadata,
        Ok(None) => {
            debug!(path = %source.display(), "no frontmatter, skipping");
            return None;
        }
        Err(e) => {
            warn!(path = %source.display(), error = %e, "frontmatter is not valid YAML");
            return None;
        }
    };
    record_from_metadata(source, metadata)
}

/// Extract the frontmatter mapping from a document.
///
/// The document must open with a `---` line; the block runs to the next `---`
/// line. Returns `Ok(None)` when there is no complete block or the block is
/// not a YAML mapping.
pub fn parse_frontmatter(content: &str) -> std::result::Result<Option<Mapping>, serde_yaml::Error> {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if first.trim_end() != "---" {
        return Ok(None);
    }

    let start = first.len();
    let mut end = start;
    for line in lines {
        if line.trim_end() == "---" {
            let block = &content[start..end];
            if block.trim().is_empty() {
                return Ok(None);
            }
            return match serde_yaml::from_str::<Value>(block)? {
                Value::Mapping(mapping) => Ok(Some(mapping)),
                _ => Ok(None),
            };
        }
        end += line.len();
    }
    Ok(None)
}

/// Build a record from parsed frontmatter.
///
/// Requires a non-empty string `id` with a known prefix.
pub fn record_from_metadata(source: &Path, metadata: Mapping) -> Option<Record> {
    let id = match metadata.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => {
            debug!(path = %source.display(), "frontmatter has no id, skipping");
            return None;
        }
    };
    let Some(entity_type) = EntityType::classify(&id).entity_type() else {
        debug!(path = %source.display(), %id, "unrecognized id prefix, skipping");
        return None;
    };

    let refs = |field: RelationField| normalize_refs(metadata.get(field.as_str()));

    let mut record = Record::new(id, entity_type, source.to_path_buf());
    record.title = normalize_ref(metadata.get("title")).unwrap_or_default();
    record.status = normalize_ref(metadata.get("status")).unwrap_or_default();
    // `milestone` is the legacy spelling of `parent`
    record.parent = normalize_ref(metadata.get(RelationField::Parent.as_str()))
        .or_else(|| normalize_ref(metadata.get("milestone")));
    record.depends_on = refs(RelationField::DependsOn);
    record.blocked_by = refs(RelationField::BlockedBy);
    record.implements = refs(RelationField::Implements);
    record.enables = refs(RelationField::Enables);
    record.implemented_by = refs(RelationField::ImplementedBy);
    record.supersedes = normalize_ref(metadata.get(RelationField::Supersedes.as_str()));
    record.metadata = metadata;
    Some(record)
}

/// Normalize a multi-valued relationship to an ordered list of ids.
///
/// | value                   | result                          |
/// |-------------------------|---------------------------------|
/// | absent / null           | `[]`                            |
/// | sequence                | truthy scalar items, as text    |
/// | string containing `,`   | split, trimmed, empties dropped |
/// | any other scalar        | `[value]` unless falsy          |
/// | mapping / tagged value  | `[]`                            |
pub fn normalize_refs(value: Option<&Value>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) if s.contains(',') => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
    }
}

/// Normalize a single-valued field. Falsy and non-scalar values are absent.
pub fn normalize_ref(value: Option<&Value>) -> Option<String> {
    value.and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
