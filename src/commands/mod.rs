//! Command implementations for the vaultcheck CLI.
//!
//! This module contains the business logic for each CLI command:
//! - `check` - Load, validate and cross-check a vault (the default)
//! - `entities` / `show` - Inspect loaded records
//! - `canvas` - Canvas cross-check only
//! - `rules` - Print the relationship rule table
//! - `config` - Show or write settings
//!
//! Every command returns a result type implementing [`Output`], which `main`
//! prints as compact JSON or human-readable text.

use crate::canvas::check_canvas_file;
use crate::config::{ResolvedSettings, VAULT_CONFIG_FILE, ValueSource, VaultConfig};
use crate::loader::{LoadedVault, Loader};
use crate::models::rules::{RelationRule, RuleTable, join_types};
use crate::models::{
    EntityType, Finding, Outcome, Record, RelationField, Severity, error_count, warning_count,
};
use crate::validate::Validator;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Load the vault described by `settings`.
pub fn load_vault(settings: &ResolvedSettings) -> Result<LoadedVault> {
    let layout = settings.layout();
    Loader::new(&layout).load(settings.vault_path())
}

// === Check ===

/// Canvas portion of a check run.
#[derive(Serialize)]
pub struct CanvasSection {
    /// Canvas file checked or looked for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub checked: bool,
    pub findings: Vec<Finding>,
    /// Why the canvas was not checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CanvasSection {
    fn skipped(path: Option<PathBuf>, note: impl Into<String>) -> Self {
        Self {
            path,
            checked: false,
            findings: Vec::new(),
            note: Some(note.into()),
        }
    }

    fn checked(path: PathBuf, findings: Vec<Finding>) -> Self {
        Self {
            path: Some(path),
            checked: true,
            findings,
            note: None,
        }
    }
}

/// Full report of a `check` run.
#[derive(Serialize)]
pub struct CheckReport {
    pub vault: PathBuf,
    pub checked_at: DateTime<Utc>,
    pub entity_count: usize,
    pub by_type: BTreeMap<EntityType, usize>,
    pub duplicates: IndexMap<String, Vec<PathBuf>>,
    /// Relationship findings, in record order
    pub findings: Vec<Finding>,
    pub canvas: CanvasSection,
    pub errors: usize,
    pub warnings: usize,
    pub outcome: Outcome,
}

impl Output for CheckReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Vault: {} ({} entities)",
            self.vault.display(),
            self.entity_count
        )];
        for (entity_type, count) in &self.by_type {
            lines.push(format!("  {:<10} {}", entity_type, count));
        }

        if !self.duplicates.is_empty() {
            lines.push(String::new());
            lines.push(format!("Duplicate ids ({}):", self.duplicates.len()));
            for (id, paths) in &self.duplicates {
                lines.push(format!("  {}", id));
                for path in paths {
                    lines.push(format!("    {}", path.display()));
                }
            }
        }

        if !self.findings.is_empty() {
            lines.push(String::new());
            lines.push("Relationship findings:".to_string());
            lines.extend(format_grouped(&self.findings));
        }

        lines.push(String::new());
        match (&self.canvas.path, &self.canvas.note) {
            (_, Some(note)) => lines.push(format!("Canvas: skipped ({})", note)),
            (Some(path), None) => {
                lines.push(format!(
                    "Canvas: {} ({} findings)",
                    path.display(),
                    self.canvas.findings.len()
                ));
                lines.extend(format_grouped(&self.canvas.findings));
            }
            (None, None) => lines.push("Canvas: skipped".to_string()),
        }

        lines.push(String::new());
        lines.push(format!(
            "{} error(s), {} warning(s)",
            self.errors, self.warnings
        ));
        lines.push(self.outcome.to_string());
        lines.join("\n")
    }
}

/// How `check` should treat the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasMode {
    /// Use `--canvas` or the configured canvas
    Auto,
    /// `--no-canvas`
    Disabled,
}

/// Load, validate and cross-check the vault.
pub fn check(settings: &ResolvedSettings, mode: CanvasMode) -> Result<CheckReport> {
    let vault = load_vault(settings)?;
    let rules = RuleTable::default();
    let findings = Validator::new(&vault.records, &rules).validate();

    let canvas = match (mode, settings.canvas_path()) {
        (CanvasMode::Disabled, _) => CanvasSection::skipped(None, "disabled with --no-canvas"),
        (CanvasMode::Auto, None) => CanvasSection::skipped(None, "no canvas configured"),
        (CanvasMode::Auto, Some(path)) => {
            let explicit = settings
                .canvas
                .as_ref()
                .is_some_and(|c| c.source == ValueSource::CliFlag);
            if explicit || path.exists() {
                let canvas_findings = check_canvas_file(&path, &vault.records);
                CanvasSection::checked(path, canvas_findings)
            } else {
                CanvasSection::skipped(Some(path), "canvas file not found")
            }
        }
    };

    let all: Vec<&Finding> = findings.iter().chain(canvas.findings.iter()).collect();
    let errors = all.iter().filter(|f| f.is_error()).count();
    let warnings = all.len() - errors;
    let outcome = Outcome::from_findings(all.iter().copied());

    info!(
        entities = vault.records.len(),
        errors, warnings, "check finished: {}", outcome
    );

    Ok(CheckReport {
        vault: settings.vault_path().to_path_buf(),
        checked_at: Utc::now(),
        entity_count: vault.records.len(),
        by_type: vault.counts_by_type(),
        duplicates: vault.duplicates,
        findings,
        canvas,
        errors,
        warnings,
        outcome,
    })
}

/// Render findings grouped by entity id, ids sorted.
fn format_grouped(findings: &[Finding]) -> Vec<String> {
    let mut grouped: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
    for finding in findings {
        grouped
            .entry(finding.entity_id.as_str())
            .or_default()
            .push(finding);
    }

    let mut lines = Vec::new();
    for (id, group) in grouped {
        lines.push(format!("  {}", id));
        for finding in group {
            lines.push(format!(
                "    [{}] {}: {}",
                severity_label(finding.severity),
                finding.field,
                finding.message
            ));
        }
    }
    lines
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARN",
    }
}

// === Entities ===

#[derive(Serialize)]
pub struct EntitySummary {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub title: String,
    pub status: String,
    pub source: PathBuf,
}

impl From<&Record> for EntitySummary {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            entity_type: record.entity_type,
            title: record.title.clone(),
            status: record.status.clone(),
            source: record.source.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct EntityList {
    pub count: usize,
    pub entities: Vec<EntitySummary>,
    pub duplicates: IndexMap<String, Vec<PathBuf>>,
}

impl Output for EntityList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.entities.is_empty() {
            return "No entities found.".to_string();
        }
        let mut lines = vec![format!("{} entities:", self.count)];
        for entity in &self.entities {
            let status = if entity.status.is_empty() {
                String::new()
            } else {
                format!(" [{}]", entity.status)
            };
            lines.push(format!("  {:<8} {}{}", entity.id, entity.title, status));
        }
        if !self.duplicates.is_empty() {
            let ids: Vec<&str> = self.duplicates.keys().map(String::as_str).collect();
            lines.push(format!("Duplicate ids: {}", ids.join(", ")));
        }
        lines.join("\n")
    }
}

/// List loaded records in load order, optionally filtered by type name.
pub fn entities(settings: &ResolvedSettings, entity_type: Option<&str>) -> Result<EntityList> {
    let filter = entity_type
        .map(|t| t.parse::<EntityType>().map_err(Error::InvalidInput))
        .transpose()?;
    let vault = load_vault(settings)?;

    let entities: Vec<EntitySummary> = vault
        .records
        .values()
        .filter(|r| filter.is_none_or(|t| r.entity_type == t))
        .map(EntitySummary::from)
        .collect();

    Ok(EntityList {
        count: entities.len(),
        entities,
        duplicates: vault.duplicates,
    })
}

// === Show ===

/// Incoming reference from another record.
#[derive(Serialize)]
pub struct Backlink {
    pub id: String,
    pub field: RelationField,
}

#[derive(Serialize)]
pub struct ShowResult {
    pub record: Record,
    /// Raw frontmatter
    pub metadata: serde_json::Value,
    pub referenced_by: Vec<Backlink>,
    pub findings: Vec<Finding>,
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let record = &self.record;
        let mut lines = vec![format!("{} ({})", record.id, record.entity_type)];
        if !record.title.is_empty() {
            lines.push(format!("  Title:  {}", record.title));
        }
        if !record.status.is_empty() {
            lines.push(format!("  Status: {}", record.status));
        }
        lines.push(format!("  Source: {}", record.source.display()));

        for field in RelationField::all() {
            let refs = record.references(*field);
            if !refs.is_empty() {
                lines.push(format!("  {}: {}", field, refs.join(", ")));
            }
        }

        if !self.referenced_by.is_empty() {
            lines.push("  Referenced by:".to_string());
            for link in &self.referenced_by {
                lines.push(format!("    {} ({})", link.id, link.field));
            }
        }

        if self.findings.is_empty() {
            lines.push("  No findings.".to_string());
        } else {
            lines.push(format!("  Findings ({}):", self.findings.len()));
            for finding in &self.findings {
                lines.push(format!(
                    "    [{}] {}: {}",
                    severity_label(finding.severity),
                    finding.field,
                    finding.message
                ));
            }
        }
        lines.join("\n")
    }
}

/// Show one record with its references and the findings attributed to it.
pub fn show(settings: &ResolvedSettings, id: &str) -> Result<ShowResult> {
    let vault = load_vault(settings)?;
    let record = vault
        .records
        .get(id)
        .ok_or_else(|| Error::NotFound(format!("entity '{}'", id)))?;

    let rules = RuleTable::default();
    let mut findings = Vec::new();
    Validator::new(&vault.records, &rules).validate_record(record, &mut findings);

    let referenced_by = vault
        .records
        .values()
        .flat_map(|other| {
            RelationField::all()
                .iter()
                .filter(|field| other.references(**field).iter().any(|r| r == id))
                .map(|field| Backlink {
                    id: other.id.clone(),
                    field: *field,
                })
        })
        .collect();

    Ok(ShowResult {
        metadata: mapping_to_json(&record.metadata),
        record: record.clone(),
        referenced_by,
        findings,
    })
}

/// Frontmatter as JSON. YAML allows any value as a key; non-string keys are
/// rendered as their JSON text (`1`, `["a","b"]`).
fn mapping_to_json(mapping: &serde_yaml::Mapping) -> serde_json::Value {
    serde_json::Value::Object(
        mapping
            .iter()
            .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
            .collect(),
    )
}

fn yaml_key(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        other => yaml_to_json(other).to_string(),
    }
}

fn yaml_to_json(value: &serde_yaml::Value) -> serde_json::Value {
    use serde_json::Value as Json;
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Json::Null,
        Yaml::Bool(b) => Json::Bool(*b),
        Yaml::Number(n) => serde_json::to_value(n).unwrap_or(Json::Null),
        Yaml::String(s) => Json::String(s.clone()),
        Yaml::Sequence(items) => Json::Array(items.iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => mapping_to_json(mapping),
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

// === Canvas ===

#[derive(Serialize)]
pub struct CanvasReport {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
    pub errors: usize,
    pub warnings: usize,
    pub outcome: Outcome,
}

impl Output for CanvasReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Canvas: {}", self.path.display())];
        lines.extend(format_grouped(&self.findings));
        lines.push(format!(
            "{} error(s), {} warning(s)",
            self.errors, self.warnings
        ));
        lines.push(self.outcome.to_string());
        lines.join("\n")
    }
}

/// Cross-check a canvas file against the vault's records.
///
/// `path` is resolved against the vault root; without one the configured
/// canvas is used.
pub fn canvas(settings: &ResolvedSettings, path: Option<&Path>) -> Result<CanvasReport> {
    let path = match path {
        Some(path) => settings.vault_path().join(path),
        None => settings.canvas_path().ok_or_else(|| {
            Error::InvalidInput(
                "no canvas configured; pass a path or set `canvas` in the config".to_string(),
            )
        })?,
    };

    let vault = load_vault(settings)?;
    let findings = check_canvas_file(&path, &vault.records);

    Ok(CanvasReport {
        errors: error_count(&findings),
        warnings: warning_count(&findings),
        outcome: Outcome::from_findings(&findings),
        path,
        findings,
    })
}

// === Rules ===

#[derive(Serialize)]
pub struct ParentRule {
    pub child: EntityType,
    pub parent: EntityType,
}

#[derive(Serialize)]
pub struct RulesResult {
    pub rules: Vec<RelationRule>,
    pub parents: Vec<ParentRule>,
}

impl Output for RulesResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec!["Relationship rules:".to_string()];
        for rule in &self.rules {
            lines.push(format!(
                "  {}.{} -> {}",
                rule.source,
                rule.field,
                join_types(&rule.allowed)
            ));
        }
        lines.push("Parent rules:".to_string());
        for rule in &self.parents {
            lines.push(format!("  {}.parent -> {}", rule.child, rule.parent));
        }
        lines.join("\n")
    }
}

/// Describe the relationship rule table.
pub fn rules() -> RulesResult {
    let table = RuleTable::default();
    RulesResult {
        rules: table.entries(),
        parents: table
            .parent_entries()
            .into_iter()
            .map(|(child, parent)| ParentRule { child, parent })
            .collect(),
    }
}

// === Config ===

#[derive(Serialize)]
pub struct ConfigShowResult {
    #[serde(flatten)]
    pub settings: ResolvedSettings,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.settings;
        let mut lines = vec![
            format!("vault = {} ({})", s.vault.value.display(), s.vault.source),
            match &s.canvas {
                Some(canvas) => format!("canvas = {} ({})", canvas.value, canvas.source),
                None => "canvas = (none)".to_string(),
            },
            format!(
                "output-format = {} ({})",
                s.output_format.value, s.output_format.source
            ),
            format!("extension = {} ({})", s.extension.value, s.extension.source),
        ];
        for (entity_type, folder) in &s.folders {
            lines.push(format!(
                "folders.{} = {} ({})",
                entity_type, folder.value, folder.source
            ));
        }
        if s.config_files.is_empty() {
            lines.push("No config files found.".to_string());
        } else {
            lines.push("Config files:".to_string());
            for path in &s.config_files {
                lines.push(format!("  {}", path.display()));
            }
        }
        lines.join("\n")
    }
}

/// Show the resolved settings with their sources.
pub fn config_show(settings: &ResolvedSettings) -> ConfigShowResult {
    ConfigShowResult {
        settings: settings.clone(),
    }
}

#[derive(Serialize)]
pub struct ConfigInitResult {
    pub path: PathBuf,
    pub overwritten: bool,
}

impl Output for ConfigInitResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.overwritten {
            format!("Overwrote {}", self.path.display())
        } else {
            format!("Wrote {}", self.path.display())
        }
    }
}

/// Write the effective settings to `<vault>/.vaultcheck.kdl`.
pub fn config_init(settings: &ResolvedSettings, force: bool) -> Result<ConfigInitResult> {
    let path = settings.vault_path().join(VAULT_CONFIG_FILE);
    let overwritten = path.exists();
    if overwritten && !force {
        return Err(Error::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let config = VaultConfig {
        vault: None,
        canvas: settings.canvas.as_ref().map(|c| c.value.clone()),
        output_format: Some(settings.output_format.value),
        extension: Some(settings.extension.value.clone()),
        folders: settings
            .folders
            .iter()
            .map(|(entity_type, folder)| (*entity_type, folder.value.clone()))
            .collect(),
    };
    fs::write(&path, config.to_kdl().to_string())?;
    info!(path = %path.display(), "wrote vault config");

    Ok(ConfigInitResult { path, overwritten })
}

// === Version ===

#[derive(Serialize)]
pub struct VersionResult {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
}

impl Output for VersionResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut line = format!("vck {}", self.version);
        if let Some(ref commit) = self.git_commit {
            line.push_str(&format!(" ({})", commit));
        }
        if let Some(ref timestamp) = self.build_timestamp {
            line.push_str(&format!(" built {}", timestamp));
        }
        line
    }
}

pub fn version() -> VersionResult {
    VersionResult {
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_timestamp: option_env!("VCK_BUILD_TIMESTAMP").map(str::to_string),
        git_commit: option_env!("VCK_GIT_COMMIT").map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, resolve_settings_with_system};
    use crate::test_utils::TestVault;

    fn settings(vault: &TestVault) -> ResolvedSettings {
        let overrides = ConfigOverrides::new().with_vault(vault.path());
        resolve_settings_with_system(&overrides, vault.path(), None).unwrap()
    }

    fn sample_vault() -> TestVault {
        let vault = TestVault::new();
        vault.record("M-001", "title: Platform\n");
        vault.record("S-001", "title: Login\nparent: M-001\n");
        vault.record("T-001", "title: Form\nparent: S-001\nstatus: todo\n");
        vault
    }

    #[test]
    fn test_check_clean_vault_passes() {
        let vault = sample_vault();
        let report = check(&settings(&vault), CanvasMode::Auto).unwrap();

        assert_eq!(report.entity_count, 3);
        assert_eq!(report.by_type[&EntityType::Task], 1);
        assert_eq!(report.by_type[&EntityType::Decision], 0);
        assert_eq!(report.outcome, Outcome::Passed);
        assert!(!report.canvas.checked);
        assert!(report.to_human().ends_with("Validation PASSED"));
    }

    #[test]
    fn test_check_reports_errors_and_warnings() {
        let vault = sample_vault();
        vault.record("T-002", "parent: S-001\ndepends_on: [S-001]\nblocked_by: T-404\n");
        let report = check(&settings(&vault), CanvasMode::Auto).unwrap();

        assert_eq!(report.errors, 1);
        assert_eq!(report.warnings, 1);
        assert_eq!(report.outcome, Outcome::Failed);
        let human = report.to_human();
        assert!(human.contains("  T-002"));
        assert!(human.contains("[WARN] blocked_by"));
        assert!(human.contains("1 error(s), 1 warning(s)"));
    }

    #[test]
    fn test_check_configured_canvas() {
        let vault = sample_vault();
        vault.write(".vaultcheck.kdl", "canvas \"Board.canvas\"\n");
        vault.write(
            "Board.canvas",
            r#"{"nodes": [{"id": "a", "type": "file", "file": "tasks/T-009.md"}]}"#,
        );
        let report = check(&settings(&vault), CanvasMode::Auto).unwrap();

        assert!(report.canvas.checked);
        assert_eq!(report.canvas.findings.len(), 1);
        assert_eq!(report.warnings, 1);
        assert_eq!(report.outcome, Outcome::PassedWithWarnings);

        let disabled = check(&settings(&vault), CanvasMode::Disabled).unwrap();
        assert!(!disabled.canvas.checked);
        assert_eq!(disabled.outcome, Outcome::Passed);
    }

    #[test]
    fn test_missing_configured_canvas_is_skipped() {
        let vault = sample_vault();
        vault.write(".vaultcheck.kdl", "canvas \"Gone.canvas\"\n");
        let report = check(&settings(&vault), CanvasMode::Auto).unwrap();

        assert!(!report.canvas.checked);
        assert_eq!(report.canvas.note.as_deref(), Some("canvas file not found"));
        assert_eq!(report.outcome, Outcome::Passed);
    }

    #[test]
    fn test_missing_explicit_canvas_fails() {
        let vault = sample_vault();
        let overrides = ConfigOverrides::new()
            .with_vault(vault.path())
            .with_canvas("Gone.canvas");
        let settings = resolve_settings_with_system(&overrides, vault.path(), None).unwrap();
        let report = check(&settings, CanvasMode::Auto).unwrap();

        assert!(report.canvas.checked);
        assert_eq!(report.canvas.findings[0].entity_id, "canvas");
        assert_eq!(report.outcome, Outcome::Failed);
    }

    #[test]
    fn test_entities_filter() {
        let vault = sample_vault();
        let all = entities(&settings(&vault), None).unwrap();
        let ids: Vec<&str> = all.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["M-001", "S-001", "T-001"]);

        let tasks = entities(&settings(&vault), Some("Task")).unwrap();
        assert_eq!(tasks.count, 1);
        assert_eq!(tasks.entities[0].status, "todo");

        assert!(matches!(
            entities(&settings(&vault), Some("epic")),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_show_backlinks_and_findings() {
        let vault = sample_vault();
        vault.record("T-002", "parent: S-001\nimplements: DOC-404\n");
        let result = show(&settings(&vault), "S-001").unwrap();

        let backlinks: Vec<&str> = result.referenced_by.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(backlinks, vec!["T-001", "T-002"]);
        assert!(result.findings.is_empty());
        assert_eq!(result.metadata["title"], "Login");

        let broken = show(&settings(&vault), "T-002").unwrap();
        assert_eq!(broken.findings.len(), 1);
        assert!(broken.to_human().contains("Referenced document 'DOC-404' not found"));
    }

    #[test]
    fn test_show_non_string_frontmatter_keys() {
        let vault = sample_vault();
        vault.record(
            "T-002",
            "parent: S-001\n? [a, b]\n: c\n1: one\nextra:\n  2: two\n",
        );
        let result = show(&settings(&vault), "T-002").unwrap();

        assert_eq!(result.metadata["[\"a\",\"b\"]"], "c");
        assert_eq!(result.metadata["1"], "one");
        assert_eq!(result.metadata["extra"]["2"], "two");
        assert_eq!(result.metadata["parent"], "S-001");
        assert!(result.findings.is_empty());
        assert!(result.to_json().contains("\"record\""));
    }

    #[test]
    fn test_show_unknown_id() {
        let vault = sample_vault();
        assert!(matches!(
            show(&settings(&vault), "T-999"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_canvas_requires_path_or_config() {
        let vault = sample_vault();
        assert!(matches!(
            canvas(&settings(&vault), None),
            Err(Error::InvalidInput(_))
        ));

        vault.write("c.canvas", "{\"nodes\": []}");
        let report = canvas(&settings(&vault), Some(Path::new("c.canvas"))).unwrap();
        assert_eq!(report.outcome, Outcome::Passed);
    }

    #[test]
    fn test_rules_lists_parent_rules() {
        let result = rules();
        assert_eq!(result.parents.len(), 2);
        assert!(result.to_human().contains("task.parent -> story"));
        assert!(result.to_human().contains("decision.enables -> document, story, task"));
    }

    #[test]
    fn test_config_init_refuses_overwrite() {
        let vault = sample_vault();
        let first = config_init(&settings(&vault), false).unwrap();
        assert!(!first.overwritten);
        assert!(first.path.exists());

        assert!(matches!(
            config_init(&settings(&vault), false),
            Err(Error::InvalidInput(_))
        ));
        assert!(config_init(&settings(&vault), true).unwrap().overwritten);

        // The written file resolves back to the same layout.
        let reloaded = settings(&vault);
        assert_eq!(reloaded.layout(), settings(&vault).layout());
        assert_eq!(reloaded.config_files, vec![first.path]);
    }

    #[test]
    fn test_version_json() {
        let json = version().to_json();
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }
}
