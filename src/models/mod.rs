//! Data models for vault entities.
//!
//! This module defines the core data structures:
//! - `EntityType` - The closed set of planning entity kinds, classified by id prefix
//! - `Record` - One planning entity loaded from a vault file
//! - `RelationField` - The relationship fields a record may carry
//! - `Finding` - One validation result (error or warning)
//!
//! The relationship rule table lives in [`rules`].

pub mod rules;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Records keyed by id, in load order.
pub type RecordMap = IndexMap<String, Record>;

/// Kind of planning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Top-level delivery target (`M-` ids)
    Milestone,
    /// User-facing unit of work inside a milestone (`S-` ids)
    Story,
    /// Concrete work item inside a story (`T-` ids)
    Task,
    /// Recorded decision that gates other work (`DEC-` ids)
    Decision,
    /// Design or reference document (`DOC-` ids)
    Document,
}

/// Fixed id prefix table. Classification picks the longest matching prefix.
const PREFIXES: &[(&str, EntityType)] = &[
    ("M-", EntityType::Milestone),
    ("S-", EntityType::Story),
    ("T-", EntityType::Task),
    ("DEC-", EntityType::Decision),
    ("DOC-", EntityType::Document),
];

/// Outcome of classifying an id string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The id carries a known prefix
    Known(EntityType),
    /// No prefix matched; callers skip the record
    Unclassified,
}

impl Classification {
    /// The classified type, if any.
    pub fn entity_type(self) -> Option<EntityType> {
        match self {
            Classification::Known(t) => Some(t),
            Classification::Unclassified => None,
        }
    }
}

impl EntityType {
    /// Classify an id by its prefix.
    pub fn classify(id: &str) -> Classification {
        PREFIXES
            .iter()
            .filter(|(prefix, _)| id.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or(Classification::Unclassified, |(_, t)| {
                Classification::Known(*t)
            })
    }

    /// Returns true if `name` starts with any known id prefix.
    pub fn has_known_prefix(name: &str) -> bool {
        matches!(Self::classify(name), Classification::Known(_))
    }

    /// Get all entity types in canonical order.
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::Milestone,
            EntityType::Story,
            EntityType::Task,
            EntityType::Decision,
            EntityType::Document,
        ]
    }

    /// Vault folder holding records of this type by default.
    pub fn default_folder(&self) -> &'static str {
        match self {
            EntityType::Milestone => "milestones",
            EntityType::Story => "stories",
            EntityType::Task => "tasks",
            EntityType::Decision => "decisions",
            EntityType::Document => "documents",
        }
    }

    /// Lowercase name used in metadata, config and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Milestone => "milestone",
            EntityType::Story => "story",
            EntityType::Task => "task",
            EntityType::Decision => "decision",
            EntityType::Document => "document",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "milestone" => Ok(EntityType::Milestone),
            "story" => Ok(EntityType::Story),
            "task" => Ok(EntityType::Task),
            "decision" => Ok(EntityType::Decision),
            "document" => Ok(EntityType::Document),
            _ => Err(format!("Unknown entity type: {}", s)),
        }
    }
}

/// Relationship field on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationField {
    /// Source cannot progress until targets are done
    DependsOn,
    /// Source is currently blocked by targets (may live outside the vault)
    BlockedBy,
    /// Work item implements the target documents
    Implements,
    /// Decision unlocks the target work
    Enables,
    /// Document is implemented by the target work items
    ImplementedBy,
    /// Hierarchical container (single-valued)
    Parent,
    /// Record replaces the target (single-valued)
    Supersedes,
}

impl RelationField {
    /// Get all relationship fields in existence-check order.
    pub fn all() -> &'static [RelationField] {
        &[
            RelationField::DependsOn,
            RelationField::BlockedBy,
            RelationField::Implements,
            RelationField::Enables,
            RelationField::ImplementedBy,
            RelationField::Parent,
            RelationField::Supersedes,
        ]
    }

    /// Metadata key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationField::DependsOn => "depends_on",
            RelationField::BlockedBy => "blocked_by",
            RelationField::Implements => "implements",
            RelationField::Enables => "enables",
            RelationField::ImplementedBy => "implemented_by",
            RelationField::Parent => "parent",
            RelationField::Supersedes => "supersedes",
        }
    }
}

impl fmt::Display for RelationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One planning entity loaded from the vault.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Unique identifier (e.g., "M-001")
    pub id: String,

    /// Entity type, derived from the id prefix
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Record title
    pub title: String,

    /// Free-form status string
    pub status: String,

    /// File the record was loaded from
    pub source: PathBuf,

    /// Hierarchical parent id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enables: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implemented_by: Vec<String>,

    /// Id of the record this one replaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,

    /// Raw frontmatter as loaded, in source order
    #[serde(skip)]
    pub metadata: serde_yaml::Mapping,
}

impl Record {
    /// Create a record with the given id, type and source and no relationships.
    pub fn new(id: String, entity_type: EntityType, source: PathBuf) -> Self {
        Self {
            id,
            entity_type,
            title: String::new(),
            status: String::new(),
            source,
            parent: None,
            depends_on: Vec::new(),
            blocked_by: Vec::new(),
            implements: Vec::new(),
            enables: Vec::new(),
            implemented_by: Vec::new(),
            supersedes: None,
            metadata: serde_yaml::Mapping::new(),
        }
    }

    /// Ids referenced through `field`, in declaration order.
    pub fn references(&self, field: RelationField) -> &[String] {
        match field {
            RelationField::DependsOn => &self.depends_on,
            RelationField::BlockedBy => &self.blocked_by,
            RelationField::Implements => &self.implements,
            RelationField::Enables => &self.enables,
            RelationField::ImplementedBy => &self.implemented_by,
            RelationField::Parent => self.parent.as_slice(),
            RelationField::Supersedes => self.supersedes.as_slice(),
        }
    }
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Structural violation that must block downstream use
    Error,
    /// Softer issue that merits attention
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Field a finding is attributed to: a relationship field or a whole-file sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingField {
    DependsOn,
    BlockedBy,
    Implements,
    Enables,
    ImplementedBy,
    Parent,
    Supersedes,
    /// A canvas node referencing an entity file
    CanvasNode,
    /// The file as a whole
    File,
}

impl From<RelationField> for FindingField {
    fn from(field: RelationField) -> Self {
        match field {
            RelationField::DependsOn => FindingField::DependsOn,
            RelationField::BlockedBy => FindingField::BlockedBy,
            RelationField::Implements => FindingField::Implements,
            RelationField::Enables => FindingField::Enables,
            RelationField::ImplementedBy => FindingField::ImplementedBy,
            RelationField::Parent => FindingField::Parent,
            RelationField::Supersedes => FindingField::Supersedes,
        }
    }
}

impl fmt::Display for FindingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FindingField::DependsOn => "depends_on",
            FindingField::BlockedBy => "blocked_by",
            FindingField::Implements => "implements",
            FindingField::Enables => "enables",
            FindingField::ImplementedBy => "implemented_by",
            FindingField::Parent => "parent",
            FindingField::Supersedes => "supersedes",
            FindingField::CanvasNode => "canvas_node",
            FindingField::File => "file",
        };
        write!(f, "{}", s)
    }
}

/// One validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Entity the finding is attributed to
    pub entity_id: String,

    /// Field that triggered it
    pub field: FindingField,

    /// Human-readable description
    pub message: String,

    pub severity: Severity,

    /// Where the checked entity was loaded from
    pub source: PathBuf,
}

impl Finding {
    /// Create an error-severity finding.
    pub fn error(
        entity_id: impl Into<String>,
        field: impl Into<FindingField>,
        message: impl Into<String>,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
            source: source.into(),
        }
    }

    /// Create a warning-severity finding.
    pub fn warning(
        entity_id: impl Into<String>,
        field: impl Into<FindingField>,
        message: impl Into<String>,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(entity_id, field, message, source)
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Overall result of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No findings at all
    Passed,
    /// Only warning-severity findings
    PassedWithWarnings,
    /// At least one error-severity finding
    Failed,
}

impl Outcome {
    /// Derive the run outcome from a set of findings.
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut outcome = Outcome::Passed;
        for finding in findings {
            match finding.severity {
                Severity::Error => return Outcome::Failed,
                Severity::Warning => outcome = Outcome::PassedWithWarnings,
            }
        }
        outcome
    }

    /// Returns true unless the run failed.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => write!(f, "Validation PASSED"),
            Outcome::PassedWithWarnings => write!(f, "Validation passed with warnings"),
            Outcome::Failed => write!(f, "Validation FAILED"),
        }
    }
}

/// Count error-severity findings.
pub fn error_count(findings: &[Finding]) -> usize {
    findings.iter().filter(|f| f.is_error()).count()
}

/// Count warning-severity findings.
pub fn warning_count(findings: &[Finding]) -> usize {
    findings.iter().filter(|f| !f.is_error()).count()
}
