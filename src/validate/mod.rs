//! Relationship validation over a loaded record collection.
//!
//! Every record goes through three independent passes, in order:
//!
//! 1. **Existence**: each referenced id must be in the collection. Missing
//!    targets are errors, except `blocked_by` which only warns because a
//!    blocker may be tracked outside the vault or already removed.
//! 2. **Target types**: resolved targets of `enables`, `implemented_by`,
//!    `implements` and `depends_on` must have a type the [`RuleTable`] allows
//!    for the source record's type.
//! 3. **Parent type**: a resolved `parent` must have the type the rule table
//!    expects for the record's type.
//!
//! Unresolved targets are never type-checked. Checks never short-circuit, so a
//! record with N violations yields N findings.

use crate::models::rules::{RuleTable, join_types};
use crate::models::{Finding, Record, RecordMap, RelationField};
use tracing::debug;

/// Fields subject to target-type rules, in check order.
const TYPED_FIELDS: &[RelationField] = &[
    RelationField::Enables,
    RelationField::ImplementedBy,
    RelationField::Implements,
    RelationField::DependsOn,
];

/// Validate `records` against the default rule table.
pub fn validate(records: &RecordMap) -> Vec<Finding> {
    let rules = RuleTable::default();
    Validator::new(records, &rules).validate()
}

/// Runs the relationship checks over a record collection.
pub struct Validator<'a> {
    records: &'a RecordMap,
    rules: &'a RuleTable,
}

impl<'a> Validator<'a> {
    pub fn new(records: &'a RecordMap, rules: &'a RuleTable) -> Self {
        Self { records, rules }
    }

    /// Check every record, in collection order.
    pub fn validate(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        for record in self.records.values() {
            self.validate_record(record, &mut findings);
        }
        debug!(
            records = self.records.len(),
            findings = findings.len(),
            "validated relationships"
        );
        findings
    }

    /// Check a single record, appending its findings.
    pub fn validate_record(&self, record: &Record, findings: &mut Vec<Finding>) {
        self.check_references_exist(record, findings);
        for field in TYPED_FIELDS {
            self.check_target_types(record, *field, findings);
        }
        self.check_parent_type(record, findings);
    }

    fn check_references_exist(&self, record: &Record, findings: &mut Vec<Finding>) {
        for field in RelationField::all() {
            for target in record.references(*field) {
                if self.records.contains_key(target) {
                    continue;
                }
                let message = missing_message(*field, target);
                findings.push(match field {
                    RelationField::BlockedBy => {
                        Finding::warning(&record.id, *field, message, &record.source)
                    }
                    _ => Finding::error(&record.id, *field, message, &record.source),
                });
            }
        }
    }

    fn check_target_types(
        &self,
        record: &Record,
        field: RelationField,
        findings: &mut Vec<Finding>,
    ) {
        let Some(allowed) = self.rules.allowed_targets(record.entity_type, field) else {
            return;
        };

        for target_id in record.references(field) {
            let Some(target) = self.records.get(target_id) else {
                continue;
            };
            if allowed.contains(&target.entity_type) {
                continue;
            }
            findings.push(Finding::error(
                &record.id,
                field,
                format!(
                    "{} cannot {} {} '{}'. Valid types: {}",
                    record.entity_type,
                    verb(field),
                    target.entity_type,
                    target_id,
                    join_types(allowed)
                ),
                &record.source,
            ));
        }
    }

    fn check_parent_type(&self, record: &Record, findings: &mut Vec<Finding>) {
        let Some(parent) = record.parent.as_ref().and_then(|id| self.records.get(id)) else {
            return;
        };
        let Some(expected) = self.rules.expected_parent(record.entity_type) else {
            return;
        };
        if parent.entity_type != expected {
            findings.push(Finding::error(
                &record.id,
                RelationField::Parent,
                format!(
                    "Invalid parent type: expected '{}', got '{}' ('{}')",
                    expected, parent.entity_type, parent.id
                ),
                &record.source,
            ));
        }
    }
}

fn missing_message(field: RelationField, target: &str) -> String {
    match field {
        RelationField::Parent => format!("Parent entity '{}' not found", target),
        RelationField::Supersedes => format!("Superseded entity '{}' not found", target),
        RelationField::Implements => format!("Referenced document '{}' not found", target),
        _ => format!("Referenced entity '{}' not found", target),
    }
}

/// Relationship phrased as a verb, for messages like "task cannot depend on story".
fn verb(field: RelationField) -> &'static str {
    match field {
        RelationField::DependsOn => "depend on",
        RelationField::BlockedBy => "be blocked by",
        RelationField::Implements => "implement",
        RelationField::Enables => "enable",
        RelationField::ImplementedBy => "be implemented by",
        RelationField::Parent => "have parent",
        RelationField::Supersedes => "supersede",
    }
}
