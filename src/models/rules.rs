//! Relationship rule table.
//!
//! Which entity types a record may reference through each typed relationship
//! field, keyed by the referencing record's own type, plus the hierarchy rule
//! for `parent`. Fields with no entry (e.g. `blocked_by`, `supersedes`) are
//! existence-checked only.

use super::{EntityType, RelationField};
use serde::Serialize;
use std::collections::BTreeMap;

use super::EntityType::{Decision, Document, Milestone, Story, Task};

/// One "source type -> field -> allowed target types" constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationRule {
    pub source: EntityType,
    pub field: RelationField,
    /// Allowed target types, in declaration order
    pub allowed: Vec<EntityType>,
}

/// Immutable type-compatibility table consulted by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    targets: BTreeMap<(EntityType, RelationField), Vec<EntityType>>,
    parents: BTreeMap<EntityType, EntityType>,
}

impl RuleTable {
    /// Create a table with no rules.
    pub fn empty() -> Self {
        Self {
            targets: BTreeMap::new(),
            parents: BTreeMap::new(),
        }
    }

    /// Allow `source.field` to reference `allowed` target types.
    pub fn with_targets(
        mut self,
        source: EntityType,
        field: RelationField,
        allowed: &[EntityType],
    ) -> Self {
        self.targets.insert((source, field), allowed.to_vec());
        self
    }

    /// Require records of type `child` to have a parent of type `parent`.
    pub fn with_parent(mut self, child: EntityType, parent: EntityType) -> Self {
        self.parents.insert(child, parent);
        self
    }

    /// Allowed target types for `source.field`, or `None` when no rule applies.
    pub fn allowed_targets(
        &self,
        source: EntityType,
        field: RelationField,
    ) -> Option<&[EntityType]> {
        self.targets.get(&(source, field)).map(Vec::as_slice)
    }

    /// Expected parent type for records of type `child`.
    pub fn expected_parent(&self, child: EntityType) -> Option<EntityType> {
        self.parents.get(&child).copied()
    }

    /// All target rules, ordered by source type then field.
    pub fn entries(&self) -> Vec<RelationRule> {
        self.targets
            .iter()
            .map(|((source, field), allowed)| RelationRule {
                source: *source,
                field: *field,
                allowed: allowed.clone(),
            })
            .collect()
    }

    /// All parent rules as `(child, parent)` pairs.
    pub fn parent_entries(&self) -> Vec<(EntityType, EntityType)> {
        self.parents.iter().map(|(c, p)| (*c, *p)).collect()
    }
}

impl Default for RuleTable {
    /// The standard vault layering: milestones contain stories contain tasks,
    /// decisions gate work, documents are implemented by concrete work items.
    fn default() -> Self {
        use super::RelationField::{DependsOn, Enables, ImplementedBy, Implements};

        Self::empty()
            .with_targets(Decision, Enables, &[Document, Story, Task])
            .with_targets(Document, ImplementedBy, &[Story, Task])
            .with_targets(Story, Implements, &[Document])
            .with_targets(Task, Implements, &[Document])
            .with_targets(Milestone, Implements, &[Document])
            .with_targets(Milestone, DependsOn, &[Milestone, Decision])
            .with_targets(Story, DependsOn, &[Story, Decision, Document])
            .with_targets(Task, DependsOn, &[Task, Decision])
            .with_targets(Decision, DependsOn, &[Decision])
            .with_targets(Document, DependsOn, &[Document, Decision])
            .with_parent(Story, Milestone)
            .with_parent(Task, Story)
    }
}

/// Render a type list as "a, b, c".
pub fn join_types(types: &[EntityType]) -> String {
    types
        .iter()
        .map(EntityType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
