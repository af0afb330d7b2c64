//! Canvas cross-reference checks.
//!
//! An Obsidian canvas is a JSON document of `nodes` and `edges`. File nodes
//! whose file name starts with an entity prefix (e.g. `milestones/M-001.md`)
//! are treated as references to that entity and must resolve against the
//! loaded records; a dangling one is a warning.
//!
//! Edges connect canvas node ids, not entity ids, so they are parsed but not
//! validated.

use crate::models::{EntityType, Finding, FindingField, RecordMap};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Entity id used for findings about the canvas file itself.
pub const CANVAS_ENTITY: &str = "canvas";

/// Node `type` for nodes that embed a vault file.
const FILE_NODE: &str = "file";

/// Parsed canvas document. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CanvasDocument {
    #[serde(default)]
    pub nodes: Vec<CanvasNode>,
    #[serde(default)]
    pub edges: Vec<CanvasEdge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CanvasNode {
    #[serde(default)]
    pub id: Option<String>,
    /// Node kind: "file", "text", "group", "link"
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Vault-relative path, present on file nodes
    #[serde(default)]
    pub file: Option<String>,
}

impl CanvasNode {
    /// Entity id referenced by this node, if it is a file node named after one.
    pub fn entity_id(&self) -> Option<String> {
        if self.kind.as_deref() != Some(FILE_NODE) {
            return None;
        }
        let stem = Path::new(self.file.as_deref()?).file_stem()?.to_str()?;
        EntityType::has_known_prefix(stem).then(|| stem.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasEdge {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from_node: Option<String>,
    #[serde(default)]
    pub to_node: Option<String>,
}

/// Read and check a canvas file.
///
/// A file that can't be read or parsed yields a single error finding.
pub fn check_canvas_file(path: &Path, records: &RecordMap) -> Vec<Finding> {
    match fs::read_to_string(path) {
        Ok(text) => check_canvas(&text, path, records),
        Err(e) => vec![load_failure(path, &e)],
    }
}

/// Check canvas JSON `text` (loaded from `path`) against `records`.
pub fn check_canvas(text: &str, path: &Path, records: &RecordMap) -> Vec<Finding> {
    let document: CanvasDocument = match serde_json::from_str(text) {
        Ok(document) => document,
        Err(e) => return vec![load_failure(path, &e)],
    };

    let findings: Vec<Finding> = document
        .nodes
        .iter()
        .filter_map(CanvasNode::entity_id)
        .filter(|id| !records.contains_key(id))
        .map(|id| {
            let message = format!("Canvas references non-existent entity '{}'", id);
            Finding::warning(id, FindingField::CanvasNode, message, path)
        })
        .collect();

    debug!(
        nodes = document.nodes.len(),
        edges = document.edges.len(),
        dangling = findings.len(),
        "checked canvas"
    );
    findings
}

fn load_failure(path: &Path, cause: &dyn std::fmt::Display) -> Finding {
    Finding::error(
        CANVAS_ENTITY,
        FindingField::File,
        format!("Failed to load canvas: {}", cause),
        path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, Severity};
    use crate::test_utils::TestVault;

    fn records(ids: &[&str]) -> RecordMap {
        ids.iter()
            .map(|id| {
                let t = EntityType::classify(id).entity_type().unwrap();
                (id.to_string(), Record::new(id.to_string(), t, "x.md".into()))
            })
            .collect()
    }

    #[test]
    fn test_node_entity_id() {
        let node = CanvasNode {
            id: Some("a1".into()),
            kind: Some("file".into()),
            file: Some("Projects/Agent/milestones/M-001.md".into()),
        };
        assert_eq!(node.entity_id().as_deref(), Some("M-001"));

        let text = CanvasNode {
            kind: Some("text".into()),
            file: Some("M-001.md".into()),
            ..Default::default()
        };
        assert_eq!(text.entity_id(), None);

        let readme = CanvasNode {
            kind: Some("file".into()),
            file: Some("docs/README.md".into()),
            ..Default::default()
        };
        assert_eq!(readme.entity_id(), None);

        let no_file = CanvasNode {
            kind: Some("file".into()),
            ..Default::default()
        };
        assert_eq!(no_file.entity_id(), None);
    }

    #[test]
    fn test_dangling_node_is_warning() {
        let json = r#"{
            "nodes": [
                {"id": "n1", "type": "file", "file": "milestones/M-001.md", "x": 0, "y": 0},
                {"id": "n2", "type": "file", "file": "tasks/T-404.md"},
                {"id": "n3", "type": "text", "text": "T-500"},
                {"id": "n4", "type": "file", "file": "attachments/diagram.png"}
            ],
            "edges": [{"id": "e1", "fromNode": "n1", "toNode": "n2"}]
        }"#;
        let path = Path::new("board.canvas");
        let findings = check_canvas(json, path, &records(&["M-001"]));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].entity_id, "T-404");
        assert_eq!(findings[0].field, FindingField::CanvasNode);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].source, path);
    }

    #[test]
    fn test_edges_are_not_validated() {
        let json = r#"{"nodes": [], "edges": [{"fromNode": "ghost", "toNode": "M-999"}]}"#;
        let findings = check_canvas(json, Path::new("c.canvas"), &records(&[]));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let findings = check_canvas("{}", Path::new("c.canvas"), &records(&[]));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unparsable_canvas_is_single_error() {
        let findings = check_canvas("{not json", Path::new("c.canvas"), &records(&[]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].entity_id, CANVAS_ENTITY);
        assert_eq!(findings[0].field, FindingField::File);
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings[0].message.starts_with("Failed to load canvas:"));
    }

    #[test]
    fn test_missing_canvas_file_is_single_error() {
        let vault = TestVault::new();
        let path = vault.path().join("missing.canvas");
        let findings = check_canvas_file(&path, &records(&[]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].entity_id, "canvas");
        assert_eq!(findings[0].source, path);
    }

    #[test]
    fn test_canvas_file_on_disk() {
        let vault = TestVault::new();
        let path = vault.write(
            "board.canvas",
            r#"{"nodes": [{"id": "n1", "type": "file", "file": "decisions/DEC-001.md"}]}"#,
        );
        assert!(check_canvas_file(&path, &records(&["DEC-001"])).is_empty());
        assert_eq!(check_canvas_file(&path, &records(&[])).len(), 1);
    }
}
