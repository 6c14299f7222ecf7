//! Workflow <-> transport definition.
//!
//! The definition keeps the shape stored by the dashboard, so definitions
//! saved by earlier versions load unchanged:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "node_1", "type": "custom", "position": { "x": 0, "y": 0 },
//!               "data": { "label": "CronTrigger", "type": "CronTrigger" } }],
//!   "edges": [{ "id": "edge_1", "source": "node_1", "target": "node_2", "animated": true }],
//!   "viewport": { "x": 0, "y": 0, "zoom": 1 }
//! }
//! ```
//!
//! Serialization is pure. Loading is fail-soft: anything malformed is skipped
//! and counted in a [`LoadReport`], the rest still loads. A node type is
//! never checked, so a blank or unknown type loads like any other and is
//! drawn with the fallback appearance.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ForgeError;
use crate::models::{Edge, EdgeId, Node, NodeId, Position, Viewport, Workflow, DEFAULT_WORKFLOW_NAME};

/// Renderer component type every node is stored with.
pub const NODE_RENDER_TYPE: &str = "custom";

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type", default = "default_render_type")]
    pub render_type: String,
    pub position: Position,
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub primitive: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default = "default_animated")]
    pub animated: bool,
}

fn default_render_type() -> String {
    NODE_RENDER_TYPE.to_owned()
}

fn default_animated() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Serialize
// ---------------------------------------------------------------------------

pub fn serialize(workflow: &Workflow) -> Definition {
    Definition {
        nodes: workflow
            .nodes
            .iter()
            .map(|node| NodeRecord {
                id: node.id.clone(),
                render_type: default_render_type(),
                position: node.position,
                data: NodeData {
                    label: Some(node.label.clone()),
                    primitive: node.primitive.clone(),
                },
            })
            .collect(),
        edges: workflow
            .edges
            .iter()
            .map(|edge| EdgeRecord {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                animated: true,
            })
            .collect(),
        viewport: workflow.viewport,
    }
}

/// JSON text of [`serialize`], as embedded in a save request.
pub fn to_json_string(workflow: &Workflow) -> Result<String, ForgeError> {
    Ok(serde_json::to_string(&serialize(workflow))?)
}

// ---------------------------------------------------------------------------
// Deserialize
// ---------------------------------------------------------------------------

/// What a fail-soft load had to leave out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub skipped_nodes: usize,
    pub skipped_edges: usize,
    pub invalid_viewport: bool,
    /// The input was not a JSON object at all.
    pub invalid_document: bool,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Rebuild a workflow (named [`DEFAULT_WORKFLOW_NAME`]) from a definition.
pub fn deserialize(definition: &Value) -> (Workflow, LoadReport) {
    deserialize_named(definition, DEFAULT_WORKFLOW_NAME)
}

pub fn deserialize_named(definition: &Value, name: &str) -> (Workflow, LoadReport) {
    let mut workflow = Workflow::new(name);
    let mut report = LoadReport::default();

    let Some(doc) = definition.as_object() else {
        warn!("workflow definition is not a JSON object, loading an empty workflow");
        report.invalid_document = true;
        return (workflow, report);
    };

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------
    let mut node_ids: HashSet<NodeId> = HashSet::new();
    for item in section(doc.get("nodes"), "nodes", &mut report.skipped_nodes) {
        let record = match NodeRecord::deserialize(item) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping malformed node: {e}");
                report.skipped_nodes += 1;
                continue;
            }
        };
        if !node_ids.insert(record.id.clone()) {
            warn!("skipping node with duplicate id '{}'", record.id);
            report.skipped_nodes += 1;
            continue;
        }

        let NodeData { label, primitive } = record.data;
        workflow.nodes.push(Node {
            id: record.id,
            label: label.unwrap_or_else(|| primitive.clone()),
            primitive,
            position: record.position,
        });
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------
    let mut edge_ids: HashSet<EdgeId> = HashSet::new();
    for item in section(doc.get("edges"), "edges", &mut report.skipped_edges) {
        let record = match EdgeRecord::deserialize(item) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping malformed edge: {e}");
                report.skipped_edges += 1;
                continue;
            }
        };
        if !node_ids.contains(&record.source) || !node_ids.contains(&record.target) {
            warn!("skipping edge '{}' with a missing endpoint", record.id);
            report.skipped_edges += 1;
            continue;
        }
        if !edge_ids.insert(record.id.clone()) {
            warn!("skipping edge with duplicate id '{}'", record.id);
            report.skipped_edges += 1;
            continue;
        }

        workflow.edges.push(Edge {
            id: record.id,
            source: record.source,
            target: record.target,
        });
    }

    // -----------------------------------------------------------------------
    // Viewport
    // -----------------------------------------------------------------------
    workflow.viewport = match doc.get("viewport") {
        None | Some(Value::Null) => None,
        Some(raw) => match Viewport::deserialize(raw) {
            Ok(viewport) if viewport.is_valid() => Some(viewport),
            _ => {
                warn!("ignoring malformed viewport: {raw}");
                report.invalid_viewport = true;
                None
            }
        },
    };

    (workflow, report)
}

/// Parse JSON text, then [`deserialize_named`]. Unparseable text loads as an
/// empty workflow with `invalid_document` set.
pub fn from_json_str(text: &str, name: &str) -> (Workflow, LoadReport) {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => deserialize_named(&value, name),
        Err(e) => {
            warn!("workflow definition is not valid JSON: {e}");
            let report = LoadReport {
                invalid_document: true,
                ..LoadReport::default()
            };
            (Workflow::new(name), report)
        }
    }
}

/// Items of an array section. A present but non-array section counts as one
/// skipped entry.
fn section<'a>(raw: Option<&'a Value>, what: &str, skipped: &mut usize) -> &'a [Value] {
    match raw {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!("'{what}' is not a list, ignoring: {other}");
            *skipped += 1;
            &[]
        }
    }
}
