//! Replays a recorded gesture script against an [`Editor`].
//!
//! Every step goes through the same pointer gestures a user would make:
//! a `connect` presses on the source's output port and releases over the
//! target's input port, a `move` drags the node body. Nodes are referred to
//! by the index of the `drop` step that created them, edges by the index of
//! the `connect` step.
//!
//! ```json
//! { "name": "nightly_scan",
//!   "steps": [
//!     { "op": "drop", "primitive": "CronTrigger", "x": 100, "y": 80 },
//!     { "op": "drop", "primitive": "SecurityGuardian", "x": 400, "y": 80 },
//!     { "op": "connect", "from": 0, "to": 1 },
//!     { "op": "zoom", "x": 0, "y": 0, "factor": 1.5 }
//!   ] }
//! ```

use anyhow::{bail, Result};
use forge::{ConnectionOutcome, DropPayload, EdgeId, Editor, Hit, NodeId, PortRef, Position};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Drop a palette entry at a screen position. A missing primitive is an
    /// empty drag payload.
    Drop {
        #[serde(default)]
        primitive: Option<String>,
        x: f64,
        y: f64,
    },
    /// Drag from `from`'s output port to `to`'s input port.
    Connect { from: usize, to: usize },
    /// Drag a node body by a screen-space offset.
    Move { node: usize, dx: f64, dy: f64 },
    DeleteNode { node: usize },
    DeleteEdge { edge: usize },
    Rename { name: String },
    Pan { dx: f64, dy: f64 },
    Zoom { x: f64, y: f64, factor: f64 },
}

/// What happened while replaying.
#[derive(Debug, Default, PartialEq)]
pub struct ReplayReport {
    pub applied: usize,
    /// One line per step that had no effect, with the reason.
    pub skipped: Vec<String>,
}

impl ReplayReport {
    fn skip(&mut self, index: usize, reason: String) {
        warn!("step {index} skipped: {reason}");
        self.skipped.push(format!("step {index}: {reason}"));
    }
}

#[derive(Default)]
struct Refs {
    nodes: Vec<Option<NodeId>>,
    edges: Vec<Option<EdgeId>>,
}

impl Refs {
    /// `Ok(None)` for a ref to something that was never created.
    fn node(&self, index: usize) -> Result<Option<&NodeId>> {
        match self.nodes.get(index) {
            Some(id) => Ok(id.as_ref()),
            None => bail!("node #{index} referenced before its drop step"),
        }
    }

    fn edge(&self, index: usize) -> Result<Option<&EdgeId>> {
        match self.edges.get(index) {
            Some(id) => Ok(id.as_ref()),
            None => bail!("edge #{index} referenced before its connect step"),
        }
    }
}

/// Run `script` against `editor`.
///
/// Steps the editor refuses are reported, not fatal. References to steps
/// that come later in the script are an error.
pub fn replay(editor: &mut Editor, script: &Script) -> Result<ReplayReport> {
    let mut refs = Refs::default();
    let mut report = ReplayReport::default();

    if let Some(name) = &script.name {
        editor.rename(name.clone());
    }

    for (index, step) in script.steps.iter().enumerate() {
        debug!("step {index}: {step:?}");
        let outcome: Result<(), String> = match step {
            Step::Drop { primitive, x, y } => {
                let payload = DropPayload::from(primitive.clone());
                let node = editor.drop_primitive(&payload, Position::new(*x, *y));
                let placed = node.is_some();
                refs.nodes.push(node.map(|n| n.id));
                if placed {
                    Ok(())
                } else {
                    Err(format!("drop of {primitive:?} was discarded"))
                }
            }
            Step::Connect { from, to } => {
                let source = refs.node(*from)?.cloned();
                let target = refs.node(*to)?.cloned();
                let edge = match (source, target) {
                    (Some(source), Some(target)) => connect(editor, &source, &target),
                    _ => Err("endpoint was never created".to_owned()),
                };
                refs.edges.push(edge.as_ref().ok().cloned());
                edge.map(|_| ())
            }
            Step::Move { node, dx, dy } => match refs.node(*node)?.cloned() {
                Some(id) => drag_node(editor, &id, *dx, *dy),
                None => Err("node was never created".to_owned()),
            },
            Step::DeleteNode { node } => match refs.node(*node)? {
                Some(id) if editor.delete_node(id) => Ok(()),
                _ => Err("node does not exist".to_owned()),
            },
            Step::DeleteEdge { edge } => match refs.edge(*edge)? {
                Some(id) if editor.delete_edge(id) => Ok(()),
                _ => Err("edge does not exist".to_owned()),
            },
            Step::Rename { name } => {
                editor.rename(name.clone());
                Ok(())
            }
            Step::Pan { dx, dy } => {
                editor.pan(*dx, *dy);
                Ok(())
            }
            Step::Zoom { x, y, factor } => {
                editor.zoom_at(Position::new(*x, *y), *factor);
                Ok(())
            }
        };

        match outcome {
            Ok(()) => report.applied += 1,
            Err(reason) => report.skip(index, reason),
        }
    }

    Ok(report)
}

fn connect(editor: &mut Editor, source: &NodeId, target: &NodeId) -> Result<EdgeId, String> {
    let scene = editor.render();
    let (Some(from), Some(to)) = (scene.node(source), scene.node(target)) else {
        return Err("node does not exist".to_owned());
    };
    let (from, to) = (from.output_port, to.input_port);

    if editor.pointer_down(from) != Hit::Port(PortRef::output(source.clone())) {
        editor.pointer_cancel();
        return Err("source output port is covered".to_owned());
    }
    editor.pointer_move(to);
    match editor.pointer_up(to) {
        Some(ConnectionOutcome::Connected(edge)) => Ok(edge.id),
        Some(ConnectionOutcome::Rejected) => Err("edge refused by the graph".to_owned()),
        other => Err(format!("connection not made ({other:?})")),
    }
}

fn drag_node(editor: &mut Editor, id: &NodeId, dx: f64, dy: f64) -> Result<(), String> {
    let Some(grab) = editor.render().node(id).map(|n| n.rect.center()) else {
        return Err("node does not exist".to_owned());
    };
    if editor.pointer_down(grab) != Hit::Node(id.clone()) {
        editor.pointer_cancel();
        return Err("node body is covered".to_owned());
    }
    let release = grab.offset(dx, dy);
    editor.pointer_move(release);
    editor.pointer_up(release);
    Ok(())
}
