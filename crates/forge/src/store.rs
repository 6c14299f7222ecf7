//! The graph store: sole owner of node and edge state.
//!
//! Everything else reads the workflow through [`GraphStore::workflow`] and
//! requests changes through the mutation methods below. Invariants held after
//! every call:
//! 1. Node IDs are unique.
//! 2. Every edge's `source` and `target` reference a node in the store.
//! 3. The connection policy has been applied to every edge created here.

use std::collections::HashSet;

use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::models::{Edge, EdgeId, Node, NodeId, Position, Viewport, Workflow};

// ---------------------------------------------------------------------------
// Connection policy
// ---------------------------------------------------------------------------

/// Which structurally valid edges `add_edge` still refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionPolicy {
    /// Allow `source == target`.
    pub allow_self_loops: bool,
    /// Allow more than one edge between the same ordered pair.
    pub allow_parallel_edges: bool,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            allow_self_loops: false,
            allow_parallel_edges: true,
        }
    }
}

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GraphStore {
    workflow: Workflow,
    policy: ConnectionPolicy,
    /// Bumped by every effective node/edge/name mutation.
    revision: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::from_workflow(Workflow::default())
    }
}

impl GraphStore {
    /// An empty store for a new workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_workflow(Workflow::new(name))
    }

    /// Take ownership of an existing workflow.
    ///
    /// Nodes with a duplicate ID and edges with a missing endpoint are dropped
    /// so the store invariants hold from the start.
    pub fn from_workflow(mut workflow: Workflow) -> Self {
        let mut seen: HashSet<NodeId> = HashSet::new();
        workflow.nodes.retain(|node| {
            let fresh = seen.insert(node.id.clone());
            if !fresh {
                warn!("dropping node with duplicate id '{}'", node.id);
            }
            fresh
        });
        workflow.edges.retain(|edge| {
            let ok = seen.contains(&edge.source) && seen.contains(&edge.target);
            if !ok {
                warn!("dropping edge '{}' with a missing endpoint", edge.id);
            }
            ok
        });

        Self {
            workflow,
            policy: ConnectionPolicy::default(),
            revision: 0,
        }
    }

    pub fn with_policy(mut self, policy: ConnectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn into_workflow(self) -> Workflow {
        self.workflow
    }

    pub fn name(&self) -> &str {
        &self.workflow.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.workflow.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.workflow.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.workflow.node(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.workflow.edge(id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append a node of type `primitive` at canvas `position`.
    ///
    /// Always succeeds. The type is not checked against the catalog here; the
    /// placement controller does that before calling.
    pub fn add_node(&mut self, primitive: impl Into<String>, position: Position) -> Node {
        let position = if position.is_finite() {
            position
        } else {
            warn!("non-finite node position {position:?}, placing at origin");
            Position::ORIGIN
        };

        let node = Node::new(self.fresh_node_id(), primitive, position);
        debug!("add node '{}' ({}) at {:?}", node.id, node.primitive, node.position);
        self.workflow.nodes.push(node.clone());
        self.touch();
        node
    }

    /// Move a node. Unknown IDs and non-finite positions are ignored.
    ///
    /// Returns whether a node moved.
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> bool {
        if !position.is_finite() {
            trace!("ignoring non-finite move of '{id}'");
            return false;
        }
        let Some(node) = self.workflow.nodes.iter_mut().find(|n| &n.id == id) else {
            trace!("ignoring move of unknown node '{id}'");
            return false;
        };
        if node.position == position {
            return false;
        }
        node.position = position;
        self.touch();
        true
    }

    /// Change a node's display label. Unknown IDs are ignored.
    ///
    /// Returns whether the label changed.
    pub fn relabel(&mut self, id: &NodeId, label: impl Into<String>) -> bool {
        let Some(node) = self.workflow.nodes.iter_mut().find(|n| &n.id == id) else {
            trace!("ignoring relabel of unknown node '{id}'");
            return false;
        };
        let label = label.into();
        if node.label == label {
            return false;
        }
        node.label = label;
        self.touch();
        true
    }

    /// Remove a node together with every edge that touches it.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        let index = self.workflow.nodes.iter().position(|n| &n.id == id)?;
        let node = self.workflow.nodes.remove(index);

        let before = self.workflow.edges.len();
        self.workflow.edges.retain(|edge| !edge.touches(id));
        debug!(
            "removed node '{id}' and {} attached edge(s)",
            before - self.workflow.edges.len()
        );

        self.touch();
        Some(node)
    }

    /// Connect `source` to `target`.
    ///
    /// Returns `None` when either endpoint is missing or the connection
    /// policy refuses the pair; the edge set is left untouched in that case.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> Option<Edge> {
        if !self.workflow.contains_node(source) || !self.workflow.contains_node(target) {
            trace!("rejecting edge {source} -> {target}: missing endpoint");
            return None;
        }
        if source == target && !self.policy.allow_self_loops {
            trace!("rejecting self-loop on '{source}'");
            return None;
        }
        if !self.policy.allow_parallel_edges
            && self
                .workflow
                .edges
                .iter()
                .any(|e| &e.source == source && &e.target == target)
        {
            trace!("rejecting parallel edge {source} -> {target}");
            return None;
        }

        let edge = Edge {
            id: self.fresh_edge_id(),
            source: source.clone(),
            target: target.clone(),
        };
        debug!("add edge '{}' {} -> {}", edge.id, edge.source, edge.target);
        self.workflow.edges.push(edge.clone());
        self.touch();
        Some(edge)
    }

    /// Remove an edge if present.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let index = self.workflow.edges.iter().position(|e| &e.id == id)?;
        let edge = self.workflow.edges.remove(index);
        debug!("removed edge '{id}'");
        self.touch();
        Some(edge)
    }

    /// Replace the workflow name.
    pub fn rename(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.workflow.name != name {
            debug!("rename workflow to '{name}'");
            self.workflow.name = name;
            self.touch();
        }
    }

    /// Record the current pan/zoom. Does not count as an edit.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport.is_valid() {
            self.workflow.viewport = Some(viewport);
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn fresh_node_id(&self) -> NodeId {
        loop {
            let id = NodeId::new(format!("node_{}", Uuid::new_v4().simple()));
            if !self.workflow.contains_node(&id) {
                return id;
            }
        }
    }

    fn fresh_edge_id(&self) -> EdgeId {
        loop {
            let id = EdgeId::new(format!("edge_{}", Uuid::new_v4().simple()));
            if self.workflow.edge(&id).is_none() {
                return id;
            }
        }
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_two_nodes() -> (GraphStore, NodeId, NodeId) {
        let mut store = GraphStore::default();
        let a = store.add_node("CronTrigger", Position::new(0.0, 0.0)).id;
        let b = store.add_node("SecurityGuardian", Position::new(100.0, 0.0)).id;
        (store, a, b)
    }

    #[test]
    fn new_node_gets_a_fresh_id_and_type_as_label() {
        let mut store = GraphStore::new("flow");
        let a = store.add_node("SuperCompute", Position::new(5.0, 6.0));
        let b = store.add_node("SuperCompute", Position::new(5.0, 6.0));

        assert_ne!(a.id, b.id);
        assert_eq!(a.label, "SuperCompute");
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.node(&a.id).unwrap().position, Position::new(5.0, 6.0));
    }

    #[test]
    fn move_of_unknown_node_changes_nothing() {
        let (mut store, a, _) = store_with_two_nodes();
        let before = store.workflow().clone();
        let revision = store.revision();

        assert!(!store.move_node(&NodeId::from("ghost"), Position::new(9.0, 9.0)));
        assert_eq!(store.workflow(), &before);
        assert_eq!(store.revision(), revision);

        assert!(store.move_node(&a, Position::new(9.0, 9.0)));
        assert_eq!(store.node(&a).unwrap().position, Position::new(9.0, 9.0));
    }

    #[test]
    fn non_finite_move_is_ignored() {
        let (mut store, a, _) = store_with_two_nodes();
        assert!(!store.move_node(&a, Position::new(f64::NAN, 1.0)));
        assert_eq!(store.node(&a).unwrap().position, Position::ORIGIN);
    }

    #[test]
    fn edge_to_missing_node_is_rejected() {
        let (mut store, a, _) = store_with_two_nodes();
        let revision = store.revision();

        assert!(store.add_edge(&a, &NodeId::from("ghost")).is_none());
        assert!(store.add_edge(&NodeId::from("missing-1"), &NodeId::from("missing-2")).is_none());
        assert!(store.edges().is_empty());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn self_loops_are_rejected_by_default() {
        let (mut store, a, _) = store_with_two_nodes();
        assert!(store.add_edge(&a, &a).is_none());

        let mut permissive = store.with_policy(ConnectionPolicy {
            allow_self_loops: true,
            allow_parallel_edges: true,
        });
        assert!(permissive.add_edge(&a, &a).unwrap().is_self_loop());
    }

    #[test]
    fn parallel_edges_follow_the_policy() {
        let (mut store, a, b) = store_with_two_nodes();
        let first = store.add_edge(&a, &b).unwrap();
        let second = store.add_edge(&a, &b).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.edges().len(), 2);

        let mut strict = GraphStore::default().with_policy(ConnectionPolicy {
            allow_self_loops: false,
            allow_parallel_edges: false,
        });
        let x = strict.add_node("CronTrigger", Position::ORIGIN).id;
        let y = strict.add_node("SuperCompute", Position::ORIGIN).id;
        assert!(strict.add_edge(&x, &y).is_some());
        assert!(strict.add_edge(&x, &y).is_none());
        // The reverse direction is a different pair.
        assert!(strict.add_edge(&y, &x).is_some());
    }

    #[test]
    fn removing_a_node_cascades_to_its_edges() {
        let (mut store, a, b) = store_with_two_nodes();
        let c = store.add_node("NetworkManager", Position::ORIGIN).id;
        store.add_edge(&a, &b).unwrap();
        store.add_edge(&b, &c).unwrap();
        let kept = store.add_edge(&a, &c).unwrap();

        let removed = store.remove_node(&b).unwrap();
        assert_eq!(removed.id, b);
        assert_eq!(store.edges(), &[kept]);
        assert!(store.remove_node(&b).is_none());
    }

    #[test]
    fn remove_edge_is_a_no_op_for_unknown_ids() {
        let (mut store, a, b) = store_with_two_nodes();
        let edge = store.add_edge(&a, &b).unwrap();

        assert!(store.remove_edge(&EdgeId::from("nope")).is_none());
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.remove_edge(&edge.id), Some(edge));
        assert!(store.edges().is_empty());
    }

    #[test]
    fn revision_tracks_effective_mutations_only() {
        let mut store = GraphStore::new("r");
        assert_eq!(store.revision(), 0);

        store.rename("r");
        assert_eq!(store.revision(), 0);
        store.rename("renamed");
        assert_eq!(store.revision(), 1);
        assert_eq!(store.name(), "renamed");

        store.set_viewport(Viewport { x: 10.0, y: 0.0, zoom: 2.0 });
        assert_eq!(store.revision(), 1);
        assert_eq!(store.workflow().viewport.unwrap().zoom, 2.0);
    }

    #[test]
    fn relabel_to_the_same_text_is_not_an_edit() {
        let (mut store, a, _) = store_with_two_nodes();
        let revision = store.revision();

        assert!(!store.relabel(&a, "CronTrigger"));
        assert_eq!(store.revision(), revision);

        assert!(store.relabel(&a, "Every night"));
        assert_eq!(store.revision(), revision + 1);
        assert!(!store.relabel(&NodeId::from("ghost"), "x"));
    }

    #[test]
    fn from_workflow_repairs_broken_graphs() {
        let mut wf = Workflow::new("loaded");
        wf.nodes.push(Node::new("a".into(), "CronTrigger", Position::ORIGIN));
        wf.nodes.push(Node::new("a".into(), "SuperCompute", Position::ORIGIN));
        wf.nodes.push(Node::new("b".into(), "SuperCompute", Position::ORIGIN));
        wf.edges.push(Edge { id: "e1".into(), source: "a".into(), target: "b".into() });
        wf.edges.push(Edge { id: "e2".into(), source: "a".into(), target: "ghost".into() });

        let store = GraphStore::from_workflow(wf);
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.node(&"a".into()).unwrap().primitive, "CronTrigger");
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.edges()[0].id, EdgeId::from("e1"));
    }
}
