//! Pre-flight graph check, run before a workflow is handed to the engine.
//!
//! Checks, in order: node ids are unique, both ends of every edge exist, and
//! the edges form no cycle. On success the nodes come back in an order the
//! engine can run them in; nodes that become ready together keep their
//! creation order, so the result is stable.
//!
//! The editor never blocks on this. A store-built workflow always passes the
//! first two checks, and a cycle is only reported.

use std::collections::{HashMap, VecDeque};

use crate::{models::{NodeId, Workflow}, ForgeError};

/// Check `workflow` and return its node ids in execution order.
///
/// # Errors
/// - [`ForgeError::DuplicateNodeId`] for the first repeated id.
/// - [`ForgeError::DanglingEdge`] for the first edge with a missing endpoint.
/// - [`ForgeError::CycleDetected`] if some nodes can never become ready.
pub fn validate_dag(workflow: &Workflow) -> Result<Vec<NodeId>, ForgeError> {
    let mut index_of: HashMap<&NodeId, usize> = HashMap::with_capacity(workflow.nodes.len());
    for (i, node) in workflow.nodes.iter().enumerate() {
        if index_of.insert(&node.id, i).is_some() {
            return Err(ForgeError::DuplicateNodeId(node.id.clone()));
        }
    }

    let count = workflow.nodes.len();
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut pending_inputs: Vec<usize> = vec![0; count];

    for edge in &workflow.edges {
        let endpoint = |node_id: &NodeId, side: &'static str| {
            index_of.get(node_id).copied().ok_or_else(|| ForgeError::DanglingEdge {
                edge_id: edge.id.clone(),
                node_id: node_id.clone(),
                side,
            })
        };
        let from = endpoint(&edge.source, "source")?;
        let to = endpoint(&edge.target, "target")?;
        successors[from].push(to);
        pending_inputs[to] += 1;
    }

    // Kahn's algorithm, seeded in creation order.
    let mut ready: VecDeque<usize> = (0..count).filter(|&i| pending_inputs[i] == 0).collect();
    let mut order: Vec<NodeId> = Vec::with_capacity(count);

    while let Some(i) = ready.pop_front() {
        order.push(workflow.nodes[i].id.clone());
        for &next in &successors[i] {
            pending_inputs[next] -= 1;
            if pending_inputs[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() < count {
        return Err(ForgeError::CycleDetected);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, Node, Position};

    fn workflow(nodes: &[&str], edges: &[(&str, &str)]) -> Workflow {
        Workflow {
            nodes: nodes
                .iter()
                .map(|id| Node::new((*id).into(), "SuperCompute", Position::ORIGIN))
                .collect(),
            edges: edges
                .iter()
                .enumerate()
                .map(|(i, (from, to))| Edge {
                    id: format!("e{i}").into(),
                    source: (*from).into(),
                    target: (*to).into(),
                })
                .collect(),
            ..Workflow::new("check")
        }
    }

    fn order(wf: &Workflow) -> Vec<String> {
        validate_dag(wf)
            .expect("acyclic")
            .into_iter()
            .map(|id| id.as_str().to_owned())
            .collect()
    }

    #[test]
    fn chain_created_backwards_runs_forwards() {
        let wf = workflow(&["a", "b", "c"], &[("c", "b"), ("b", "a")]);
        assert_eq!(order(&wf), ["c", "b", "a"]);
    }

    #[test]
    fn fan_out_and_in() {
        let wf = workflow(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert_eq!(order(&wf), ["a", "b", "c", "d"]);
    }

    #[test]
    fn isolated_nodes_keep_creation_order() {
        assert_eq!(order(&workflow(&["z", "y", "x"], &[])), ["z", "y", "x"]);
    }

    #[test]
    fn repeated_id() {
        let err = validate_dag(&workflow(&["a", "a"], &[])).unwrap_err();
        assert!(matches!(err, ForgeError::DuplicateNodeId(id) if id.as_str() == "a"));
    }

    #[test]
    fn missing_target() {
        let err = validate_dag(&workflow(&["a"], &[("a", "ghost")])).unwrap_err();
        assert!(matches!(
            err,
            ForgeError::DanglingEdge { node_id, side: "target", .. } if node_id.as_str() == "ghost"
        ));
    }

    #[test]
    fn three_node_loop() {
        let wf = workflow(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        assert!(matches!(validate_dag(&wf), Err(ForgeError::CycleDetected)));
    }

    #[test]
    fn self_loop() {
        let wf = workflow(&["solo"], &[("solo", "solo")]);
        assert!(matches!(validate_dag(&wf), Err(ForgeError::CycleDetected)));
    }

    #[test]
    fn parallel_edges_count_once_each() {
        let wf = workflow(&["a", "b"], &[("a", "b"), ("a", "b")]);
        assert_eq!(order(&wf), ["a", "b"]);
    }
}
