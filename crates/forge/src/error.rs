//! Forge-level error types.
//!
//! Rejected gestures (an edge to a missing node, a drop without a payload) are
//! not errors: they come back as `None` or an outcome variant. What lives here
//! is what a caller genuinely has to handle.

use thiserror::Error;

use crate::models::{EdgeId, NodeId};

/// Errors produced by graph validation and encoding.
#[derive(Debug, Error)]
pub enum ForgeError {
    // ------ Validation errors ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(NodeId),

    /// An edge references a node ID that doesn't exist in the workflow.
    #[error("edge '{edge_id}' references unknown node '{node_id}' ({side} side)")]
    DanglingEdge {
        edge_id: EdgeId,
        node_id: NodeId,
        side: &'static str,
    },

    /// Topological sort detected a cycle.
    #[error("workflow graph contains a cycle")]
    CycleDetected,

    // ------ Encoding errors ------

    #[error("failed to encode workflow definition: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors surfaced by a [`WorkflowService`](crate::service::WorkflowService).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    /// The request never got an answer (connection refused, timeout, ...).
    #[error("workflow service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("workflow service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service answered, but the body could not be decoded.
    #[error("unexpected workflow service response: {0}")]
    Decode(String),
}
