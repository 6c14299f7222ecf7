//! Connection controller: drag from an output port to an input port -> new edge.
//!
//! ```text
//!            down(output)            up(input) ── add_edge ──> Connected | Rejected
//!   Idle ───────────────────> Dragging
//!    ^                          │  up(empty / output) ──────> Discarded
//!    └──────────────────────────┘  cancel()
//! ```
//!
//! Nothing touches the store until pointer-up over an input port, so an
//! interrupted gesture can never leave a partial edge behind.

use tracing::debug;

use crate::models::{Edge, NodeId, Position};
use crate::store::GraphStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSide {
    Input,
    Output,
}

/// One port of one node. Ports are untyped: any output may feed any input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub side: PortSide,
}

impl PortRef {
    pub fn input(node: NodeId) -> Self {
        Self { node, side: PortSide::Input }
    }

    pub fn output(node: NodeId) -> Self {
        Self { node, side: PortSide::Output }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    /// A transient edge follows the pointer (screen space).
    Dragging { source: NodeId, pointer: Position },
}

/// The not-yet-committed edge drawn while dragging.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientEdge {
    pub source: NodeId,
    pub pointer: Position,
}

/// How a pointer-up resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionOutcome {
    /// The store accepted the edge.
    Connected(Edge),
    /// Dropped on an input port, but the store refused the edge.
    Rejected,
    /// Dropped somewhere that isn't an input port.
    Discarded,
    /// No gesture was in progress.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionController {
    state: ConnectionState,
}

impl ConnectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ConnectionState::Dragging { .. })
    }

    /// Pointer pressed on `port`. Only output ports start a connection; a
    /// press while already dragging restarts from the new port.
    ///
    /// Returns whether a drag is now in progress from `port`.
    pub fn pointer_down(&mut self, port: &PortRef, at: Position) -> bool {
        if port.side != PortSide::Output {
            return false;
        }
        debug!("connection drag started from '{}'", port.node);
        self.state = ConnectionState::Dragging {
            source: port.node.clone(),
            pointer: at,
        };
        true
    }

    pub fn pointer_move(&mut self, at: Position) {
        if let ConnectionState::Dragging { pointer, .. } = &mut self.state {
            *pointer = at;
        }
    }

    /// Pointer released over `over` (`None` = empty canvas). Always ends Idle.
    pub fn pointer_up(&mut self, store: &mut GraphStore, over: Option<&PortRef>) -> ConnectionOutcome {
        let ConnectionState::Dragging { source, .. } = std::mem::take(&mut self.state) else {
            return ConnectionOutcome::Ignored;
        };

        match over {
            Some(PortRef { node, side: PortSide::Input }) => match store.add_edge(&source, node) {
                Some(edge) => ConnectionOutcome::Connected(edge),
                None => {
                    debug!("connection {source} -> {node} rejected");
                    ConnectionOutcome::Rejected
                }
            },
            _ => {
                debug!("connection drag from '{source}' discarded");
                ConnectionOutcome::Discarded
            }
        }
    }

    /// Abandon any gesture in progress (e.g. pointer capture lost).
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("connection drag cancelled");
        }
        self.state = ConnectionState::Idle;
    }

    pub fn transient(&self) -> Option<TransientEdge> {
        match &self.state {
            ConnectionState::Idle => None,
            ConnectionState::Dragging { source, pointer } => Some(TransientEdge {
                source: source.clone(),
                pointer: *pointer,
            }),
        }
    }
}
