//! `forge` crate — the Flow Forge workflow graph editor core.
//!
//! Pieces, leaves first:
//! - [`models`]: nodes, edges, workflow, canvas geometry.
//! - [`store`]: the [`GraphStore`], sole owner of the graph; every mutation goes through it.
//! - [`canvas`]: screen <-> canvas coordinate transform (pan + zoom).
//! - [`placement`] / [`connection`]: turn drop and port-drag gestures into store mutations.
//! - [`scene`]: pure rendering of the graph into a hit-testable scene.
//! - [`serializer`]: workflow <-> transport definition, fail-soft on load.
//! - [`dag`]: advisory pre-flight check (dangling edges, cycles, execution order).
//! - [`service`] / [`editor`]: the remote workflow service boundary and the
//!   editor session that ties everything together.

pub mod models;
pub mod error;
pub mod store;
pub mod canvas;
pub mod placement;
pub mod connection;
pub mod scene;
pub mod serializer;
pub mod dag;
pub mod service;
pub mod editor;
pub mod mock;

pub use models::{Edge, EdgeId, Node, NodeId, Position, Viewport, Workflow};
pub use error::{ForgeError, ServiceError};
pub use store::{ConnectionPolicy, GraphStore};
pub use canvas::CanvasTransform;
pub use placement::{place, DropPayload};
pub use connection::{ConnectionController, ConnectionOutcome, PortRef, PortSide};
pub use scene::{render, Hit, Scene};
pub use serializer::{deserialize, serialize, Definition, LoadReport};
pub use dag::validate_dag;
pub use service::{SaveRequest, SavedWorkflow, Trigger, WorkflowRef, WorkflowService};
pub use editor::{Editor, Notification, PendingSave};

#[cfg(test)]
mod scenario_tests;
