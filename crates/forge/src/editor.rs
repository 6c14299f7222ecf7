//! The editor session: one open workflow, its viewport and gesture state.
//!
//! `Editor` is the single owner of the graph store for as long as the editor
//! is open. Every input event is routed to the placement or connection
//! controller (or to a node drag) after hit-testing against the rendered
//! scene. Remote calls are split into a synchronous begin/finish pair so the
//! graph stays editable while a request is in flight:
//!
//! ```text
//! let pending = editor.begin_save()?;                  // snapshot now
//! let result = service.save(&pending.request).await;  // edits may continue meanwhile
//! editor.finish_save(pending, result);                // notification only, graph untouched
//! ```

use catalog::Catalog;
use tracing::{debug, error, info};

use crate::canvas::CanvasTransform;
use crate::connection::{ConnectionController, ConnectionOutcome};
use crate::error::{ForgeError, ServiceError};
use crate::models::{EdgeId, Node, NodeId, Position, Workflow};
use crate::placement::{place, DropPayload};
use crate::scene::{render, Hit, Scene};
use crate::serializer::{self, LoadReport};
use crate::service::{SaveRequest, SavedWorkflow, Trigger, WorkflowRef};
use crate::store::GraphStore;

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A non-blocking, user-visible message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Warning(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Pending save
// ---------------------------------------------------------------------------

/// A save that has been snapshotted but not yet acknowledged.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    ticket: u64,
    revision: u64,
    pub request: SaveRequest,
}

impl PendingSave {
    /// Store revision the request was taken from.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct NodeDrag {
    node: NodeId,
    /// Pointer position relative to the node origin, canvas space.
    grab: Position,
}

#[derive(Debug)]
pub struct Editor {
    store: GraphStore,
    catalog: Catalog,
    transform: CanvasTransform,
    connection: ConnectionController,
    node_drag: Option<NodeDrag>,
    trigger: Trigger,
    notifications: Vec<Notification>,
    saved_id: Option<WorkflowRef>,
    saved_revision: Option<u64>,
    next_ticket: u64,
    acked_ticket: Option<u64>,
}

impl Editor {
    /// A fresh, empty, unsaved workflow.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_store(catalog, GraphStore::default())
    }

    pub fn with_store(catalog: Catalog, store: GraphStore) -> Self {
        let mut transform = CanvasTransform::default();
        if let Some(viewport) = store.workflow().viewport {
            transform.viewport = viewport;
        }
        Self {
            store,
            catalog,
            transform,
            connection: ConnectionController::new(),
            node_drag: None,
            trigger: Trigger::default(),
            notifications: Vec::new(),
            saved_id: None,
            saved_revision: None,
            next_ticket: 0,
            acked_ticket: None,
        }
    }

    /// Open a workflow fetched from the service.
    ///
    /// Loading is fail-soft; if anything had to be skipped a warning
    /// notification is queued and the report says what.
    pub fn open(catalog: Catalog, saved: &SavedWorkflow) -> (Self, LoadReport) {
        let (workflow, report) = serializer::from_json_str(&saved.definition, &saved.name);
        let mut editor = Self::with_store(catalog, GraphStore::from_workflow(workflow));
        editor.trigger = Trigger::from_wire(&saved.trigger_type, &saved.cron_sched);
        editor.saved_id = Some(saved.id.clone());
        editor.saved_revision = Some(editor.store.revision());

        if !report.is_clean() {
            editor.notify(Notification::Warning(format!(
                "Workflow loaded partially: {} node(s) and {} edge(s) skipped",
                report.skipped_nodes, report.skipped_edges
            )));
        }
        info!(
            "opened workflow {} ({} nodes, {} edges)",
            saved.id,
            editor.store.nodes().len(),
            editor.store.edges().len()
        );
        (editor, report)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn workflow(&self) -> &Workflow {
        self.store.workflow()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn transform(&self) -> &CanvasTransform {
        &self.transform
    }

    pub fn connection(&self) -> &ConnectionController {
        &self.connection
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn saved_id(&self) -> Option<&WorkflowRef> {
        self.saved_id.as_ref()
    }

    /// True if the graph changed since the last acknowledged save (or was
    /// never saved).
    pub fn is_dirty(&self) -> bool {
        self.saved_revision != Some(self.store.revision())
    }

    pub fn render(&self) -> Scene {
        render(
            self.store.workflow(),
            &self.catalog,
            &self.transform,
            self.connection.transient().as_ref(),
        )
    }

    // -----------------------------------------------------------------------
    // Host wiring
    // -----------------------------------------------------------------------

    /// Screen position of the canvas element's top-left corner.
    pub fn set_canvas_origin(&mut self, origin: Position) {
        self.transform.origin = origin;
    }

    /// Swap in a freshly fetched catalog. Existing nodes are kept even if
    /// their type disappeared; they render with the fallback appearance.
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn set_trigger(&mut self, trigger: Trigger) {
        self.trigger = trigger;
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    /// A palette entry was dropped at `screen`.
    pub fn drop_primitive(&mut self, payload: &DropPayload, screen: Position) -> Option<Node> {
        place(&mut self.store, &self.catalog, &self.transform, payload, screen)
    }

    /// Pointer pressed. Starts a connection drag on an output port or a move
    /// on a node body. Returns what was hit.
    pub fn pointer_down(&mut self, screen: Position) -> Hit {
        self.pointer_cancel();
        let hit = self.render().hit_test(screen);

        match &hit {
            Hit::Port(port) => {
                self.connection.pointer_down(port, screen);
            }
            Hit::Node(id) => {
                let grab = self
                    .store
                    .node(id)
                    .zip(self.transform.screen_to_canvas(screen))
                    .map(|(node, at)| Position::new(at.x - node.position.x, at.y - node.position.y));
                if let Some(grab) = grab {
                    self.node_drag = Some(NodeDrag { node: id.clone(), grab });
                }
            }
            Hit::Empty => {}
        }
        hit
    }

    pub fn pointer_move(&mut self, screen: Position) {
        if self.connection.is_dragging() {
            self.connection.pointer_move(screen);
            return;
        }
        if let Some(drag) = &self.node_drag {
            if let Some(at) = self.transform.screen_to_canvas(screen) {
                self.store
                    .move_node(&drag.node, Position::new(at.x - drag.grab.x, at.y - drag.grab.y));
            }
        }
    }

    /// Pointer released. Returns the connection outcome if a connection drag
    /// was in progress.
    pub fn pointer_up(&mut self, screen: Position) -> Option<ConnectionOutcome> {
        self.node_drag = None;
        if !self.connection.is_dragging() {
            return None;
        }
        let over = match self.render().hit_test(screen) {
            Hit::Port(port) => Some(port),
            _ => None,
        };
        Some(self.connection.pointer_up(&mut self.store, over.as_ref()))
    }

    /// Gesture interrupted (pointer capture lost, escape, window blur).
    pub fn pointer_cancel(&mut self) {
        self.connection.cancel();
        self.node_drag = None;
    }

    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        self.store.remove_node(id).is_some()
    }

    pub fn delete_edge(&mut self, id: &EdgeId) -> bool {
        self.store.remove_edge(id).is_some()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.store.rename(name);
    }

    pub fn relabel(&mut self, id: &NodeId, label: impl Into<String>) -> bool {
        self.store.relabel(id, label)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform.pan_by(dx, dy);
        self.store.set_viewport(self.transform.viewport);
    }

    pub fn zoom_at(&mut self, anchor: Position, factor: f64) {
        self.transform.zoom_at(anchor, factor);
        self.store.set_viewport(self.transform.viewport);
    }

    // -----------------------------------------------------------------------
    // Save / execute
    // -----------------------------------------------------------------------

    /// Snapshot the workflow as it is now into a save request.
    pub fn begin_save(&mut self) -> Result<PendingSave, ForgeError> {
        let request = SaveRequest::for_workflow(self.store.workflow(), &self.trigger)?;
        let pending = PendingSave {
            ticket: self.next_ticket,
            revision: self.store.revision(),
            request,
        };
        self.next_ticket += 1;
        debug!("save #{} started at revision {}", pending.ticket, pending.revision);
        Ok(pending)
    }

    /// Apply the service's answer to a save.
    ///
    /// Never touches the graph. A success older than one already recorded
    /// only produces its notification.
    pub fn finish_save(&mut self, pending: PendingSave, result: Result<SavedWorkflow, ServiceError>) {
        match result {
            Ok(saved) => {
                if self.acked_ticket.map_or(true, |acked| pending.ticket > acked) {
                    info!("workflow saved as {} (revision {})", saved.id, pending.revision);
                    self.acked_ticket = Some(pending.ticket);
                    self.saved_id = Some(saved.id);
                    self.saved_revision = Some(pending.revision);
                } else {
                    debug!("ignoring stale acknowledgement for save #{}", pending.ticket);
                }
                self.notify(Notification::Success("Workflow Saved & Compiled".into()));
            }
            Err(e) => {
                error!("save #{} failed: {e}", pending.ticket);
                self.notify(Notification::Error(format!("Failed to commit workflow: {e}")));
            }
        }
    }

    /// The id to execute, or `None` (with an error notification) if the
    /// workflow has never been saved.
    pub fn execution_target(&mut self) -> Option<WorkflowRef> {
        if self.saved_id.is_none() {
            self.notify(Notification::Error("Save the workflow before executing it".into()));
        }
        self.saved_id.clone()
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
