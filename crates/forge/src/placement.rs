//! Placement controller: palette drag + canvas drop -> new node.

use catalog::Catalog;
use tracing::debug;

use crate::canvas::CanvasTransform;
use crate::models::{Node, Position};
use crate::store::GraphStore;

/// What a palette drag carries to the drop site.
///
/// An explicit message instead of an ambient drag channel: whoever starts
/// the drag builds one, whoever handles the drop passes it to [`place`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropPayload {
    primitive: Option<String>,
}

impl DropPayload {
    pub fn primitive(type_id: impl Into<String>) -> Self {
        Self {
            primitive: Some(type_id.into()),
        }
    }

    /// A drop that carries nothing recognisable (a file, text from elsewhere...).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The carried type identifier, if it is non-blank.
    pub fn type_id(&self) -> Option<&str> {
        self.primitive
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl From<Option<String>> for DropPayload {
    fn from(primitive: Option<String>) -> Self {
        Self { primitive }
    }
}

/// Handle a drop at screen point `screen`.
///
/// Returns the new node, or `None` when the gesture is discarded: no usable
/// payload, a type the catalog doesn't offer, or an unusable transform.
/// Discards are silent by design of the gesture, so they are only logged.
pub fn place(
    store: &mut GraphStore,
    catalog: &Catalog,
    transform: &CanvasTransform,
    payload: &DropPayload,
    screen: Position,
) -> Option<Node> {
    let Some(type_id) = payload.type_id() else {
        debug!("drop without a primitive payload discarded");
        return None;
    };
    if !catalog.contains(type_id) {
        debug!("drop of unknown primitive '{type_id}' discarded");
        return None;
    }
    let Some(position) = transform.screen_to_canvas(screen) else {
        debug!("drop at {screen:?} discarded: canvas transform unusable");
        return None;
    };

    Some(store.add_node(type_id, position))
}
