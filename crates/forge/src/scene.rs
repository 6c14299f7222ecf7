//! View renderer: (workflow, viewport) -> screen-space scene.
//!
//! [`render`] is a pure function with no authority over the data. The scene
//! it returns is what the host draws, and what pointer events are hit-tested
//! against before being forwarded to the controllers.

use catalog::{Appearance, Catalog};

use crate::canvas::CanvasTransform;
use crate::connection::{PortRef, TransientEdge};
use crate::models::{EdgeId, NodeId, Position, Workflow};

/// Node body size in canvas units. Node positions are the top-left corner.
pub const NODE_WIDTH: f64 = 150.0;
pub const NODE_HEIGHT: f64 = 60.0;
/// Port hit radius in canvas units.
pub const PORT_RADIUS: f64 = 6.0;

pub const EDGE_STROKE: &str = "#6366f1";
pub const EDGE_STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub label: String,
    pub primitive: String,
    pub appearance: Appearance,
    /// Screen-space body.
    pub rect: Rect,
    pub input_port: Position,
    pub output_port: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    ArrowClosed,
}

/// A drawn connection. `id` is `None` for the transient edge.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEdge {
    pub id: Option<EdgeId>,
    pub from: Position,
    pub to: Position,
    pub animated: bool,
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub marker: Marker,
}

impl SceneEdge {
    fn styled(id: Option<EdgeId>, from: Position, to: Position) -> Self {
        Self {
            id,
            from,
            to,
            animated: true,
            stroke: EDGE_STROKE,
            stroke_width: EDGE_STROKE_WIDTH,
            marker: Marker::ArrowClosed,
        }
    }
}

/// What is under a screen point.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Port(PortRef),
    Node(NodeId),
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Draw order: later nodes are on top.
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
    pub transient: Option<SceneEdge>,
    /// Screen-space port radius at the current zoom.
    pub port_radius: f64,
}

impl Scene {
    pub fn node(&self, id: &NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Ports win over node bodies; among overlapping nodes the top-most wins.
    pub fn hit_test(&self, at: Position) -> Hit {
        for node in self.nodes.iter().rev() {
            if node.output_port.distance(at) <= self.port_radius {
                return Hit::Port(PortRef::output(node.id.clone()));
            }
            if node.input_port.distance(at) <= self.port_radius {
                return Hit::Port(PortRef::input(node.id.clone()));
            }
        }
        self.nodes
            .iter()
            .rev()
            .find(|node| node.rect.contains(at))
            .map(|node| Hit::Node(node.id.clone()))
            .unwrap_or(Hit::Empty)
    }
}

/// Render the workflow as seen through `transform`.
///
/// An unusable transform renders an empty scene.
pub fn render(
    workflow: &Workflow,
    catalog: &Catalog,
    transform: &CanvasTransform,
    transient: Option<&TransientEdge>,
) -> Scene {
    if !transform.is_valid() {
        return Scene::default();
    }

    let width = transform.scale(NODE_WIDTH);
    let height = transform.scale(NODE_HEIGHT);

    let nodes: Vec<SceneNode> = workflow
        .nodes
        .iter()
        .filter_map(|node| {
            let top_left = transform.canvas_to_screen(node.position)?;
            Some(SceneNode {
                id: node.id.clone(),
                label: node.label.clone(),
                primitive: node.primitive.clone(),
                appearance: catalog.appearance(&node.primitive),
                rect: Rect { x: top_left.x, y: top_left.y, width, height },
                input_port: top_left.offset(0.0, height / 2.0),
                output_port: top_left.offset(width, height / 2.0),
            })
        })
        .collect();

    let find = |id: &NodeId| nodes.iter().find(|n| &n.id == id);

    let edges = workflow
        .edges
        .iter()
        .filter_map(|edge| {
            let from = find(&edge.source)?.output_port;
            let to = find(&edge.target)?.input_port;
            Some(SceneEdge::styled(Some(edge.id.clone()), from, to))
        })
        .collect();

    let transient = transient.and_then(|t| {
        let from = find(&t.source)?.output_port;
        Some(SceneEdge::styled(None, from, t.pointer))
    });

    Scene {
        nodes,
        edges,
        transient,
        port_radius: transform.scale(PORT_RADIUS),
    }
}
