//! End-to-end editing scenarios and randomized invariant checks.
//!
//! The randomized tests drive the store with long pseudo-random mutation
//! sequences (fixed seeds, so failures reproduce) and check the invariants
//! after every single step.

use std::collections::HashSet;

use catalog::Catalog;
use serde_json::json;

use crate::canvas::CanvasTransform;
use crate::models::{NodeId, Position, Viewport, Workflow};
use crate::placement::{place, DropPayload};
use crate::serializer::{deserialize_named, from_json_str, serialize, to_json_string};
use crate::store::GraphStore;

/// xorshift64*, deterministic and dependency-free.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }

    fn coord(&mut self) -> f64 {
        (self.below(20_000) as f64) / 4.0 - 2_500.0
    }
}

const TYPES: [&str; 4] = ["CronTrigger", "SuperCompute", "SecurityGuardian", "Unlisted"];

fn assert_edge_invariant(wf: &Workflow) {
    let ids: HashSet<&NodeId> = wf.nodes.iter().map(|n| &n.id).collect();
    assert_eq!(ids.len(), wf.nodes.len(), "node ids must be unique");
    for edge in &wf.edges {
        assert!(ids.contains(&edge.source), "dangling source on {}", edge.id);
        assert!(ids.contains(&edge.target), "dangling target on {}", edge.id);
    }
}

/// An existing node id most of the time, a made-up one otherwise.
fn pick(store: &GraphStore, rng: &mut Rng) -> NodeId {
    if store.nodes().is_empty() || rng.below(5) == 0 {
        NodeId::new(format!("ghost-{}", rng.below(3)))
    } else {
        store.nodes()[rng.below(store.nodes().len())].id.clone()
    }
}

/// Apply one random mutation.
fn random_step(store: &mut GraphStore, rng: &mut Rng) {
    match rng.below(6) {
        0 | 1 => {
            let ty = TYPES[rng.below(TYPES.len())];
            let at = Position::new(rng.coord(), rng.coord());
            store.add_node(ty, at);
        }
        2 => {
            let id = pick(store, rng);
            store.remove_node(&id);
        }
        3 | 4 => {
            let (a, b) = (pick(store, rng), pick(store, rng));
            store.add_edge(&a, &b);
        }
        _ => {
            let id = pick(store, rng);
            let at = Position::new(rng.coord(), rng.coord());
            store.move_node(&id, at);
        }
    }
}

// ============================================================
// Property checks
// ============================================================

#[test]
fn cascade_invariant_holds_after_every_step() {
    for seed in [1u64, 7, 42, 1_000_003] {
        let mut rng = Rng(seed);
        let mut store = GraphStore::default();
        for _ in 0..500 {
            random_step(&mut store, &mut rng);
            assert_edge_invariant(store.workflow());
        }
    }
}

#[test]
fn round_trip_law_holds_for_store_built_workflows() {
    for seed in [3u64, 99, 123_456_789] {
        let mut rng = Rng(seed);
        let mut store = GraphStore::new(format!("wf-{seed}"));
        for _ in 0..200 {
            random_step(&mut store, &mut rng);
        }
        store.set_viewport(Viewport { x: rng.coord(), y: rng.coord(), zoom: 0.75 });
        let original = store.into_workflow();

        let text = serde_json::to_string(&serialize(&original)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let (loaded, report) = deserialize_named(&value, &original.name);

        assert!(report.is_clean(), "seed {seed}: {report:?}");
        assert_eq!(loaded, original, "seed {seed}");
    }
}

#[test]
fn add_edge_with_a_missing_endpoint_never_mutates() {
    let mut rng = Rng(5);
    let mut store = GraphStore::default();
    for _ in 0..100 {
        random_step(&mut store, &mut rng);
    }
    let existing = store.nodes().first().map(|n| n.id.clone()).unwrap_or_else(|| NodeId::new("x"));
    let edges_before = store.edges().to_vec();

    for (a, b) in [
        (NodeId::new("missing-1"), NodeId::new("missing-2")),
        (existing.clone(), NodeId::new("missing-2")),
        (NodeId::new("missing-1"), existing),
    ] {
        assert!(store.add_edge(&a, &b).is_none());
        assert_eq!(store.edges(), &edges_before[..]);
    }
}

#[test]
fn move_of_a_missing_node_never_moves_anything() {
    let mut rng = Rng(11);
    let mut store = GraphStore::default();
    for _ in 0..100 {
        random_step(&mut store, &mut rng);
    }
    let positions: Vec<Position> = store.nodes().iter().map(|n| n.position).collect();

    assert!(!store.move_node(&NodeId::new("never-existed"), Position::new(1.0, 1.0)));
    let after: Vec<Position> = store.nodes().iter().map(|n| n.position).collect();
    assert_eq!(after, positions);
}

#[test]
fn drop_position_is_the_inverse_transform_for_any_pan_and_zoom() {
    let catalog = Catalog::from_listing(&json!(["SuperCompute"]));
    let payload = DropPayload::primitive("SuperCompute");
    let mut rng = Rng(2024);

    for _ in 0..50 {
        let (sx, sy) = (rng.coord(), rng.coord());
        let (px, py) = (rng.coord(), rng.coord());
        let z = [0.25, 0.5, 1.0, 1.5, 3.0][rng.below(5)];

        let mut store = GraphStore::default();
        let t = CanvasTransform::new(Position::ORIGIN, Viewport { x: px, y: py, zoom: z });
        let node = place(&mut store, &catalog, &t, &payload, Position::new(sx, sy)).unwrap();

        assert_eq!(node.position, Position::new((sx - px) / z, (sy - py) / z));
        // Same visual location: mapping back lands on the drop pixel.
        let back = t.canvas_to_screen(node.position).unwrap();
        assert!((back.x - sx).abs() < 1e-6 && (back.y - sy).abs() < 1e-6);
    }
}

#[test]
fn text_round_trip_is_exact_for_dropped_positions() {
    let catalog = Catalog::from_listing(&json!(["SuperCompute"]));
    let payload = DropPayload::primitive("SuperCompute");
    let zooms = [0.7, 0.3, 1.1, 2.9, 0.13, 3.7];

    for seed in [17u64, 4_242, 90_001] {
        let mut rng = Rng(seed);
        let mut store = GraphStore::new(format!("drops-{seed}"));
        let mut t = CanvasTransform::default();

        for _ in 0..400 {
            t.viewport = Viewport {
                x: rng.coord() + 0.1,
                y: rng.coord() / 3.0,
                zoom: zooms[rng.below(zooms.len())],
            };
            let screen = Position::new(rng.coord() / 7.0, rng.coord() + 0.3);
            place(&mut store, &catalog, &t, &payload, screen).unwrap();
        }
        store.set_viewport(t.viewport);
        let original = store.into_workflow();

        let text = to_json_string(&original).unwrap();
        let (loaded, report) = from_json_str(&text, &original.name);

        assert!(report.is_clean(), "seed {seed}: {report:?}");
        for (a, b) in original.nodes.iter().zip(&loaded.nodes) {
            assert_eq!(a.position, b.position, "seed {seed}: node {}", a.id);
        }
        assert_eq!(loaded, original, "seed {seed}");
    }
}

// ============================================================
// Scenarios
// ============================================================

#[test]
fn build_then_remove_the_trigger() {
    let mut store = GraphStore::default();
    let n1 = store.add_node("CronTrigger", Position::new(0.0, 0.0));
    let n2 = store.add_node("SecurityGuardian", Position::new(100.0, 0.0));
    store.add_edge(&n1.id, &n2.id).expect("both endpoints exist");

    assert_eq!(store.nodes().len(), 2);
    assert_eq!(store.edges().len(), 1);
    assert_eq!(store.edges()[0].source, n1.id);

    store.remove_node(&n1.id);
    assert_eq!(store.nodes().len(), 1);
    assert_eq!(store.edges().len(), 0);
}

#[test]
fn edge_between_two_missing_nodes_is_rejected() {
    let mut store = GraphStore::default();
    store.add_node("CronTrigger", Position::ORIGIN);

    assert!(store.add_edge(&NodeId::new("missing-1"), &NodeId::new("missing-2")).is_none());
    assert!(store.edges().is_empty());
}
