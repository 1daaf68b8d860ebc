// Direct-correction clustering layout.
//
// Strongly correlated pairs are pulled toward a short target separation:
// target = scale * (1.1 - |weight|), so a perfect correlation targets
// scale * 0.1. Each step walks every edge, picks one endpoint as the anchor
// at random, and nudges the other endpoint by exactly one unit along the
// connecting line in whichever direction closes the gap. The unit step is a
// deliberate fixed-size choice, not a proportional controller; once within
// one unit of the target a pair oscillates inside that band.
//
// Convergence is purely count-based: the iteration budget derives from the
// viewport extent, not from force equilibrium.

use std::sync::Arc;

use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::graph::CorrelationGraph;
use crate::polar::PolarPoint;
use crate::layout::{IterativeLayout, PositionMap, SharedViewport, VertexLayout};

/// Default separation scale; target distances span [0.1, 2.1] of this.
const DEFAULT_SCALE: f64 = 100.0;

/// Distance floor for coincident endpoints.
const MIN_DISTANCE: f64 = 1e-4;

pub struct ClusteredLayout<V> {
    graph: Arc<CorrelationGraph<V>>,
    viewport: SharedViewport,
    positions: PositionMap,
    scale: f64,
    steps_taken: usize,
    max_steps: usize,
    rng: ChaCha8Rng,
}

impl<V> ClusteredLayout<V> {
    pub fn new(graph: Arc<CorrelationGraph<V>>, viewport: SharedViewport) -> Self {
        Self::from_rng(graph, viewport, ChaCha8Rng::from_entropy())
    }

    /// Seeded variant for reproducible runs.
    pub fn with_seed(graph: Arc<CorrelationGraph<V>>, viewport: SharedViewport, seed: u64) -> Self {
        Self::from_rng(graph, viewport, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(
        graph: Arc<CorrelationGraph<V>>,
        viewport: SharedViewport,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            graph,
            viewport,
            positions: PositionMap::new(),
            scale: DEFAULT_SCALE,
            steps_taken: 0,
            max_steps: 0,
            rng,
        }
    }

    /// Override the separation scale.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Target separation for a correlation weight.
    fn target_distance(&self, weight: f64) -> f64 {
        self.scale * (1.1 - weight.abs())
    }
}

impl<V> VertexLayout for ClusteredLayout<V> {
    fn initialize(&mut self) {
        let vp = self.viewport.get();
        self.positions.clear();
        self.steps_taken = 0;
        self.max_steps = 0;
        if !vp.is_sized() {
            return;
        }

        let center = vp.center();
        for id in self.graph.vertex_ids() {
            let x = self.rng.gen_range(0.0..vp.width);
            let y = self.rng.gen_range(0.0..vp.height);
            let (x, y) = vp.clamp(x, y);
            let mut p = PolarPoint::with_origin(center);
            p.set_cartesian(x, y);
            self.positions.insert(id, p);
        }
        self.max_steps = vp.max_dimension() as usize;
        debug!(
            "clustered layout initialized: {} vertices, budget {} steps",
            self.positions.len(),
            self.max_steps
        );
    }

    fn positions(&self) -> &PositionMap {
        &self.positions
    }
}

impl<V> IterativeLayout for ClusteredLayout<V> {
    fn step(&mut self) {
        let vp = self.viewport.get();
        if !vp.is_sized() {
            return;
        }

        for edge in self.graph.edges() {
            // Randomized anchor choice avoids a systematic drift toward
            // whichever endpoint was added first.
            let (anchor, mover) = if self.rng.gen_bool(0.5) {
                (edge.a, edge.b)
            } else {
                (edge.b, edge.a)
            };
            let Some(anchor_pos) = self.positions.get(&anchor).map(|p| p.point()) else {
                continue;
            };
            let Some(mover_pos) = self.positions.get(&mover).map(|p| p.point()) else {
                continue;
            };

            let dx = mover_pos.x - anchor_pos.x;
            let dy = mover_pos.y - anchor_pos.y;
            let distance = dx.hypot(dy);
            let (ux, uy) = if distance > MIN_DISTANCE {
                (dx / distance, dy / distance)
            } else {
                (1.0, 0.0)
            };

            let target = self.target_distance(edge.weight);
            let unit = if distance > target {
                -1.0
            } else if distance < target {
                1.0
            } else {
                continue;
            };

            let (x, y) = vp.clamp(mover_pos.x + ux * unit, mover_pos.y + uy * unit);
            if let Some(p) = self.positions.get_mut(&mover) {
                p.set_cartesian(x, y);
            }
        }
        self.steps_taken += 1;
    }

    fn is_converged(&self) -> bool {
        self.steps_taken >= self.max_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Molecule;
    use crate::layout::{MARGIN, Viewport};
    use crate::polar::Point;

    fn make_pair_graph(weight: f64) -> (Arc<CorrelationGraph<Molecule>>, crate::graph::VertexId, crate::graph::VertexId) {
        let mut graph = CorrelationGraph::new();
        let a = graph.add_vertex(Molecule::new("a"));
        let b = graph.add_vertex(Molecule::new("b"));
        graph.add_edge(a, b, weight).unwrap();
        (Arc::new(graph), a, b)
    }

    #[test]
    fn test_perfect_correlation_closes_to_target() {
        let (graph, a, b) = make_pair_graph(1.0);
        let viewport = SharedViewport::new(Viewport::new(400.0, 400.0));
        let mut layout = ClusteredLayout::with_seed(graph, viewport, 11);
        layout.initialize();

        // Pin the pair well inside the viewport, 200 units apart.
        let center = Point::new(200.0, 200.0);
        let mut pa = PolarPoint::with_origin(center);
        pa.set_cartesian(100.0, 200.0);
        let mut pb = PolarPoint::with_origin(center);
        pb.set_cartesian(300.0, 200.0);
        layout.positions.insert(a, pa);
        layout.positions.insert(b, pb);

        let target = 100.0 * 0.1;
        let separation = |layout: &ClusteredLayout<Molecule>| {
            let pa = layout.positions[&a];
            let pb = layout.positions[&b];
            (pa.x() - pb.x()).hypot(pa.y() - pb.y())
        };

        let mut previous = separation(&layout);
        while previous - target > 1.0 {
            layout.step();
            let current = separation(&layout);
            // Exactly one unit closer per step while the gap is open.
            assert!(
                current < previous,
                "separation should shrink monotonically: {previous} -> {current}"
            );
            assert!(previous - current <= 1.0 + 1e-9);
            previous = current;
        }
        // Never overshoots by more than one step unit.
        assert!((previous - target).abs() <= 1.0 + 1e-9);

        for p in layout.positions.values() {
            assert!(p.x() >= MARGIN && p.x() <= 400.0 - MARGIN);
            assert!(p.y() >= MARGIN && p.y() <= 400.0 - MARGIN);
        }
    }

    #[test]
    fn test_iteration_budget_bounds_convergence() {
        let (graph, _, _) = make_pair_graph(0.5);
        let viewport = SharedViewport::new(Viewport::new(60.0, 40.0));
        let mut layout = ClusteredLayout::with_seed(graph, viewport, 3);
        layout.initialize();

        assert!(!layout.is_converged());
        for _ in 0..60 {
            layout.step();
        }
        assert!(layout.is_converged());
    }

    #[test]
    fn test_reinitialize_resets_the_budget() {
        let (graph, _, _) = make_pair_graph(0.5);
        let viewport = SharedViewport::new(Viewport::new(60.0, 40.0));
        let mut layout = ClusteredLayout::with_seed(graph, viewport, 3);
        layout.initialize();
        for _ in 0..60 {
            layout.step();
        }
        assert!(layout.is_converged());

        layout.reset();
        assert!(!layout.is_converged());
    }

    #[test]
    fn test_empty_graph_steps_safely() {
        let graph: Arc<CorrelationGraph<Molecule>> = Arc::new(CorrelationGraph::new());
        let viewport = SharedViewport::new(Viewport::new(400.0, 400.0));
        let mut layout = ClusteredLayout::with_seed(graph, viewport, 3);
        layout.initialize();
        layout.step();
        assert!(layout.positions().is_empty());
    }
}
