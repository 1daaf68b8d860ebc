// One-shot degenerate placements.
//
// Random scatter seeds the iterative strategies; center collapse is the
// reset baseline the host falls back to before an animated layout runs.

use std::sync::Arc;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::graph::CorrelationGraph;
use crate::polar::PolarPoint;
use crate::layout::{PositionMap, SharedViewport, VertexLayout};

/// Uniform random placement inside the viewport.
pub struct RandomLayout<V> {
    graph: Arc<CorrelationGraph<V>>,
    viewport: SharedViewport,
    positions: PositionMap,
    rng: ChaCha8Rng,
}

impl<V> RandomLayout<V> {
    pub fn new(graph: Arc<CorrelationGraph<V>>, viewport: SharedViewport) -> Self {
        Self::from_rng(graph, viewport, ChaCha8Rng::from_entropy())
    }

    /// Seeded variant for reproducible layouts.
    pub fn with_seed(graph: Arc<CorrelationGraph<V>>, viewport: SharedViewport, seed: u64) -> Self {
        Self::from_rng(graph, viewport, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(graph: Arc<CorrelationGraph<V>>, viewport: SharedViewport, rng: ChaCha8Rng) -> Self {
        Self {
            graph,
            viewport,
            positions: PositionMap::new(),
            rng,
        }
    }
}

impl<V> VertexLayout for RandomLayout<V> {
    fn initialize(&mut self) {
        let vp = self.viewport.get();
        self.positions.clear();
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
    }

    fn positions(&self) -> &PositionMap {
        &self.positions
    }
}

/// Every vertex collapsed onto the viewport center.
pub struct CenteredLayout<V> {
    graph: Arc<CorrelationGraph<V>>,
    viewport: SharedViewport,
    positions: PositionMap,
}

impl<V> CenteredLayout<V> {
    pub fn new(graph: Arc<CorrelationGraph<V>>, viewport: SharedViewport) -> Self {
        Self {
            graph,
            viewport,
            positions: PositionMap::new(),
        }
    }
}

impl<V> VertexLayout for CenteredLayout<V> {
    fn initialize(&mut self) {
        let vp = self.viewport.get();
        self.positions.clear();
        if !vp.is_sized() {
            return;
        }
        let center = vp.center();
        for id in self.graph.vertex_ids() {
            self.positions.insert(id, PolarPoint::with_origin(center));
        }
    }

    fn positions(&self) -> &PositionMap {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Molecule;
    use crate::layout::{MARGIN, Viewport};

    fn make_graph(n: usize) -> Arc<CorrelationGraph<Molecule>> {
        let mut graph = CorrelationGraph::new();
        for i in 0..n {
            graph.add_vertex(Molecule::new(format!("m{i}")));
        }
        Arc::new(graph)
    }

    #[test]
    fn test_random_positions_within_bounds() {
        let viewport = SharedViewport::new(Viewport::new(300.0, 200.0));
        let mut layout = RandomLayout::with_seed(make_graph(40), viewport, 7);
        layout.initialize();

        assert_eq!(layout.positions().len(), 40);
        for p in layout.positions().values() {
            assert!(p.x() >= MARGIN && p.x() <= 300.0 - MARGIN);
            assert!(p.y() >= MARGIN && p.y() <= 200.0 - MARGIN);
        }
    }

    #[test]
    fn test_random_deferred_until_viewport_sized() {
        let viewport = SharedViewport::new(Viewport::new(0.0, 0.0));
        let mut layout = RandomLayout::with_seed(make_graph(5), viewport.clone(), 7);
        layout.initialize();
        assert!(layout.positions().is_empty());

        viewport.set(300.0, 200.0);
        layout.initialize();
        assert_eq!(layout.positions().len(), 5);
    }

    #[test]
    fn test_centered_collapses_everything() {
        let viewport = SharedViewport::new(Viewport::new(300.0, 200.0));
        let mut layout = CenteredLayout::new(make_graph(3), viewport);
        layout.initialize();

        for p in layout.positions().values() {
            assert_eq!((p.x(), p.y()), (150.0, 100.0));
        }
    }

    #[test]
    fn test_empty_graph_is_a_no_op() {
        let viewport = SharedViewport::new(Viewport::new(300.0, 200.0));
        let mut layout = RandomLayout::with_seed(make_graph(0), viewport, 7);
        layout.initialize();
        assert!(layout.positions().is_empty());
    }
}
