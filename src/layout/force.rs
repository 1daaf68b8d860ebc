// Continuous force-directed relaxation.
//
// ForceLayout is the generic engine: for every vertex it sums a
// model-supplied repulsion against every other vertex and a model-supplied
// attraction along each incident edge, expressed in polar terms relative to
// the counterpart. The net displacement is capped by the model's current
// decay distance, clamped to the viewport, and written back in one pass, so
// a renderer never observes a torn step. Concrete force models plug in as
// small strategy values.
//
// SpringLayout has a different inner loop (fixed-increment nudging toward a
// per-pair optimal distance) and therefore implements IterativeLayout
// directly rather than going through a ForceModel.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::graph::{Adjacency, CorrelationGraph, VertexId};
use crate::polar::PolarPoint;
use crate::layout::{IterativeLayout, PositionMap, SharedViewport, VertexLayout, Viewport};

/// Distance floor for coincident vertices; avoids division by zero.
const MIN_DISTANCE: f64 = 1e-4;

/// Pairwise force model driving [`ForceLayout`].
pub trait ForceModel {
    /// Recompute internal constants for a graph/viewport; called by
    /// `initialize`.
    fn prepare(&mut self, vertex_count: usize, viewport: Viewport);

    /// Attractive force magnitude along an edge at the given distance.
    fn attraction(&self, distance: f64, weight: f64) -> f64;

    /// Repulsive force magnitude between any vertex pair at the given
    /// distance.
    fn repulsion(&self, distance: f64) -> f64;

    /// Cap on per-vertex displacement this step.
    fn decay_distance(&self) -> f64;

    /// Cool down after a completed step.
    fn cool(&mut self);

    /// True once the decay has burned out.
    fn is_converged(&self) -> bool;
}

/// Generic force-relaxation layout over a pluggable model.
pub struct ForceLayout<V, M> {
    graph: Arc<CorrelationGraph<V>>,
    viewport: SharedViewport,
    positions: PositionMap,
    adjacency: Adjacency,
    model: M,
    rng: ChaCha8Rng,
}

impl<V, M: ForceModel> ForceLayout<V, M> {
    pub fn new(graph: Arc<CorrelationGraph<V>>, viewport: SharedViewport, model: M) -> Self {
        Self::from_rng(graph, viewport, model, ChaCha8Rng::from_entropy())
    }

    /// Seeded variant for reproducible runs.
    pub fn with_seed(
        graph: Arc<CorrelationGraph<V>>,
        viewport: SharedViewport,
        model: M,
        seed: u64,
    ) -> Self {
        Self::from_rng(graph, viewport, model, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(
        graph: Arc<CorrelationGraph<V>>,
        viewport: SharedViewport,
        model: M,
        rng: ChaCha8Rng,
    ) -> Self {
        let adjacency = Adjacency::from_graph(graph.as_ref());
        Self {
            graph,
            viewport,
            positions: PositionMap::new(),
            adjacency,
            model,
            rng,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<V, M: ForceModel> VertexLayout for ForceLayout<V, M> {
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
        self.adjacency = Adjacency::from_graph(self.graph.as_ref());
        self.model.prepare(self.graph.vertex_count(), vp);
        debug!("force layout initialized: {} vertices", self.positions.len());
    }

    fn positions(&self) -> &PositionMap {
        &self.positions
    }
}

impl<V, M: ForceModel> IterativeLayout for ForceLayout<V, M> {
    fn step(&mut self) {
        let vp = self.viewport.get();
        if !vp.is_sized() || self.positions.is_empty() {
            return;
        }

        let ids: Vec<VertexId> = self.graph.vertex_ids().collect();
        let mut moves: HashMap<VertexId, (f64, f64)> = HashMap::new();

        for &v in &ids {
            let Some(vp_pos) = self.positions.get(&v).map(|p| p.point()) else {
                continue;
            };
            let mut dx = 0.0;
            let mut dy = 0.0;

            // Repulsion from every other vertex, directed away from it.
            for &u in &ids {
                if u == v {
                    continue;
                }
                let Some(u_pos) = self.positions.get(&u).map(|p| p.point()) else {
                    continue;
                };
                let distance = (vp_pos.x - u_pos.x)
                    .hypot(vp_pos.y - u_pos.y)
                    .max(MIN_DISTANCE);
                let away = (vp_pos.y - u_pos.y).atan2(vp_pos.x - u_pos.x);
                let force = self.model.repulsion(distance);
                dx += force * away.cos();
                dy += force * away.sin();
            }

            // Attraction along incident edges, directed toward the neighbor.
            for &(n, weight) in self.adjacency.neighbors(v) {
                let Some(n_pos) = self.positions.get(&n).map(|p| p.point()) else {
                    continue;
                };
                let distance = (n_pos.x - vp_pos.x)
                    .hypot(n_pos.y - vp_pos.y)
                    .max(MIN_DISTANCE);
                let toward = (n_pos.y - vp_pos.y).atan2(n_pos.x - vp_pos.x);
                let force = self.model.attraction(distance, weight);
                dx += force * toward.cos();
                dy += force * toward.sin();
            }

            let magnitude = dx.hypot(dy);
            if magnitude > 0.0 {
                let capped = magnitude.min(self.model.decay_distance());
                moves.insert(v, (dx / magnitude * capped, dy / magnitude * capped));
            }
        }

        // Apply the whole pass, then cool. Per-vertex moves are independent,
        // so application order does not matter.
        for (v, (dx, dy)) in moves {
            if let Some(p) = self.positions.get_mut(&v) {
                let (x, y) = vp.clamp(p.x() + dx, p.y() + dy);
                p.set_cartesian(x, y);
            }
        }
        self.model.cool();
    }

    fn is_converged(&self) -> bool {
        self.model.is_converged()
    }
}

/// Fruchterman-Reingold force model.
///
/// k = C * sqrt(area / n). Attraction grows as distance^2 / k, repulsion
/// falls as k^2 / distance. The per-step displacement cap starts at
/// width / 400 and cools by 0.997 each step; the layout reports convergence
/// once the cap reaches 0.1.
#[derive(Debug, Clone)]
pub struct FruchtermanReingold {
    k: f64,
    t: f64,
}

/// Scaling constant for the optimal pair distance.
const FR_C: f64 = 0.012;
const FR_COOLING: f64 = 0.997;
const FR_T_FLOOR: f64 = 0.1;
const FR_INITIAL_T_DIVISOR: f64 = 400.0;

impl FruchtermanReingold {
    pub fn new() -> Self {
        Self { k: 0.0, t: 0.0 }
    }

    /// Current step-size cap; decays toward the floor.
    pub fn temperature(&self) -> f64 {
        self.t
    }
}

impl Default for FruchtermanReingold {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceModel for FruchtermanReingold {
    fn prepare(&mut self, vertex_count: usize, viewport: Viewport) {
        let area = viewport.width * viewport.height;
        self.k = FR_C * (area / vertex_count.max(1) as f64).sqrt();
        self.t = viewport.width / FR_INITIAL_T_DIVISOR;
    }

    fn attraction(&self, distance: f64, _weight: f64) -> f64 {
        distance * distance / self.k
    }

    fn repulsion(&self, distance: f64) -> f64 {
        self.k * self.k / distance
    }

    fn decay_distance(&self) -> f64 {
        self.t
    }

    fn cool(&mut self) {
        self.t *= FR_COOLING;
    }

    fn is_converged(&self) -> bool {
        self.t <= FR_T_FLOOR
    }
}

/// The usual pairing of the generic engine with the FR model.
pub type FruchtermanReingoldLayout<V> = ForceLayout<V, FruchtermanReingold>;

/// Spring-style relaxation toward per-pair optimal distances.
///
/// Attraction is 0.75 * |correlation| (zero when the pair was never
/// computed), repulsion a constant 0.8; the optimal separation for a pair is
/// (repulsion - attraction) scaled by the limiting viewport dimension. Every
/// visible step runs three sub-iterations of fixed-size nudges: 0.2 toward
/// when too far, 0.05 away when too close. There is no internal decay; the
/// driver stops this layout externally.
pub struct SpringLayout<V> {
    graph: Arc<CorrelationGraph<V>>,
    viewport: SharedViewport,
    positions: PositionMap,
    rng: ChaCha8Rng,
}

const SPRING_ATTRACTION: f64 = 0.75;
const SPRING_REPULSION: f64 = 0.8;
const SPRING_ATTRACTION_STEP: f64 = 0.2;
const SPRING_REPULSION_STEP: f64 = 0.05;
const SPRING_SUB_ITERATIONS: usize = 3;

impl<V> SpringLayout<V> {
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
            rng,
        }
    }
}

impl<V> VertexLayout for SpringLayout<V> {
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

impl<V> IterativeLayout for SpringLayout<V> {
    fn step(&mut self) {
        let vp = self.viewport.get();
        if !vp.is_sized() || self.positions.is_empty() {
            return;
        }
        let scale = vp.min_dimension();
        let ids: Vec<VertexId> = self.graph.vertex_ids().collect();

        for _ in 0..SPRING_SUB_ITERATIONS {
            for &v in &ids {
                for &u in &ids {
                    if u == v {
                        continue;
                    }
                    let Some(u_pos) = self.positions.get(&u).map(|p| p.point()) else {
                        continue;
                    };
                    let Some(v_pos) = self.positions.get(&v).map(|p| p.point()) else {
                        continue;
                    };

                    let attraction = SPRING_ATTRACTION
                        * self
                            .graph
                            .correlation(v, u)
                            .map(|w| w.abs())
                            .unwrap_or(0.0);
                    let optimal = (SPRING_REPULSION - attraction) * scale;

                    let dx = u_pos.x - v_pos.x;
                    let dy = u_pos.y - v_pos.y;
                    let distance = dx.hypot(dy).max(MIN_DISTANCE);
                    let nudge = if distance > optimal {
                        SPRING_ATTRACTION_STEP
                    } else if distance < optimal {
                        -SPRING_REPULSION_STEP
                    } else {
                        continue;
                    };

                    let (x, y) = vp.clamp(
                        v_pos.x + dx / distance * nudge,
                        v_pos.y + dy / distance * nudge,
                    );
                    if let Some(p) = self.positions.get_mut(&v) {
                        p.set_cartesian(x, y);
                    }
                }
            }
        }
    }

    fn is_converged(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Molecule;
    use crate::layout::{MARGIN, Viewport};

    fn make_triangle_graph() -> Arc<CorrelationGraph<Molecule>> {
        let mut graph = CorrelationGraph::new();
        let a = graph.add_vertex(Molecule::new("a"));
        let b = graph.add_vertex(Molecule::new("b"));
        let c = graph.add_vertex(Molecule::new("c"));
        graph.add_edge(a, b, 0.9).unwrap();
        graph.add_edge(b, c, 0.7).unwrap();
        graph.add_edge(a, c, 0.2).unwrap();
        Arc::new(graph)
    }

    #[test]
    fn test_fr_temperature_decays_to_the_floor() {
        let mut model = FruchtermanReingold::new();
        model.prepare(10, Viewport::new(400.0, 300.0));

        // t0 = width / 400.
        assert!((model.temperature() - 1.0).abs() < 1e-9);
        assert!(!model.is_converged());

        let mut previous = model.temperature();
        let mut steps = 0;
        while !model.is_converged() {
            model.cool();
            assert!((model.temperature() - previous * 0.997).abs() < 1e-12);
            previous = model.temperature();
            steps += 1;
            assert!(steps < 1_000, "cooling must reach the floor");
        }
        assert!(model.temperature() <= 0.1);
        // ln(0.1) / ln(0.997) is about 766 steps.
        assert!((700..800).contains(&steps));
    }

    #[test]
    fn test_fr_step_respects_bounds_and_converges() {
        let viewport = SharedViewport::new(Viewport::new(400.0, 300.0));
        let mut layout =
            ForceLayout::with_seed(make_triangle_graph(), viewport, FruchtermanReingold::new(), 5);
        layout.initialize();

        let mut steps = 0;
        while !layout.is_converged() {
            layout.step();
            steps += 1;
            assert!(steps < 1_000);
            for p in layout.positions().values() {
                assert!(p.x() >= MARGIN && p.x() <= 400.0 - MARGIN);
                assert!(p.y() >= MARGIN && p.y() <= 300.0 - MARGIN);
            }
        }
    }

    #[test]
    fn test_fr_empty_graph_steps_safely() {
        let graph: Arc<CorrelationGraph<Molecule>> = Arc::new(CorrelationGraph::new());
        let viewport = SharedViewport::new(Viewport::new(400.0, 300.0));
        let mut layout = ForceLayout::with_seed(graph, viewport, FruchtermanReingold::new(), 5);
        layout.initialize();
        layout.step();
        assert!(layout.positions().is_empty());
    }

    #[test]
    fn test_spring_pulls_a_correlated_pair_together() {
        let mut graph = CorrelationGraph::new();
        let a = graph.add_vertex(Molecule::new("a"));
        let b = graph.add_vertex(Molecule::new("b"));
        graph.add_edge(a, b, 1.0).unwrap();

        let viewport = SharedViewport::new(Viewport::new(100.0, 100.0));
        let mut layout = SpringLayout::with_seed(Arc::new(graph), viewport, 5);
        layout.initialize();

        // Pin the pair 60 units apart; optimal is (0.8 - 0.75) * 100 = 5.
        let center = crate::polar::Point::new(50.0, 50.0);
        let mut pa = PolarPoint::with_origin(center);
        pa.set_cartesian(20.0, 50.0);
        let mut pb = PolarPoint::with_origin(center);
        pb.set_cartesian(80.0, 50.0);
        layout.positions.insert(a, pa);
        layout.positions.insert(b, pb);

        let separation = |layout: &SpringLayout<Molecule>| {
            let pa = layout.positions[&a];
            let pb = layout.positions[&b];
            (pa.x() - pb.x()).hypot(pa.y() - pb.y())
        };

        let start = separation(&layout);
        for _ in 0..100 {
            layout.step();
        }
        let end = separation(&layout);
        assert!(end < start);
        assert!(end < 10.0, "pair should settle near the optimal distance, got {end}");
        assert!(!layout.is_converged());
    }

    #[test]
    fn test_spring_uncorrelated_pair_separates() {
        let mut graph = CorrelationGraph::new();
        let a = graph.add_vertex(Molecule::new("a"));
        let b = graph.add_vertex(Molecule::new("b"));
        // No edge: constant repulsion only, optimal 0.8 * 100 = 80.
        let viewport = SharedViewport::new(Viewport::new(100.0, 100.0));
        let mut layout = SpringLayout::with_seed(Arc::new(graph), viewport, 5);
        layout.initialize();

        let center = crate::polar::Point::new(50.0, 50.0);
        let mut pa = PolarPoint::with_origin(center);
        pa.set_cartesian(45.0, 50.0);
        let mut pb = PolarPoint::with_origin(center);
        pb.set_cartesian(55.0, 50.0);
        layout.positions.insert(a, pa);
        layout.positions.insert(b, pb);

        let separation = |layout: &SpringLayout<Molecule>| {
            let pa = layout.positions[&a];
            let pb = layout.positions[&b];
            (pa.x() - pb.x()).hypot(pa.y() - pb.y())
        };

        let start = separation(&layout);
        for _ in 0..50 {
            layout.step();
        }
        assert!(separation(&layout) > start);
    }
}
