// Circle-per-group placements.
//
// GroupedCircleLayout partitions vertices by their group attribute and lays
// the groups out on a grid of cells sized to fit the viewport; within each
// cell the members sit evenly on a circle. RegulationCircleLayout is the
// two-sample-group variant: vertices are bucketed by fold-change direction
// (up / down / unchanged) and the three buckets ring the viewport center.
//
// Group iteration is sorted, so both layouts are deterministic.

use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::sync::Arc;

use log::debug;

use crate::graph::{CorrelationGraph, HasGroup, HasSampleValues, VertexId};
use crate::polar::{Point, PolarPoint};
use crate::regulation::{FoldChangeConfig, Regulation, classify};
use crate::layout::{PositionMap, SharedViewport, VertexLayout, Viewport};

/// Circle radius as a fraction of the limiting grid-cell dimension.
const CELL_RADIUS_FACTOR: f64 = 0.38;

/// Outer ring radius as a fraction of the limiting viewport dimension.
const REGULATION_RING_FACTOR: f64 = 0.3;

/// Groups on a grid, members on a circle per cell.
pub struct GroupedCircleLayout<V> {
    graph: Arc<CorrelationGraph<V>>,
    viewport: SharedViewport,
    positions: PositionMap,
    radius: f64,
}

impl<V: HasGroup> GroupedCircleLayout<V> {
    pub fn new(graph: Arc<CorrelationGraph<V>>, viewport: SharedViewport) -> Self {
        Self {
            graph,
            viewport,
            positions: PositionMap::new(),
            radius: 0.0,
        }
    }

    /// Override the per-cell circle radius. A positive radius survives
    /// `initialize`; a non-positive one is recomputed from the cell size.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Vertices bucketed by group name, sorted by group for determinism.
    /// Ungrouped vertices share a single unnamed bucket.
    fn buckets(&self) -> BTreeMap<String, Vec<VertexId>> {
        let mut buckets: BTreeMap<String, Vec<VertexId>> = BTreeMap::new();
        for (id, vertex) in self.graph.iter() {
            buckets
                .entry(vertex.group().unwrap_or("").to_string())
                .or_default()
                .push(id);
        }
        buckets
    }
}

impl<V: HasGroup> VertexLayout for GroupedCircleLayout<V> {
    fn initialize(&mut self) {
        let vp = self.viewport.get();
        self.positions.clear();
        if !vp.is_sized() {
            return;
        }

        let buckets = self.buckets();
        if buckets.is_empty() {
            return;
        }

        let columns = (buckets.len() as f64).sqrt().ceil() as usize;
        let rows = buckets.len().div_ceil(columns);
        let cell_w = vp.width / columns as f64;
        let cell_h = vp.height / rows as f64;
        if self.radius <= 0.0 {
            self.radius = CELL_RADIUS_FACTOR * cell_w.min(cell_h);
        }
        debug!(
            "grouped circle layout: {} groups on a {}x{} grid, radius {:.1}",
            buckets.len(),
            columns,
            rows,
            self.radius
        );

        for (index, members) in buckets.values().enumerate() {
            let col = index % columns;
            let row = index / columns;
            let center = Point::new(
                col as f64 * cell_w + cell_w / 2.0,
                row as f64 * cell_h + cell_h / 2.0,
            );
            place_on_circle(&mut self.positions, members, center, self.radius, &vp);
        }
    }

    fn positions(&self) -> &PositionMap {
        &self.positions
    }
}

/// Three regulation buckets ringed around the viewport center.
pub struct RegulationCircleLayout<V> {
    graph: Arc<CorrelationGraph<V>>,
    viewport: SharedViewport,
    positions: PositionMap,
    config: FoldChangeConfig,
}

impl<V: HasSampleValues> RegulationCircleLayout<V> {
    pub fn new(
        graph: Arc<CorrelationGraph<V>>,
        viewport: SharedViewport,
        config: FoldChangeConfig,
    ) -> Self {
        Self {
            graph,
            viewport,
            positions: PositionMap::new(),
            config,
        }
    }
}

impl<V: HasSampleValues> VertexLayout for RegulationCircleLayout<V> {
    fn initialize(&mut self) {
        let vp = self.viewport.get();
        self.positions.clear();
        if !vp.is_sized() || self.graph.is_empty() {
            return;
        }

        let mut buckets: [(Regulation, Vec<VertexId>); 3] = [
            (Regulation::Up, Vec::new()),
            (Regulation::Down, Vec::new()),
            (Regulation::Unchanged, Vec::new()),
        ];
        for (id, vertex) in self.graph.iter() {
            let class = classify(vertex, &self.config);
            for (bucket_class, members) in buckets.iter_mut() {
                if *bucket_class == class {
                    members.push(id);
                }
            }
        }

        let outer = REGULATION_RING_FACTOR * vp.min_dimension();
        let inner = outer / 3.0_f64.sqrt();
        let center = vp.center();

        for (index, (_, members)) in buckets.iter().enumerate() {
            let mut anchor = PolarPoint::with_origin(center);
            anchor.set_polar(outer, TAU * index as f64 / 3.0);
            place_on_circle(&mut self.positions, members, anchor.point(), inner, &vp);
        }
    }

    fn positions(&self) -> &PositionMap {
        &self.positions
    }
}

/// Spread `members` evenly around a circle, clamped into the viewport.
fn place_on_circle(
    positions: &mut PositionMap,
    members: &[VertexId],
    center: Point,
    radius: f64,
    vp: &Viewport,
) {
    for (index, &id) in members.iter().enumerate() {
        let mut p = PolarPoint::with_origin(center);
        p.set_polar(radius, TAU * index as f64 / members.len() as f64);
        let (x, y) = vp.clamp(p.x(), p.y());
        p.set_cartesian(x, y);
        positions.insert(id, p);
    }
}
