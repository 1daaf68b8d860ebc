// Comparative multi-arc placement across experiments.
//
// The same molecule groups from several experiments are compared on one
// circle: each group owns an angular sector, each distinct molecule id owns
// a sub-angle inside its group's sector, and each experiment owns a
// concentric ring. A molecule measured in every experiment traces an arc
// across the rings at its sub-angle.
//
// Besides raw positions the layout produces a connecting path per group
// (for line rendering) and one label anchor per distinct molecule id.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::f64::consts::TAU;
use std::sync::Arc;

use serde::Serialize;

use crate::graph::{CorrelationGraph, HasGroup, HasMoleculeId, VertexId};
use crate::polar::{Point, PolarPoint};
use crate::layout::SharedViewport;

/// Ring spacing per experiment, as a fraction of the limiting viewport
/// dimension.
const RING_SPACING_FACTOR: f64 = 0.04;

/// Innermost ring radius, as a fraction of the limiting viewport dimension.
const BASE_RADIUS_FACTOR: f64 = 0.25;

/// Position of one vertex of one experiment.
#[derive(Debug, Clone, Serialize)]
pub struct ArcPoint {
    pub experiment: usize,
    pub vertex: VertexId,
    pub x: f64,
    pub y: f64,
}

/// Connected polyline for one molecule group, ordered id-by-id and ring-by-
/// ring so arcs of the same molecule are adjacent.
#[derive(Debug, Clone, Serialize)]
pub struct GroupPath {
    pub group: String,
    pub points: Vec<Point>,
}

/// One label anchor per distinct molecule id, outside the outermost ring.
#[derive(Debug, Clone, Serialize)]
pub struct LabelAnchor {
    pub id: String,
    pub point: Point,
}

/// Everything the renderer needs from one comparative pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArcLayoutResult {
    pub positions: Vec<ArcPoint>,
    pub group_paths: Vec<GroupPath>,
    pub labels: Vec<LabelAnchor>,
}

/// Cross-experiment concentric arc placement.
pub struct ComparativeArcLayout<V> {
    experiments: Vec<Arc<CorrelationGraph<V>>>,
    viewport: SharedViewport,
    result: ArcLayoutResult,
}

impl<V: HasGroup + HasMoleculeId> ComparativeArcLayout<V> {
    pub fn new(experiments: Vec<Arc<CorrelationGraph<V>>>, viewport: SharedViewport) -> Self {
        Self {
            experiments,
            viewport,
            result: ArcLayoutResult::default(),
        }
    }

    /// Compute positions, paths and labels in one pass.
    pub fn initialize(&mut self) {
        let vp = self.viewport.get();
        self.result = ArcLayoutResult::default();
        if !vp.is_sized() || self.experiments.is_empty() {
            return;
        }

        // Distinct groups and, per group, distinct molecule ids across all
        // experiments. Sorted so sectors and sub-angles are deterministic.
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for graph in &self.experiments {
            for vertex in graph.vertices() {
                groups
                    .entry(vertex.group().unwrap_or("").to_string())
                    .or_default()
                    .insert(vertex.molecule_id().to_string());
            }
        }
        if groups.is_empty() {
            return;
        }

        let min_dim = vp.min_dimension();
        let center = vp.center();
        let sector = TAU / groups.len() as f64;
        let base = BASE_RADIUS_FACTOR * min_dim;
        let spacing = RING_SPACING_FACTOR * min_dim;

        // One sub-angle per distinct molecule id.
        let mut angles: HashMap<String, f64> = HashMap::new();
        for (group_index, ids) in groups.values().enumerate() {
            let sub = sector / ids.len() as f64;
            for (id_index, id) in ids.iter().enumerate() {
                let angle = group_index as f64 * sector + (id_index as f64 + 0.5) * sub;
                angles.insert(id.clone(), angle);
            }
        }

        // One ring per experiment.
        let mut points: HashMap<(usize, String), Point> = HashMap::new();
        for (experiment, graph) in self.experiments.iter().enumerate() {
            let radius = base + spacing * experiment as f64;
            for (vertex_id, vertex) in graph.iter() {
                let Some(&angle) = angles.get(vertex.molecule_id()) else {
                    continue;
                };
                let mut p = PolarPoint::with_origin(center);
                p.set_polar(radius, angle);
                let (x, y) = vp.clamp(p.x(), p.y());
                self.result.positions.push(ArcPoint {
                    experiment,
                    vertex: vertex_id,
                    x,
                    y,
                });
                points.insert((experiment, vertex.molecule_id().to_string()), Point::new(x, y));
            }
        }

        // Connecting path per group: for each id its ring positions are
        // consecutive, so a molecule's arc renders as one run.
        for (group, ids) in &groups {
            let mut path = Vec::new();
            for id in ids {
                for experiment in 0..self.experiments.len() {
                    if let Some(&point) = points.get(&(experiment, id.clone())) {
                        path.push(point);
                    }
                }
            }
            if !path.is_empty() {
                self.result.group_paths.push(GroupPath {
                    group: group.clone(),
                    points: path,
                });
            }
        }

        // Label anchors sit one spacing outside the outermost ring.
        let label_radius = base + spacing * self.experiments.len() as f64;
        for ids in groups.values() {
            for id in ids {
                let Some(&angle) = angles.get(id) else { continue };
                let mut p = PolarPoint::with_origin(center);
                p.set_polar(label_radius, angle);
                let (x, y) = vp.clamp(p.x(), p.y());
                self.result.labels.push(LabelAnchor {
                    id: id.clone(),
                    point: Point::new(x, y),
                });
            }
        }
    }

    pub fn reset(&mut self) {
        self.initialize();
    }

    pub fn result(&self) -> &ArcLayoutResult {
        &self.result
    }
}
