// Correlation graph model.
//
// Vertices are molecules (or any payload exposing the capability traits
// below); edges are undirected correlations with a weight in [-1, 1].
// Layout strategies read vertices through narrow capability traits rather
// than a concrete payload type, so alternative payloads can drive the same
// layouts.
//
// Vertices and edges are immutable once added, as far as the layouts are
// concerned; only positions change during animation.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::GraphError;

/// Dense vertex index into a [`CorrelationGraph`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VertexId(pub(crate) usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Access to the categorical group a vertex belongs to.
pub trait HasGroup {
    fn group(&self) -> Option<&str>;
}

/// Access to the external molecule id used to match vertices across
/// experiments.
pub trait HasMoleculeId {
    fn molecule_id(&self) -> &str;
}

/// Access to per-sample numeric values.
pub trait HasSampleValues {
    fn sample_value(&self, sample: &str) -> Option<f64>;
}

/// A molecule: the default vertex payload.
#[derive(Debug, Clone)]
pub struct Molecule {
    id: String,
    group: Option<String>,
    values: HashMap<String, f64>,
}

impl Molecule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: None,
            values: HashMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_value(mut self, sample: impl Into<String>, value: f64) -> Self {
        self.values.insert(sample.into(), value);
        self
    }
}

impl HasGroup for Molecule {
    fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

impl HasMoleculeId for Molecule {
    fn molecule_id(&self) -> &str {
        &self.id
    }
}

impl HasSampleValues for Molecule {
    fn sample_value(&self, sample: &str) -> Option<f64> {
        self.values.get(sample).copied()
    }
}

/// An undirected correlation edge between two distinct vertices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    pub a: VertexId,
    pub b: VertexId,
    pub weight: f64,
}

/// Vertices plus weighted undirected correlation edges.
#[derive(Debug, Clone)]
pub struct CorrelationGraph<V> {
    vertices: Vec<V>,
    edges: Vec<Edge>,
    /// Normalized pair (low id first) -> correlation weight.
    weights: HashMap<(VertexId, VertexId), f64>,
}

impl<V> CorrelationGraph<V> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            weights: HashMap::new(),
        }
    }

    pub fn add_vertex(&mut self, vertex: V) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(vertex);
        id
    }

    /// Add (or overwrite) the correlation between two distinct vertices.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId, weight: f64) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfCorrelation);
        }
        for id in [a, b] {
            if id.0 >= self.vertices.len() {
                return Err(GraphError::UnknownVertex(id));
            }
        }
        if !weight.is_finite() || !(-1.0..=1.0).contains(&weight) {
            return Err(GraphError::InvalidWeight(weight));
        }

        let key = pair_key(a, b);
        if self.weights.insert(key, weight).is_some() {
            if let Some(edge) = self
                .edges
                .iter_mut()
                .find(|e| pair_key(e.a, e.b) == key)
            {
                edge.weight = weight;
            }
        } else {
            self.edges.push(Edge { a, b, weight });
        }
        Ok(())
    }

    /// Correlation weight for a pair, or `None` if it was never computed.
    pub fn correlation(&self, a: VertexId, b: VertexId) -> Option<f64> {
        self.weights.get(&pair_key(a, b)).copied()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&V> {
        self.vertices.get(id.0)
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &V)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i), v))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl<V> Default for CorrelationGraph<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}

/// Neighbor lists with correlation weights, derived from the edge set.
///
/// Built by iterative strategies at `initialize` time; neighbor lists are
/// sorted by vertex id for deterministic traversal.
#[derive(Debug, Clone)]
pub struct Adjacency {
    neighbors: HashMap<VertexId, Vec<(VertexId, f64)>>,
    degree: HashMap<VertexId, usize>,
}

impl Adjacency {
    pub fn from_graph<V>(graph: &CorrelationGraph<V>) -> Self {
        let mut neighbors: HashMap<VertexId, Vec<(VertexId, f64)>> = HashMap::new();
        let mut degree: HashMap<VertexId, usize> = HashMap::new();

        for edge in graph.edges() {
            neighbors.entry(edge.a).or_default().push((edge.b, edge.weight));
            neighbors.entry(edge.b).or_default().push((edge.a, edge.weight));
            *degree.entry(edge.a).or_default() += 1;
            *degree.entry(edge.b).or_default() += 1;
        }

        for list in neighbors.values_mut() {
            list.sort_by_key(|(id, _)| *id);
        }

        Self { neighbors, degree }
    }

    /// Neighbors of a vertex with their correlation weights, or an empty
    /// slice if it has none.
    pub fn neighbors(&self, id: VertexId) -> &[(VertexId, f64)] {
        self.neighbors.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Total edge count incident to a vertex.
    pub fn degree(&self, id: VertexId) -> usize {
        self.degree.get(&id).copied().unwrap_or(0)
    }
}
