// Serializable layout export for host renderers.
//
// The host UI reads positions either through the live snapshot published by
// the animator or through this one-shot Cartesian dump, which is stable
// enough to serialize and ship across a process boundary.

use serde::Serialize;

use crate::graph::VertexId;
use crate::layout::{VertexLayout, Viewport};

/// One vertex position in absolute Cartesian coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct VertexPosition {
    pub vertex: VertexId,
    pub x: f64,
    pub y: f64,
}

/// Cartesian dump of a layout, ready for a rendering host.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutSnapshot {
    pub viewport: Viewport,
    pub positions: Vec<VertexPosition>,
}

impl LayoutSnapshot {
    /// Capture the current positions of any layout. Output is sorted by
    /// vertex id so repeated captures of the same state serialize
    /// identically.
    pub fn capture<L: VertexLayout + ?Sized>(layout: &L, viewport: Viewport) -> Self {
        let mut positions: Vec<VertexPosition> = layout
            .positions()
            .iter()
            .map(|(&vertex, p)| VertexPosition {
                vertex,
                x: p.x(),
                y: p.y(),
            })
            .collect();
        positions.sort_by_key(|p| p.vertex);
        Self {
            viewport,
            positions,
        }
    }

    /// JSON form, as consumed by the rendering host.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CorrelationGraph, Molecule};
    use crate::layout::{CenteredLayout, SharedViewport};
    use std::sync::Arc;

    #[test]
    fn test_capture_is_sorted_and_serializes() {
        let mut graph = CorrelationGraph::new();
        graph.add_vertex(Molecule::new("a"));
        graph.add_vertex(Molecule::new("b"));

        let viewport = Viewport::new(100.0, 80.0);
        let shared = SharedViewport::new(viewport);
        let mut layout = CenteredLayout::new(Arc::new(graph), shared);
        layout.initialize();

        let snapshot = LayoutSnapshot::capture(&layout, viewport);
        assert_eq!(snapshot.positions.len(), 2);
        assert!(snapshot.positions[0].vertex < snapshot.positions[1].vertex);

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"width\":100.0"));
        assert!(json.contains("\"positions\""));
    }
}
