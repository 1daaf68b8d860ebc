//! Layout and animation core for molecular correlation networks.
//!
//! Vertices are molecules, edges are pairwise statistical correlations in
//! [-1, 1]. The crate computes 2D positions for a rendering host: one-shot
//! placements (random scatter, center collapse, grouped circles, regulation
//! rings, comparative arcs) and iterative relaxations (direct-correction
//! clustering, Fruchterman-Reingold and spring force models) driven by a
//! background animation loop that publishes a consistent snapshot after
//! every completed step.
//!
//! ```
//! use corrnet_core::layout::GroupedCircleLayout;
//! use corrnet_core::{CorrelationGraph, Molecule, SharedViewport, VertexLayout, Viewport};
//! use std::sync::Arc;
//!
//! let mut graph = CorrelationGraph::new();
//! let a = graph.add_vertex(Molecule::new("m1").with_group("lipids"));
//! let b = graph.add_vertex(Molecule::new("m2").with_group("lipids"));
//! graph.add_edge(a, b, 0.92)?;
//!
//! let viewport = SharedViewport::new(Viewport::new(800.0, 600.0));
//! let mut circles = GroupedCircleLayout::new(Arc::new(graph), viewport);
//! circles.initialize();
//! assert_eq!(circles.positions().len(), 2);
//! # Ok::<(), corrnet_core::GraphError>(())
//! ```

mod animator;
mod error;
mod graph;
pub mod layout;
mod polar;
mod regulation;
mod snapshot;

pub use animator::{Animator, DEFAULT_INTERVAL, StepListener};
pub use error::GraphError;
pub use graph::{
    Adjacency, CorrelationGraph, Edge, HasGroup, HasMoleculeId, HasSampleValues, Molecule,
    VertexId,
};
pub use layout::{
    IterativeLayout, MARGIN, PositionMap, PositionSnapshot, SharedViewport, VertexLayout, Viewport,
};
pub use polar::{Point, PolarPoint};
pub use regulation::{FoldChangeConfig, Regulation, classify};
pub use snapshot::{LayoutSnapshot, VertexPosition};
