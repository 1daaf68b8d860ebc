// Layout strategy family for correlation networks.
//
// Two kinds of strategy share one surface:
// - static placements compute every position in a single `initialize` pass
//   (random scatter, center collapse, grouped circles, comparative arcs)
// - iterative strategies refine positions over repeated `step` calls until
//   convergence or an external stop (direct-correction clustering, force
//   relaxation)
//
// Shared rules:
// - every published position is clamped into [MARGIN, dim - MARGIN]
// - an empty graph makes every pass a no-op with an empty position map
// - an unsized viewport defers placement until the next initialize/resize
// - the viewport may be resized by the UI thread at any time; strategies
//   read the current value at the start of each initialize/step
//
// Submodules:
// - scatter: random and centered one-shot placements
// - grouped_circles: grid-of-circles by group, regulation ring variant
// - comparative_arcs: cross-experiment concentric arc placement
// - clustered: direct-correction pair relaxation
// - force: force-directed relaxation (Fruchterman-Reingold, spring)

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::graph::VertexId;
use crate::polar::{Point, PolarPoint};

mod clustered;
mod comparative_arcs;
mod force;
mod grouped_circles;
mod scatter;

pub use clustered::ClusteredLayout;
pub use comparative_arcs::{
    ArcLayoutResult, ArcPoint, ComparativeArcLayout, GroupPath, LabelAnchor,
};
pub use force::{ForceLayout, ForceModel, FruchtermanReingold, FruchtermanReingoldLayout, SpringLayout};
pub use grouped_circles::{GroupedCircleLayout, RegulationCircleLayout};
pub use scatter::{CenteredLayout, RandomLayout};

/// Clamp margin, in viewport units.
pub const MARGIN: f64 = 10.0;

/// Width x height of the drawing surface.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// False until the host has given the surface a real size.
    pub fn is_sized(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn min_dimension(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn max_dimension(&self) -> f64 {
        self.width.max(self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a point into the margin-inset interior.
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        let hi_x = (self.width - MARGIN).max(MARGIN);
        let hi_y = (self.height - MARGIN).max(MARGIN);
        (x.clamp(MARGIN, hi_x), y.clamp(MARGIN, hi_y))
    }
}

/// Viewport shared between the UI thread and layout strategies.
///
/// Resizes take effect at the start of the next `initialize`/`step`; a
/// mid-step resize is never observed because each pass copies the value out
/// once.
#[derive(Debug, Clone)]
pub struct SharedViewport(Arc<Mutex<Viewport>>);

impl SharedViewport {
    pub fn new(viewport: Viewport) -> Self {
        Self(Arc::new(Mutex::new(viewport)))
    }

    pub fn get(&self) -> Viewport {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set(&self, width: f64, height: f64) {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) =
            Viewport::new(width, height);
    }
}

/// Per-vertex polar positions owned by a strategy.
pub type PositionMap = HashMap<VertexId, PolarPoint>;

/// Immutable Cartesian copy of a completed pass, shared with renderers.
pub type PositionSnapshot = Arc<HashMap<VertexId, Point>>;

pub(crate) fn snapshot_of(positions: &PositionMap) -> PositionSnapshot {
    Arc::new(
        positions
            .iter()
            .map(|(&id, p)| (id, p.point()))
            .collect(),
    )
}

/// A placement strategy over one graph.
///
/// `initialize` computes a complete position for every vertex from the
/// current viewport and vertex attributes; `reset` is equivalent to running
/// `initialize` again. Randomized strategies are non-deterministic across
/// calls by design.
pub trait VertexLayout {
    fn initialize(&mut self);

    fn reset(&mut self) {
        self.initialize();
    }

    /// Current positions; read-only for collaborators.
    fn positions(&self) -> &PositionMap;

    /// Cartesian copy of the current positions.
    fn snapshot(&self) -> PositionSnapshot {
        snapshot_of(self.positions())
    }
}

/// A layout refined over repeated steps by the animation driver.
///
/// Lifecycle: Created -> Initialized -> Stepping* -> Stopped. There is no
/// resume; once stopped (or converged) a strategy must be re-initialized to
/// run again.
pub trait IterativeLayout: VertexLayout {
    /// One full relaxation pass over all vertex pairs and/or edges.
    fn step(&mut self);

    /// True once further stepping would not change positions materially.
    fn is_converged(&self) -> bool;
}
