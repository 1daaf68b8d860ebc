// Graph construction errors.
//
// Only the graph-building API surfaces typed errors. Anomalies inside the
// layout strategies degrade to an inert state instead: missing correlations
// are skipped, degenerate distances are floored, empty graphs are no-ops.

use crate::graph::VertexId;
use thiserror::Error;

/// Errors raised while assembling a correlation graph.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("unknown vertex {0:?}")]
    UnknownVertex(VertexId),

    #[error("a correlation edge must connect two distinct vertices")]
    SelfCorrelation,

    #[error("correlation weight {0} is not a finite value in [-1, 1]")]
    InvalidWeight(f64),
}
