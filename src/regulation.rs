// Up/down regulation classification by fold change.
//
// A molecule is compared between two named sample groups: if the mean value
// in group B over the mean in group A exceeds the fold-change threshold the
// molecule is up-regulated, the reverse ratio exceeding the threshold means
// down-regulated, anything else is unchanged. Missing samples are skipped;
// a vertex with no resolvable values degrades to Unchanged.

use serde::Serialize;

use crate::graph::HasSampleValues;

/// Regulation direction of a molecule between two sample groups.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Regulation {
    Up,
    Down,
    Unchanged,
}

/// Sample grouping and threshold for fold-change classification.
///
/// Passed explicitly into the layouts that need it; there is no global
/// settings lookup.
#[derive(Debug, Clone)]
pub struct FoldChangeConfig {
    /// Sample names forming the reference group.
    pub group_a: Vec<String>,
    /// Sample names forming the comparison group.
    pub group_b: Vec<String>,
    /// Ratio above which a molecule counts as regulated.
    pub threshold: f64,
}

impl FoldChangeConfig {
    pub fn new(group_a: Vec<String>, group_b: Vec<String>, threshold: f64) -> Self {
        Self {
            group_a,
            group_b,
            threshold,
        }
    }
}

/// Classify a vertex by comparing its group means against the threshold.
pub fn classify<V: HasSampleValues>(vertex: &V, config: &FoldChangeConfig) -> Regulation {
    let (Some(mean_a), Some(mean_b)) = (
        mean_value(vertex, &config.group_a),
        mean_value(vertex, &config.group_b),
    ) else {
        return Regulation::Unchanged;
    };

    if mean_b / mean_a > config.threshold {
        Regulation::Up
    } else if mean_a / mean_b > config.threshold {
        Regulation::Down
    } else {
        Regulation::Unchanged
    }
}

/// Mean over the samples that resolve to a value; `None` when none do.
fn mean_value<V: HasSampleValues>(vertex: &V, samples: &[String]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for sample in samples {
        if let Some(value) = vertex.sample_value(sample) {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
