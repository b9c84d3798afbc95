//! Per-query and corpus-level metric records.

use serde::{Deserialize, Serialize};

/// Metrics for one query.
///
/// `precision`, `recall`, `ap` and `ndcg` lie in `[0, 1]`. `noise` is
/// present only when the ground truth carried noise grades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Hits over the effective cutoff.
    pub precision: f64,
    /// Hits over the number of relevant ids.
    pub recall: f64,
    /// Average precision, normalized by the number of relevant ids.
    pub ap: f64,
    /// Normalized discounted cumulative gain (0 for ungraded ground truth).
    pub ndcg: f64,
    /// Mean noise cost per considered rank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
}

impl MetricResult {
    /// All-zero result, with `noise = Some(0.0)` when `noisy`.
    #[must_use]
    pub fn zero(noisy: bool) -> Self {
        Self {
            noise: noisy.then_some(0.0),
            ..Self::default()
        }
    }
}

/// Arithmetic means of [`MetricResult`]s over a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Mean precision.
    pub precision: f64,
    /// Mean recall.
    pub recall: f64,
    /// Mean average precision.
    pub map: f64,
    /// Mean nDCG.
    pub ndcg: f64,
    /// Mean noise, when every averaged result carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
    /// Number of results averaged.
    pub queries: usize,
}
