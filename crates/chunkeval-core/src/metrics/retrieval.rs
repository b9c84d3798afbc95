//! Per-query retrieval quality metrics.
//!
//! Scores one ranked list against its ground truth in a single pass:
//! - **Precision@K**: hits among the top-K retrieved items
//! - **Recall@K**: hits among all relevant ids
//! - **AP@K**: precision at each hit rank, normalized by the relevant count
//! - **nDCG@K**: graded gain `rel / log2(1 + rank)` over the ideal ordering
//! - **Noise@K**: mean cost per rank; hits cost their noise grade, misses a fixed penalty

use crate::config::EvalConfig;
use crate::error::{Error, Result};
use crate::ground_truth::GroundTruth;
use crate::matching::{MatchPolicy, MatchPredicate};

use super::result::MetricResult;

/// Noise cost charged for each retrieved item that matches no ground-truth id.
pub const DEFAULT_NOISE_PENALTY: f64 = 5.0;

/// Rejects a noise penalty that is negative or not finite.
pub(crate) fn check_noise_penalty(penalty: f64) -> Result<()> {
    if penalty.is_finite() && penalty >= 0.0 {
        Ok(())
    } else {
        Err(Error::validation(
            "noise_penalty",
            format!("must be finite and non-negative, got {penalty}"),
        ))
    }
}

#[allow(clippy::cast_precision_loss)]
#[inline]
pub(crate) fn as_f64(n: usize) -> f64 {
    n as f64
}

/// Discount denominator `log2(1 + rank)` for a 1-based rank.
#[inline]
fn discount(rank: usize) -> f64 {
    (1.0 + as_f64(rank)).log2()
}

/// DCG of the best possible ordering: the top `k` relevancies, sorted descending.
fn ideal_dcg(relevancies: impl Iterator<Item = f64>, k: usize) -> f64 {
    let mut sorted: Vec<f64> = relevancies.collect();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, &rel)| rel / discount(i + 1))
        .sum()
}

/// Scores ranked lists against ground truth.
///
/// The match predicate defaults to [`MatchPolicy::Exact`]; swap it with
/// [`with_predicate`](Self::with_predicate).
///
/// # Example
///
/// ```rust
/// use chunkeval_core::{GroundTruth, MetricCalculator};
///
/// let gt = GroundTruth::from_ids(["a", "b"]);
/// let result = MetricCalculator::new().evaluate(&["a", "b", "x"], &gt, None);
///
/// assert!((result.precision - 2.0 / 3.0).abs() < 1e-12);
/// assert!((result.recall - 1.0).abs() < 1e-12);
/// assert!((result.ap - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct MetricCalculator<P = MatchPolicy> {
    predicate: P,
    noise_penalty: f64,
    cutoff: Option<usize>,
}

impl Default for MetricCalculator<MatchPolicy> {
    fn default() -> Self {
        Self {
            predicate: MatchPolicy::Exact,
            noise_penalty: DEFAULT_NOISE_PENALTY,
            cutoff: None,
        }
    }
}

impl MetricCalculator<MatchPolicy> {
    /// Exact matching, default noise penalty, no cutoff.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a calculator from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the configuration fails
    /// [`EvalConfig::validate`].
    pub fn from_config(config: &EvalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            predicate: config.match_policy,
            noise_penalty: config.noise_penalty,
            cutoff: config.cutoff,
        })
    }
}

impl<P: MatchPredicate> MetricCalculator<P> {
    /// Replaces the match predicate.
    #[must_use]
    pub fn with_predicate<Q: MatchPredicate>(self, predicate: Q) -> MetricCalculator<Q> {
        MetricCalculator {
            predicate,
            noise_penalty: self.noise_penalty,
            cutoff: self.cutoff,
        }
    }

    /// Sets the cost of a miss when noise grades are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on `noise_penalty` when `penalty` is
    /// negative or not finite.
    pub fn with_noise_penalty(mut self, penalty: f64) -> Result<Self> {
        check_noise_penalty(penalty)?;
        self.noise_penalty = penalty;
        Ok(self)
    }

    /// Sets the default cutoff used when [`evaluate`](Self::evaluate) gets `None`.
    #[must_use]
    pub fn with_cutoff(mut self, cutoff: Option<usize>) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Match predicate in use.
    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    /// Noise penalty in use.
    #[must_use]
    pub fn noise_penalty(&self) -> f64 {
        self.noise_penalty
    }

    /// Default cutoff in use.
    #[must_use]
    pub fn cutoff(&self) -> Option<usize> {
        self.cutoff
    }

    /// Scores `retrieved` against `ground_truth`.
    ///
    /// The cutoff is `k`, else the calculator's default, else the full list,
    /// clamped to `retrieved.len()`. An effective cutoff of zero scores all
    /// metrics as zero.
    ///
    /// Each ground-truth id is credited at most once; a retrieved item whose
    /// only matches were already credited counts as a miss. When an item
    /// matches several uncredited ids, the longest one is credited (ties go
    /// to the smaller id), so scores never depend on ground-truth order.
    pub fn evaluate<S: AsRef<str>>(
        &self,
        retrieved: &[S],
        ground_truth: &GroundTruth,
        k: Option<usize>,
    ) -> MetricResult {
        let cutoff = k
            .or(self.cutoff)
            .map_or(retrieved.len(), |k| k.min(retrieved.len()));
        let noisy = ground_truth.is_noisy();

        if cutoff == 0 {
            tracing::debug!(
                requested = ?k.or(self.cutoff),
                retrieved = retrieved.len(),
                "Empty cutoff, scoring as zero"
            );
            return MetricResult::zero(noisy);
        }

        let mut credited = vec![false; ground_truth.len()];
        let mut hit_count = 0_usize;
        let mut ap_sum = 0.0;
        let mut dcg = 0.0;
        let mut noise_sum = 0.0;

        for (i, item) in retrieved.iter().take(cutoff).enumerate() {
            let rank = i + 1;
            let Some(pos) = self.find_hit(item.as_ref(), ground_truth, &credited) else {
                noise_sum += self.noise_penalty;
                continue;
            };
            credited[pos] = true;
            hit_count += 1;
            ap_sum += as_f64(hit_count) / as_f64(rank);

            if let Some((_, judgement)) = ground_truth.get_index(pos) {
                dcg += judgement.relevance / discount(rank);
                noise_sum += judgement.noise;
            }
        }

        let k_f64 = as_f64(cutoff);
        let relevant = as_f64(ground_truth.len());
        let (recall, ap) = if ground_truth.is_empty() {
            (0.0, 0.0)
        } else {
            (as_f64(hit_count) / relevant, ap_sum / relevant)
        };

        let ndcg = if ground_truth.is_graded() {
            let idcg = ideal_dcg(ground_truth.relevancies(), cutoff);
            // min() absorbs rounding when dcg and idcg sum in different orders
            if idcg > 0.0 {
                (dcg / idcg).min(1.0)
            } else {
                0.0
            }
        } else {
            0.0
        };

        MetricResult {
            precision: as_f64(hit_count) / k_f64,
            recall,
            ap,
            ndcg,
            noise: noisy.then(|| noise_sum / k_f64),
        }
    }

    fn find_hit(
        &self,
        retrieved: &str,
        ground_truth: &GroundTruth,
        credited: &[bool],
    ) -> Option<usize> {
        if self.predicate.is_exact() {
            return ground_truth.position(retrieved).filter(|&pos| !credited[pos]);
        }
        // Longest id is the most specific match
        ground_truth
            .iter()
            .enumerate()
            .filter(|&(pos, (id, _))| !credited[pos] && self.predicate.matches(retrieved, id))
            .max_by(|&(_, (a, _)), &(_, (b, _))| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(pos, _)| pos)
    }
}

/// Scores one query from index-aligned ground-truth sequences.
///
/// `ground_truth_relevancies[i]` and `ground_truth_noises[i]` grade
/// `ground_truth_ids[i]`. Uses exact matching and the default noise penalty;
/// build a [`MetricCalculator`] for anything else.
///
/// # Errors
///
/// Returns [`Error::Validation`](crate::Error::Validation) naming
/// `relevancies` or `noises` when a grade sequence is misaligned with the
/// ids or holds a negative or non-finite value. Scoring itself never fails.
///
/// # Example
///
/// ```rust
/// use chunkeval_core::calculate_metrics;
///
/// let relevancies = [3.0, 1.0];
/// let result = calculate_metrics(&["a", "b"], &["a", "b"], Some(&relevancies[..]), None, Some(2))?;
/// assert!((result.ndcg - 1.0).abs() < 1e-12);
/// # Ok::<(), chunkeval_core::Error>(())
/// ```
pub fn calculate_metrics<R, G>(
    retrieved: &[R],
    ground_truth_ids: &[G],
    ground_truth_relevancies: Option<&[f64]>,
    ground_truth_noises: Option<&[f64]>,
    k: Option<usize>,
) -> Result<MetricResult>
where
    R: AsRef<str>,
    G: AsRef<str>,
{
    let ground_truth =
        GroundTruth::from_parallel(ground_truth_ids, ground_truth_relevancies, ground_truth_noises)?;
    Ok(MetricCalculator::new().evaluate(retrieved, &ground_truth, k))
}
