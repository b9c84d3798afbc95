//! Corpus-level aggregation of per-query metrics.
//!
//! Means are computed per key; `ap` becomes `map`. The optional `noise` key
//! must be present on every result or on none of them.

use crate::error::{Error, Result};

use super::result::{MetricResult, MetricSummary};
use super::retrieval::as_f64;

/// Running sums for a mean over [`MetricResult`]s.
///
/// Order-independent: accumulators built over disjoint slices can be
/// [`merge`](Self::merge)d, which makes this usable as a parallel fold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricAccumulator {
    count: usize,
    precision: f64,
    recall: f64,
    ap: f64,
    ndcg: f64,
    noise: f64,
    first_noisy: Option<usize>,
    first_plain: Option<usize>,
}

impl MetricAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of results pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true when nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Adds one result.
    pub fn push(&mut self, result: &MetricResult) {
        let index = self.count;
        self.count += 1;
        self.precision += result.precision;
        self.recall += result.recall;
        self.ap += result.ap;
        self.ndcg += result.ndcg;
        match result.noise {
            Some(noise) => {
                self.noise += noise;
                self.first_noisy.get_or_insert(index);
            }
            None => {
                self.first_plain.get_or_insert(index);
            }
        }
    }

    /// Combines two accumulators; `other` is treated as following `self`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let offset = self.count;
        Self {
            count: self.count + other.count,
            precision: self.precision + other.precision,
            recall: self.recall + other.recall,
            ap: self.ap + other.ap,
            ndcg: self.ndcg + other.ndcg,
            noise: self.noise + other.noise,
            first_noisy: self.first_noisy.or(other.first_noisy.map(|i| i + offset)),
            first_plain: self.first_plain.or(other.first_plain.map(|i| i + offset)),
        }
    }

    /// Computes the means.
    ///
    /// # Errors
    ///
    /// - [`Error::Domain`] if no result was pushed.
    /// - [`Error::Validation`] on field `noise` if some results carry noise
    ///   and others do not; the reason names the first inconsistent index.
    pub fn finish(&self) -> Result<MetricSummary> {
        if self.count == 0 {
            tracing::warn!("Refusing to average an empty metric set");
            return Err(Error::Domain(
                "cannot compute mean metrics over zero results".to_string(),
            ));
        }

        let noisy = match (self.first_noisy, self.first_plain) {
            (Some(with), Some(without)) => {
                let offending = with.max(without);
                tracing::warn!(index = offending, "Inconsistent noise key across results");
                return Err(Error::validation(
                    "noise",
                    format!(
                        "result {offending} {} `noise` but result {} {}",
                        if offending == with { "has" } else { "lacks" },
                        with.min(without),
                        if offending == with { "lacks it" } else { "has it" },
                    ),
                ));
            }
            (Some(_), None) => true,
            _ => false,
        };

        let n = as_f64(self.count);
        Ok(MetricSummary {
            precision: self.precision / n,
            recall: self.recall / n,
            map: self.ap / n,
            ndcg: self.ndcg / n,
            noise: noisy.then(|| self.noise / n),
            queries: self.count,
        })
    }
}

impl<'a> Extend<&'a MetricResult> for MetricAccumulator {
    fn extend<I: IntoIterator<Item = &'a MetricResult>>(&mut self, iter: I) {
        for result in iter {
            self.push(result);
        }
    }
}

impl<'a> FromIterator<&'a MetricResult> for MetricAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a MetricResult>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

/// Averages per-query results into a corpus summary.
///
/// # Errors
///
/// - [`Error::Domain`] if `results` is empty.
/// - [`Error::Validation`] if `noise` is present on some results but not all.
///
/// # Example
///
/// ```rust
/// use chunkeval_core::{calculate_mean_metrics, MetricResult};
///
/// let results = [
///     MetricResult { precision: 0.5, ..MetricResult::default() },
///     MetricResult { precision: 1.0, ..MetricResult::default() },
/// ];
/// let summary = calculate_mean_metrics(&results)?;
/// assert!((summary.precision - 0.75).abs() < 1e-12);
/// # Ok::<(), chunkeval_core::Error>(())
/// ```
pub fn calculate_mean_metrics(results: &[MetricResult]) -> Result<MetricSummary> {
    results.iter().collect::<MetricAccumulator>().finish()
}
