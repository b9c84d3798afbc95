//! Corpus evaluation: score every query, keep per-query rows, average them.
//!
//! With the `parallel` feature (default) per-query scoring fans out on
//! rayon. Row order always matches input order.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ground_truth::GroundTruth;
use crate::matching::{MatchPolicy, MatchPredicate};
use crate::metrics::{MetricAccumulator, MetricCalculator, MetricResult, MetricSummary};

/// One query to score: its ranking and its ground truth.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCase {
    /// Caller-chosen query identifier, carried into the report.
    pub query_id: String,
    /// Retrieved ids, best first.
    pub retrieved: Vec<String>,
    /// Relevant ids with optional grades.
    pub ground_truth: GroundTruth,
}

impl QueryCase {
    /// Creates a case.
    pub fn new(
        query_id: impl Into<String>,
        retrieved: Vec<String>,
        ground_truth: GroundTruth,
    ) -> Self {
        Self {
            query_id: query_id.into(),
            retrieved,
            ground_truth,
        }
    }
}

/// Metrics for one query of a corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMetrics {
    /// Identifier of the scored query.
    pub query_id: String,
    /// Its metrics.
    #[serde(flatten)]
    pub metrics: MetricResult,
}

/// Per-query rows and their mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusReport {
    /// One row per input case, in input order.
    pub per_query: Vec<QueryMetrics>,
    /// Mean over `per_query`.
    pub summary: MetricSummary,
}

/// Scores whole corpora with one [`MetricCalculator`].
#[derive(Debug, Clone)]
pub struct CorpusEvaluator<P = MatchPolicy> {
    calculator: MetricCalculator<P>,
}

impl Default for CorpusEvaluator<MatchPolicy> {
    fn default() -> Self {
        Self::new(MetricCalculator::default())
    }
}

impl<P> CorpusEvaluator<P>
where
    P: MatchPredicate + Sync,
{
    /// Wraps a calculator.
    pub fn new(calculator: MetricCalculator<P>) -> Self {
        Self { calculator }
    }

    /// Calculator used for every query.
    pub fn calculator(&self) -> &MetricCalculator<P> {
        &self.calculator
    }

    /// Scores each case with the calculator's default cutoff and averages the results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] for an empty corpus and
    /// [`Error::Validation`] when cases mix noisy and noise-free ground truth.
    pub fn evaluate(&self, cases: &[QueryCase]) -> Result<CorpusReport> {
        let per_query = self.score_all(cases);
        let summary = per_query
            .iter()
            .map(|row| &row.metrics)
            .collect::<MetricAccumulator>()
            .finish()?;

        tracing::debug!(
            queries = summary.queries,
            precision = summary.precision,
            recall = summary.recall,
            map = summary.map,
            ndcg = summary.ndcg,
            "Corpus evaluated"
        );
        Ok(CorpusReport { per_query, summary })
    }

    /// Evaluates several named experiments independently.
    ///
    /// # Errors
    ///
    /// Fails on the first experiment whose evaluation fails; the error
    /// message names that experiment.
    pub fn evaluate_experiments(
        &self,
        experiments: &BTreeMap<String, Vec<QueryCase>>,
    ) -> Result<BTreeMap<String, CorpusReport>> {
        experiments
            .iter()
            .map(|(name, cases)| {
                let _span = tracing::debug_span!("experiment", name = %name).entered();
                self.evaluate(cases)
                    .map(|report| (name.clone(), report))
                    .map_err(|err| in_experiment(name, err))
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn score_all(&self, cases: &[QueryCase]) -> Vec<QueryMetrics> {
        cases.par_iter().map(|case| self.score(case)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn score_all(&self, cases: &[QueryCase]) -> Vec<QueryMetrics> {
        cases.iter().map(|case| self.score(case)).collect()
    }

    fn score(&self, case: &QueryCase) -> QueryMetrics {
        QueryMetrics {
            query_id: case.query_id.clone(),
            metrics: self
                .calculator
                .evaluate(case.retrieved.as_slice(), &case.ground_truth, None),
        }
    }
}

fn in_experiment(name: &str, err: Error) -> Error {
    match err {
        Error::Domain(msg) => Error::Domain(format!("experiment `{name}`: {msg}")),
        Error::Validation { field, reason } => Error::Validation {
            field,
            reason: format!("experiment `{name}`: {reason}"),
        },
        Error::Config(msg) => Error::Config(msg),
    }
}
