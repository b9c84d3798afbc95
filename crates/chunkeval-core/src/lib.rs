//! # `chunkeval` Core
//!
//! Rank-aware retrieval quality metrics for evaluating RAG chunk retrieval.
//!
//! Given a ranked list of retrieved ids and the ground truth for a query,
//! the calculator produces precision, recall, average precision, nDCG and
//! an optional noise cost. The aggregator averages those per-query results
//! into corpus means (MAP, mean nDCG, ...).
//!
//! ## Features
//!
//! - **One-pass scoring**: every metric from a single walk over the top-K ranks
//! - **Graded relevance**: nDCG over relevance grades, noise over noise grades
//! - **Pluggable matching**: exact ids, or containment for sub-chunk facts
//! - **Strict aggregation**: empty or inconsistent corpora are errors, never NaN
//!
//! ## Quick Start
//!
//! ```rust
//! use chunkeval_core::{calculate_mean_metrics, GroundTruth, MetricCalculator};
//!
//! fn main() -> Result<(), chunkeval_core::Error> {
//!     let calculator = MetricCalculator::new();
//!
//!     let graded = GroundTruth::from_parallel(&["a", "b"], Some(&[3.0, 1.0][..]), None)?;
//!     let q1 = calculator.evaluate(&["a", "b"], &graded, Some(2));
//!     assert!((q1.ndcg - 1.0).abs() < 1e-12);
//!
//!     let binary = GroundTruth::from_ids(["c"]);
//!     let q2 = calculator.evaluate(&["x", "c"], &binary, None);
//!
//!     let summary = calculate_mean_metrics(&[q1, q2])?;
//!     assert_eq!(summary.queries, 2);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(
    test,
    allow(
        clippy::doc_markdown,
        clippy::uninlined_format_args,
        clippy::float_cmp,
        clippy::unreadable_literal
    )
)]

pub mod config;
pub mod error;
pub mod evaluator;
pub mod ground_truth;
pub mod matching;
pub mod metrics;

pub use config::EvalConfig;
pub use error::{Error, Result};
pub use evaluator::{CorpusEvaluator, CorpusReport, QueryCase, QueryMetrics};
pub use ground_truth::{GroundTruth, GroundTruthBuilder, Judgement};
pub use matching::{MatchPolicy, MatchPredicate};
pub use metrics::{
    calculate_mean_metrics, calculate_metrics, MetricAccumulator, MetricCalculator, MetricResult,
    MetricSummary, DEFAULT_NOISE_PENALTY,
};
