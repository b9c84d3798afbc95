//! Retrieval quality metrics and their corpus-level aggregation.
//!
//! This module provides:
//! - **Per-query scoring**: Precision@K, Recall@K, AP@K, nDCG@K and Noise@K in one pass
//! - **Aggregation**: arithmetic means over a corpus (MAP is the mean of AP)
//!
//! # Example
//!
//! ```rust
//! use chunkeval_core::metrics::{calculate_mean_metrics, calculate_metrics};
//!
//! let q1 = calculate_metrics(&["a", "b", "x"], &["a", "b"], None, None, None)?;
//! let q2 = calculate_metrics(&["x", "a"], &["a"], None, None, None)?;
//!
//! let summary = calculate_mean_metrics(&[q1, q2])?;
//! assert!((summary.recall - 1.0).abs() < 1e-12);
//! assert!((summary.map - 0.75).abs() < 1e-12); // (1.0 + 0.5) / 2
//! # Ok::<(), chunkeval_core::Error>(())
//! ```

mod aggregate;
mod result;
mod retrieval;

pub use aggregate::{calculate_mean_metrics, MetricAccumulator};
pub use result::{MetricResult, MetricSummary};
pub(crate) use retrieval::check_noise_penalty;
pub use retrieval::{calculate_metrics, MetricCalculator, DEFAULT_NOISE_PENALTY};
