//! Ground-truth judgements for a single query.
//!
//! A [`GroundTruth`] maps each relevant identifier directly to its
//! [`Judgement`], so graded lookups during scoring are a hash probe rather
//! than a positional search through parallel sequences.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Graded judgement attached to one relevant identifier.
///
/// Ungraded ground truth stores zeros here; whether the values carry
/// meaning is tracked by [`GroundTruth::is_graded`] and
/// [`GroundTruth::is_noisy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    /// Relevance grade used as DCG gain.
    pub relevance: f64,
    /// Noise cost charged when this identifier is retrieved.
    pub noise: f64,
}

/// Ordered set of relevant identifiers with optional relevance and noise grades.
///
/// Iteration order is insertion order. Duplicate identifiers keep their
/// first judgement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    entries: IndexMap<String, Judgement>,
    graded: bool,
    noisy: bool,
}

impl GroundTruth {
    /// Creates a binary ground truth: every identifier is relevant, no grades.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = IndexMap::new();
        for id in ids {
            entries.entry(id.into()).or_insert_with(Judgement::default);
        }
        Self {
            entries,
            graded: false,
            noisy: false,
        }
    }

    /// Creates a ground truth from an id sequence and index-aligned grade sequences.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming `relevancies` or `noises` when a
    /// grade sequence length differs from `ids`, or when a grade is negative
    /// or not finite.
    pub fn from_parallel<S: AsRef<str>>(
        ids: &[S],
        relevancies: Option<&[f64]>,
        noises: Option<&[f64]>,
    ) -> Result<Self> {
        check_aligned("relevancies", ids.len(), relevancies)?;
        check_aligned("noises", ids.len(), noises)?;

        let mut builder = GroundTruthBuilder::new();
        if relevancies.is_some() {
            builder = builder.graded();
        }
        if noises.is_some() {
            builder = builder.noisy();
        }
        for (i, id) in ids.iter().enumerate() {
            let judgement = Judgement {
                relevance: relevancies.map_or(0.0, |r| r[i]),
                noise: noises.map_or(0.0, |n| n[i]),
            };
            builder = builder.judge(id.as_ref(), judgement)?;
        }
        Ok(builder.build())
    }

    /// Starts an entry-by-entry builder.
    #[must_use]
    pub fn builder() -> GroundTruthBuilder {
        GroundTruthBuilder::new()
    }

    /// Number of distinct relevant identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no relevant identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true when relevance grades were supplied.
    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.graded
    }

    /// Returns true when noise grades were supplied.
    #[must_use]
    pub fn is_noisy(&self) -> bool {
        self.noisy
    }

    /// Returns true when `id` is in the relevant set (exact match).
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Judgement for `id`, if relevant.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Judgement> {
        self.entries.get(id)
    }

    /// Position of `id` in insertion order.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.get_index_of(id)
    }

    /// Entry at `position` in insertion order.
    #[must_use]
    pub fn get_index(&self, position: usize) -> Option<(&str, &Judgement)> {
        self.entries
            .get_index(position)
            .map(|(id, judgement)| (id.as_str(), judgement))
    }

    /// Iterates over identifiers and judgements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Judgement)> {
        self.entries.iter().map(|(id, j)| (id.as_str(), j))
    }

    /// Relevance grades in insertion order.
    pub fn relevancies(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.values().map(|j| j.relevance)
    }
}

/// Incremental constructor for [`GroundTruth`].
#[derive(Debug, Clone, Default)]
pub struct GroundTruthBuilder {
    inner: GroundTruth,
}

impl GroundTruthBuilder {
    /// Creates an empty, ungraded builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks relevance grades as meaningful.
    #[must_use]
    pub fn graded(mut self) -> Self {
        self.inner.graded = true;
        self
    }

    /// Marks noise grades as meaningful.
    #[must_use]
    pub fn noisy(mut self) -> Self {
        self.inner.noisy = true;
        self
    }

    /// Adds a relevant identifier without grades.
    #[must_use]
    pub fn relevant(mut self, id: impl Into<String>) -> Self {
        self.inner
            .entries
            .entry(id.into())
            .or_insert_with(Judgement::default);
        self
    }

    /// Adds a relevant identifier with its judgement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a grade is negative or not finite.
    pub fn judge(mut self, id: impl Into<String>, judgement: Judgement) -> Result<Self> {
        let id = id.into();
        check_grade("relevancies", &id, judgement.relevance)?;
        check_grade("noises", &id, judgement.noise)?;
        if let Entry::Vacant(slot) = self.inner.entries.entry(id) {
            slot.insert(judgement);
        }
        Ok(self)
    }

    /// Finishes the ground truth.
    #[must_use]
    pub fn build(self) -> GroundTruth {
        self.inner
    }
}

fn check_aligned(field: &str, expected: usize, values: Option<&[f64]>) -> Result<()> {
    match values {
        Some(values) if values.len() != expected => Err(Error::validation(
            field,
            format!(
                "expected {expected} values aligned with ground-truth ids, got {}",
                values.len()
            ),
        )),
        _ => Ok(()),
    }
}

fn check_grade(field: &str, id: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::validation(
            field,
            format!("grade for `{id}` must be finite and non-negative, got {value}"),
        ))
    }
}
