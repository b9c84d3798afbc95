//! Match predicates deciding whether a retrieved item hits a ground-truth id.
//!
//! Chunk-level evaluation compares identifiers exactly. Fact-level
//! evaluation, where ground-truth ids name sub-chunk spans embedded in the
//! retrieved chunk ids, needs containment instead. The two policies give
//! different scores on partial ids, so the choice is always explicit.

use serde::{Deserialize, Serialize};

/// Decides whether `retrieved` matches `ground_truth`.
///
/// Implemented by [`MatchPolicy`] and by any `Fn(&str, &str) -> bool`.
pub trait MatchPredicate {
    /// Returns true if the retrieved id counts as a hit for the ground-truth id.
    fn matches(&self, retrieved: &str, ground_truth: &str) -> bool;

    /// Returns true if [`matches`](Self::matches) is plain string equality.
    ///
    /// Exact predicates are resolved with a hashed lookup instead of a scan
    /// over the ground truth.
    fn is_exact(&self) -> bool {
        false
    }
}

/// Built-in match policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Retrieved id equals the ground-truth id.
    #[default]
    Exact,
    /// Ground-truth id is a substring of the retrieved id.
    Containment,
}

impl MatchPolicy {
    /// Lowercase policy name, as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Containment => "containment",
        }
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "containment" | "contains" | "substring" => Ok(Self::Containment),
            other => Err(crate::Error::validation(
                "match_policy",
                format!("unknown match policy `{other}` (expected `exact` or `containment`)"),
            )),
        }
    }
}

impl MatchPredicate for MatchPolicy {
    #[inline]
    fn matches(&self, retrieved: &str, ground_truth: &str) -> bool {
        match self {
            Self::Exact => retrieved == ground_truth,
            Self::Containment => retrieved.contains(ground_truth),
        }
    }

    fn is_exact(&self) -> bool {
        matches!(self, Self::Exact)
    }
}

impl<F> MatchPredicate for F
where
    F: Fn(&str, &str) -> bool,
{
    #[inline]
    fn matches(&self, retrieved: &str, ground_truth: &str) -> bool {
        self(retrieved, ground_truth)
    }
}
