//! Error types for chunkeval-core.

use thiserror::Error;

/// Evaluation error types.
///
/// Degenerate inputs (empty rankings, empty ground truth, zero ideal gain)
/// are not errors: they score as zero.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Input shape or value rejected before scoring.
    #[error("Validation error on `{field}`: {reason}")]
    Validation {
        /// Name of the offending input field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Operation undefined for the given input (e.g. the mean of nothing).
    #[error("Domain error: {0}")]
    Domain(String),

    /// Configuration could not be loaded or extracted.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("relevancies", "expected 3 values, got 2");
        assert_eq!(
            err.to_string(),
            "Validation error on `relevancies`: expected 3 values, got 2"
        );
    }

    #[test]
    fn test_domain_error_display() {
        let err = Error::Domain("cannot average zero results".to_string());
        assert_eq!(err.to_string(), "Domain error: cannot average zero results");
    }

    #[test]
    fn test_error_from_figment() {
        let figment_err = figment::Error::from("missing field `noise_penalty`".to_string());
        let err: Error = figment_err.into();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("noise_penalty")));
    }
}
