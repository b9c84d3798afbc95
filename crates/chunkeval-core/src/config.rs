//! Evaluation configuration.
//!
//! Layered with figment, lowest priority first:
//! 1. Built-in defaults
//! 2. A TOML file (`chunkeval.toml` by default)
//! 3. Environment variables prefixed with `CHUNKEVAL_`
//!
//! ```toml
//! match_policy = "containment"
//! noise_penalty = 5.0
//! cutoff = 10
//! ```

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matching::MatchPolicy;
use crate::metrics::{check_noise_penalty, DEFAULT_NOISE_PENALTY};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "chunkeval.toml";

/// Prefix for environment overrides (`CHUNKEVAL_NOISE_PENALTY=2.5`).
pub const ENV_PREFIX: &str = "CHUNKEVAL_";

/// Scoring knobs shared by every query of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// How retrieved ids are matched against ground-truth ids.
    pub match_policy: MatchPolicy,
    /// Noise cost of a retrieved item that matches nothing.
    pub noise_penalty: f64,
    /// Default cutoff; `None` scores the full ranked list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::Exact,
            noise_penalty: DEFAULT_NOISE_PENALTY,
            cutoff: None,
        }
    }
}

impl EvalConfig {
    /// Loads defaults, then `chunkeval.toml` if present, then `CHUNKEVAL_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a layer fails to parse or validate.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment(DEFAULT_CONFIG_FILE))
    }

    /// Loads defaults, then the given TOML file, then `CHUNKEVAL_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file does not exist or cannot be
    /// extracted, and [`Error::Validation`] if a value is out of range.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        Self::from_figment(Self::figment(path))
    }

    /// The layered provider stack backing [`load`](Self::load) and [`from_file`](Self::from_file).
    #[must_use]
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extracts and validates a configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        tracing::debug!(
            match_policy = %config.match_policy,
            noise_penalty = config.noise_penalty,
            cutoff = ?config.cutoff,
            "Loaded evaluation config"
        );
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `noise_penalty` is negative or not
    /// finite, or if `cutoff` is zero.
    pub fn validate(&self) -> Result<()> {
        check_noise_penalty(self.noise_penalty)?;
        if self.cutoff == Some(0) {
            return Err(Error::validation("cutoff", "must be at least 1 when set"));
        }
        Ok(())
    }
}
