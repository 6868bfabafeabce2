//! Generator Configuration
//!
//! Length bounds, year range, count ceiling and leetspeak toggle for one run.
//! Loadable from YAML; every field has a default so a config file only needs
//! to name what it changes.
//!
//! ```yaml
//! min_length: 6
//! max_length: 14
//! min_year: 2022
//! max_year: 2025
//! limit: all        # or a number
//! leet: true
//! shuffle_seed: 42
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Inclusive bounds accepted for the year range.
pub const MIN_SUPPORTED_YEAR: i32 = 1900;
pub const MAX_SUPPORTED_YEAR: i32 = 2100;

/// Default ceiling when none is configured.
pub const DEFAULT_LIMIT: usize = 10_000;

/// Count ceiling for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLimit")]
pub enum CountLimit {
    /// Stop after this many candidates; output order is shuffled.
    Bounded(usize),
    /// Emit everything in deterministic generation order.
    Unbounded,
}

impl Default for CountLimit {
    fn default() -> Self {
        CountLimit::Bounded(DEFAULT_LIMIT)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Count(usize),
    Keyword(String),
}

impl TryFrom<RawLimit> for CountLimit {
    type Error = String;

    fn try_from(raw: RawLimit) -> Result<Self, Self::Error> {
        match raw {
            RawLimit::Count(n) => Ok(CountLimit::Bounded(n)),
            RawLimit::Keyword(k) if k.eq_ignore_ascii_case("all") => Ok(CountLimit::Unbounded),
            RawLimit::Keyword(k) => Err(format!("invalid limit '{}': expected a number or 'all'", k)),
        }
    }
}

/// Per-run generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Shortest candidate emitted (characters, inclusive)
    pub min_length: usize,
    /// Longest candidate emitted (characters, inclusive)
    pub max_length: usize,
    /// First year of the suffix range
    pub min_year: i32,
    /// Last year of the suffix range (inclusive)
    pub max_year: i32,
    /// Count ceiling, or unbounded full enumeration
    pub limit: CountLimit,
    /// Enable leetspeak expansion
    pub leet: bool,
    /// Seed for shuffling and heuristics; current time when absent
    pub shuffle_seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_length: 4,
            max_length: 16,
            min_year: 2020,
            max_year: 2025,
            limit: CountLimit::default(),
            leet: false,
            shuffle_seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check bounds. Called by the pipeline before any generation happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_length == 0 {
            return Err(ConfigError::ZeroMinLength);
        }
        if self.max_length < self.min_length {
            return Err(ConfigError::InvalidLength {
                min: self.min_length,
                max: self.max_length,
            });
        }
        for year in [self.min_year, self.max_year] {
            if !(MIN_SUPPORTED_YEAR..=MAX_SUPPORTED_YEAR).contains(&year) {
                return Err(ConfigError::YearOutOfRange(year));
            }
        }
        if self.max_year < self.min_year {
            return Err(ConfigError::InvalidYearRange {
                min: self.min_year,
                max: self.max_year,
            });
        }
        if self.limit == CountLimit::Bounded(0) {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }

    /// Years of the configured range, ascending.
    pub fn years(&self) -> Vec<i32> {
        (self.min_year..=self.max_year).collect()
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit == CountLimit::Unbounded
    }

    /// The count ceiling, `None` in unbounded mode.
    pub fn ceiling(&self) -> Option<usize> {
        match self.limit {
            CountLimit::Bounded(n) => Some(n),
            CountLimit::Unbounded => None,
        }
    }
}
