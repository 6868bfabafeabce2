//! Error types
//!
//! Only configuration problems stop a run before it starts. Everything a
//! collaborator can get wrong (locale, keyword source, pattern file) has its
//! own error type so the caller can decide whether to degrade or abort.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid generator configuration, detected before generation begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("minimum length must be greater than 0")]
    ZeroMinLength,

    #[error("maximum length {max} is smaller than minimum length {min}")]
    InvalidLength { min: usize, max: usize },

    #[error("year {0} is outside the supported range 1900-2100")]
    YearOutOfRange(i32),

    #[error("maximum year {max} is smaller than minimum year {min}")]
    InvalidYearRange { min: i32, max: i32 },

    #[error("candidate limit must be greater than 0 (use unbounded mode to disable it)")]
    ZeroLimit,

    #[error("no seed source: provide an organization name or at least one word")]
    NoSeedSource,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Errors surfaced by the candidate pipeline.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("candidate producer failed: {0}")]
    Producer(String),
}

/// Pattern file loading and writing errors.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to read pattern file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pattern file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write pattern file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PatternError {
    /// True when the underlying failure is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PatternError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Locale provider errors.
#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("unknown language '{0}' (try pt-br or en-us)")]
    UnknownLanguage(String),

    #[error("failed to parse locale data for '{language}': {source}")]
    Parse {
        language: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Keyword source errors.
#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("invalid target '{target}': {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("target responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("access blocked or captcha detected at {0}")]
    Blocked(String),
}

/// Output reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::InvalidLength { min: 8, max: 4 };
        assert_eq!(
            err.to_string(),
            "maximum length 4 is smaller than minimum length 8"
        );

        let err: GenerateError = ConfigError::NoSeedSource.into();
        assert!(err.to_string().contains("no seed source"));
    }

    #[test]
    fn test_pattern_error_not_found() {
        let err = PatternError::Read {
            path: PathBuf::from("missing.yaml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_not_found());

        let err = PatternError::Read {
            path: PathBuf::from("denied.yaml"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(!err.is_not_found());
    }
}
