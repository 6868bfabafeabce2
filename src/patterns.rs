//! Pattern Files
//!
//! YAML file holding the user's template patterns:
//!
//! ```yaml
//! patterns:
//!   - "{company}{year}"
//!   - "{word}{sep}{company}"
//! ```

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::PatternError;

/// File name used by `init` and by `generate` when none is given.
pub const DEFAULT_PATTERNS_FILE: &str = "patterns.yaml";

/// Patterns used when no pattern file exists.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "{company}{year}",
    "{company}@{year}",
    "{company}#{year}",
    "{company}{sep}{word}",
    "{word}{sep}{company}",
    "admin{sep}{year}",
    "{company}2024",
    "{company}2025",
    "{word}123",
    "{company}!",
];

/// On-disk layout of a pattern file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFile {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl PatternFile {
    pub fn defaults() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Load the pattern list from a YAML file.
pub fn load_patterns(path: impl AsRef<Path>) -> Result<Vec<String>, PatternError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| PatternError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: PatternFile = serde_yaml::from_str(&content).map_err(|source| PatternError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.patterns)
}

/// Load patterns, substituting [`DEFAULT_PATTERNS`] when the file is missing.
///
/// A missing file is only tolerated when `explicit` is false (the path is the
/// default one rather than named by the user).
pub fn load_patterns_or_default(
    path: impl AsRef<Path>,
    explicit: bool,
) -> Result<Vec<String>, PatternError> {
    let path = path.as_ref();
    match load_patterns(path) {
        Ok(patterns) => {
            tracing::info!(path = %path.display(), count = patterns.len(), "Loaded patterns");
            Ok(patterns)
        }
        Err(e) if e.is_not_found() && !explicit => {
            tracing::info!(path = %path.display(), "Pattern file not found, using built-in patterns");
            Ok(PatternFile::defaults().patterns)
        }
        Err(e) => Err(e),
    }
}

/// Write the default pattern file. Returns `false` without touching anything
/// when the file already exists.
pub fn write_default_patterns(path: impl AsRef<Path>) -> Result<bool, PatternError> {
    let path = path.as_ref();
    let write_err = |source: std::io::Error| PatternError::Write {
        path: path.to_path_buf(),
        source,
    };

    let yaml = serde_yaml::to_string(&PatternFile::defaults()).map_err(|source| {
        PatternError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(write_err(e)),
    };
    file.write_all(yaml.as_bytes()).map_err(write_err)?;
    Ok(true)
}
