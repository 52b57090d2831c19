//! Error types for roomodes-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationReport;

/// Fatal discovery failures. Per-file problems are warnings, not errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The modes root does not exist.
    #[error("modes directory not found: {path}")]
    RootNotFound { path: PathBuf },

    /// The modes root exists but is a file.
    #[error("modes root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The modes root could not be read (permissions, etc.).
    #[error("cannot read modes directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Strategy and option problems. Always raised before anything is written.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown ordering strategy '{name}'; expected one of: {valid}")]
    UnknownStrategy { name: String, valid: String },

    #[error("strategy '{strategy}' requires the '{option}' option")]
    MissingOption {
        strategy: &'static str,
        option: &'static str,
    },

    #[error("duplicate entry '{value}' in {option}")]
    DuplicateEntry { option: &'static str, value: String },

    #[error("{option} names '{slug}', which was not discovered")]
    UnknownSlug { option: &'static str, slug: String },

    #[error("custom_order does not cover discovered modes: {}", missing.join(", "))]
    IncompleteCustomOrder { missing: Vec<String> },

    #[error("unknown category '{value}'; expected one of: core, enhanced, specialized, discovered")]
    UnknownCategory { value: String },

    #[error("unknown validation level '{value}'; expected 'normal' or 'strict'")]
    UnknownValidationLevel { value: String },

    #[error("invalid slug pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unknown option '{key}' in strategy config {path}")]
    UnknownOption { path: PathBuf, key: String },

    #[error("cannot read strategy config {path}: {source}")]
    StrategyFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse strategy config {path}: {source}")]
    StrategyFileParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One or more modes failed validation. Carries every report, never truncated.
#[derive(Debug)]
pub struct ValidationError {
    pub reports: Vec<ValidationReport>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed: Vec<&ValidationReport> =
            self.reports.iter().filter(|r| !r.is_valid()).collect();
        write!(f, "{} mode(s) failed validation", failed.len())?;
        for report in failed {
            for error in &report.errors {
                write!(f, "\n  {} ({}): {}", report.slug, report.path.display(), error)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DiscoveryError {
    DiscoveryError::Io {
        path: path.into(),
        source,
    }
}
