//! Error types for roomodes-sync.

use std::path::PathBuf;

use thiserror::Error;

use roomodes_core::{ConfigurationError, DiscoveryError, ValidationError};

use crate::backup::BackupKind;

/// A failed temp-file-then-rename write. The previous file is left intact.
#[derive(Debug, Error)]
#[error("failed to write {path}: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Nothing left to write after discovery and filtering.
    #[error("no valid modes found under {root}; refusing to write an empty configuration")]
    NoModes { root: PathBuf },

    #[error("failed to serialize modes: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("backup failed: {0}")]
    Backup(#[from] BackupError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass an explicit config path")]
    HomeNotFound,
}

/// Errors from the backup manager.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("no {kind} backup found in {dir}")]
    NotFound { kind: BackupKind, dir: PathBuf },

    /// The highest existing backup number is already `u32::MAX`.
    #[error("no {kind} backup numbers left in {dir}; remove old backups first")]
    NumberingExhausted { kind: BackupKind, dir: PathBuf },

    #[error("backup file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("no global configuration path set for this backup manager")]
    NoGlobalConfig,

    #[error("unknown backup kind '{value}'; expected local, global or custom")]
    UnknownKind { value: String },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`BackupError::Io`].
pub(crate) fn backup_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BackupError {
    BackupError::Io {
        path: path.into(),
        source,
    }
}
