//! # roomodes-sync
//!
//! Sync engine, atomic artifact writer and numbered backups.
//!
//! Build a [`ModeSync`] for a modes directory and call [`ModeSync::sync`]
//! with a [`SyncTarget`]. Drive [`BackupManager`] directly for manual
//! backup and restore.

pub mod artifact;
pub mod backup;
pub mod diff;
pub mod engine;
pub mod error;
pub mod paths;
pub mod restrictions;
pub mod writer;

pub use artifact::render_artifact;
pub use backup::{BackupKind, BackupManager, BackupOutcome, BackupRecord, RestoreSelector};
pub use diff::{diff_artifact, FileDiff};
pub use engine::{ModeSync, SyncReport, SyncRequest, SyncTarget};
pub use error::{BackupError, SyncError, WriteError};
pub use restrictions::{restricted_groups, restriction_changes, RestrictedGroup};
pub use writer::WriteResult;
