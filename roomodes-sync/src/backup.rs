//! Numbered backups of mode artifacts.
//!
//! # Layout
//!
//! ```text
//! <project>/cache/
//!   roo_modes_local_backup/
//!     .roomodes_1 .roomodes_2 ...        (local artifact)
//!   roo_modes_global_backup/
//!     .roomodes_1 ...                    (global artifact)
//!     custom_modes_1.yaml ...            (<project>/custom_modes.yaml)
//! ```
//!
//! Numbers are per kind, start at 1 and are always `max + 1`; gaps left by
//! deleted backups are never refilled. Numbering reads the directory and
//! then writes, so two concurrent backups of the same kind may collide.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{backup_io_err, BackupError};
use crate::paths;
use crate::writer::replace_atomic;

// ---------------------------------------------------------------------------
// Kinds and records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    Local,
    Global,
    Custom,
}

impl BackupKind {
    pub const ALL: [BackupKind; 3] = [BackupKind::Local, BackupKind::Global, BackupKind::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackupKind::Local => "local",
            BackupKind::Global => "global",
            BackupKind::Custom => "custom",
        }
    }

    /// `(prefix, suffix)` of backup file names for this kind.
    fn file_affixes(&self) -> (&'static str, &'static str) {
        match self {
            BackupKind::Local | BackupKind::Global => (".roomodes_", ""),
            BackupKind::Custom => ("custom_modes_", ".yaml"),
        }
    }

    fn file_name(&self, number: u32) -> String {
        let (prefix, suffix) = self.file_affixes();
        format!("{prefix}{number}{suffix}")
    }

    /// Backup number encoded in `name`, if it is one of this kind's files.
    fn parse_number(&self, name: &str) -> Option<u32> {
        let (prefix, suffix) = self.file_affixes();
        let digits = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackupKind {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackupKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BackupError::UnknownKind {
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    pub kind: BackupKind,
    pub number: u32,
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl BackupRecord {
    fn from_path(kind: BackupKind, number: u32, path: PathBuf) -> Result<Self, BackupError> {
        let meta = std::fs::metadata(&path).map_err(|e| backup_io_err(&path, e))?;
        let modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok(Self {
            kind,
            number,
            path,
            size: meta.len(),
            modified,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Created(BackupRecord),
    /// The artifact to back up does not exist.
    NothingToBackup { kind: BackupKind, source: PathBuf },
}

/// Which backup [`BackupManager::restore`] should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreSelector {
    Latest,
    Number(u32),
    Path(PathBuf),
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BackupManager {
    project_dir: PathBuf,
    global_artifact: Option<PathBuf>,
}

impl BackupManager {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            global_artifact: None,
        }
    }

    /// Sets where the global artifact lives; required for [`BackupKind::Global`].
    pub fn with_global_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_artifact = Some(path.into());
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn backup_dir(&self, kind: BackupKind) -> PathBuf {
        match kind {
            BackupKind::Local => paths::local_backup_dir(&self.project_dir),
            BackupKind::Global | BackupKind::Custom => paths::global_backup_dir(&self.project_dir),
        }
    }

    /// The live artifact a kind backs up and restores into.
    pub fn artifact_path(&self, kind: BackupKind) -> Result<PathBuf, BackupError> {
        match kind {
            BackupKind::Local => Ok(paths::local_artifact_path(&self.project_dir)),
            BackupKind::Custom => Ok(paths::secondary_artifact_path(&self.project_dir)),
            BackupKind::Global => self
                .global_artifact
                .clone()
                .ok_or(BackupError::NoGlobalConfig),
        }
    }

    /// Copies the current artifact of `kind` to the next numbered slot.
    pub fn backup(&self, kind: BackupKind) -> Result<BackupOutcome, BackupError> {
        let source = self.artifact_path(kind)?;
        if !source.is_file() {
            debug!(kind = %kind, source = %source.display(), "nothing to back up");
            return Ok(BackupOutcome::NothingToBackup { kind, source });
        }

        let dir = self.backup_dir(kind);
        std::fs::create_dir_all(&dir).map_err(|e| backup_io_err(&dir, e))?;
        let number = self.next_number(kind)?;
        let dest = dir.join(kind.file_name(number));
        std::fs::copy(&source, &dest).map_err(|e| backup_io_err(&dest, e))?;

        info!(kind = %kind, number, path = %dest.display(), "backup created");
        Ok(BackupOutcome::Created(BackupRecord::from_path(
            kind, number, dest,
        )?))
    }

    /// Restores a backup over the live artifact. The backup file is kept.
    pub fn restore(&self, kind: BackupKind, selector: &RestoreSelector) -> Result<PathBuf, BackupError> {
        let target = self.artifact_path(kind)?;
        let source = self.resolve_source(kind, selector)?;

        let bytes = std::fs::read(&source).map_err(|e| backup_io_err(&source, e))?;
        replace_atomic(&target, &bytes)?;

        info!(kind = %kind, from = %source.display(), to = %target.display(), "backup restored");
        Ok(target)
    }

    /// The backup file `selector` picks for `kind`, without touching the
    /// live artifact. Fails the same way [`restore`](Self::restore) would.
    pub fn resolve_source(
        &self,
        kind: BackupKind,
        selector: &RestoreSelector,
    ) -> Result<PathBuf, BackupError> {
        self.artifact_path(kind)?;
        let source = match selector {
            RestoreSelector::Path(path) => {
                if !path.is_file() {
                    return Err(BackupError::FileNotFound { path: path.clone() });
                }
                path.clone()
            }
            RestoreSelector::Latest => self
                .list(kind)?
                .pop()
                .map(|r| r.path)
                .ok_or_else(|| self.not_found(kind))?,
            RestoreSelector::Number(n) => self
                .list(kind)?
                .into_iter()
                .find(|r| r.number == *n)
                .map(|r| r.path)
                .ok_or_else(|| self.not_found(kind))?,
        };
        Ok(source)
    }

    /// Backups of `kind` sorted by number; empty when the directory is absent.
    pub fn list(&self, kind: BackupKind) -> Result<Vec<BackupRecord>, BackupError> {
        let dir = self.backup_dir(kind);
        if !dir.is_dir() {
            return Ok(vec![]);
        }
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| backup_io_err(&dir, e))? {
            let entry = entry.map_err(|e| backup_io_err(&dir, e))?;
            let name = entry.file_name();
            let Some(number) = name.to_str().and_then(|n| kind.parse_number(n)) else {
                continue;
            };
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                records.push(BackupRecord::from_path(kind, number, entry.path())?);
            }
        }
        records.sort_by_key(|r| r.number);
        Ok(records)
    }

    /// Backups of every kind, grouped by kind in [`BackupKind::ALL`] order.
    pub fn list_all(&self) -> Result<Vec<BackupRecord>, BackupError> {
        let mut all = Vec::new();
        for kind in BackupKind::ALL {
            all.extend(self.list(kind)?);
        }
        Ok(all)
    }

    fn next_number(&self, kind: BackupKind) -> Result<u32, BackupError> {
        match self.list(kind)?.last() {
            None => Ok(1),
            Some(last) => last
                .number
                .checked_add(1)
                .ok_or_else(|| BackupError::NumberingExhausted {
                    kind,
                    dir: self.backup_dir(kind),
                }),
        }
    }

    fn not_found(&self, kind: BackupKind) -> BackupError {
        BackupError::NotFound {
            kind,
            dir: self.backup_dir(kind),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
