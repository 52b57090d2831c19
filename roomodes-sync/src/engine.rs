//! Sync orchestration: discovery → validation → ordering → merge → write.
//!
//! [`ModeSync`] holds the settings shared by every run (modes root, category
//! table, validation level, backup root); [`ModeSync::sync`] runs one pass
//! against a [`SyncTarget`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use roomodes_core::{
    discover, CategorizedModeSet, Category, CategoryTable, DiscoveryOptions, DiscoveryOutcome,
    ModeSource, OrderingOptions, Slug, Strategy, ValidationError, ValidationLevel,
    ValidationReport, Validator,
};

use crate::artifact::render_artifact;
use crate::backup::{BackupKind, BackupManager, BackupOutcome, BackupRecord};
use crate::error::SyncError;
use crate::paths;
use crate::restrictions::check_existing_artifact;
use crate::writer::{content_digest, would_change, write_atomic, WriteResult};

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// Where a sync writes its artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// The host application's user-wide settings file.
    Global { config_path: PathBuf },
    /// `<project_dir>/.roomodes`
    Local { project_dir: PathBuf },
}

impl SyncTarget {
    pub fn output_path(&self) -> PathBuf {
        match self {
            SyncTarget::Global { config_path } => config_path.clone(),
            SyncTarget::Local { project_dir } => paths::local_artifact_path(project_dir),
        }
    }

    pub fn backup_kind(&self) -> BackupKind {
        match self {
            SyncTarget::Global { .. } => BackupKind::Global,
            SyncTarget::Local { .. } => BackupKind::Local,
        }
    }

    pub fn mode_source(&self) -> ModeSource {
        match self {
            SyncTarget::Global { .. } => ModeSource::Global,
            SyncTarget::Local { .. } => ModeSource::Local,
        }
    }

    /// Backup manager for this target. Global backups live under
    /// `backup_root`; local backups live inside the target project.
    pub fn backup_manager(&self, backup_root: &Path) -> BackupManager {
        match self {
            SyncTarget::Global { config_path } => {
                BackupManager::new(backup_root).with_global_artifact(config_path)
            }
            SyncTarget::Local { project_dir } => BackupManager::new(project_dir),
        }
    }

    pub fn backup_dir(&self, backup_root: &Path) -> PathBuf {
        self.backup_manager(backup_root).backup_dir(self.backup_kind())
    }
}

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub strategy: String,
    pub options: OrderingOptions,
    pub create_backup: bool,
    pub dry_run: bool,
    /// Drop invalid modes with a warning instead of aborting.
    pub skip_invalid: bool,
}

impl Default for SyncRequest {
    fn default() -> Self {
        Self {
            strategy: Strategy::default().name().to_owned(),
            options: OrderingOptions::default(),
            create_backup: true,
            dry_run: false,
            skip_invalid: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub target: PathBuf,
    pub strategy: Strategy,
    /// Slugs in the order written.
    pub modes: Vec<Slug>,
    pub categories: Vec<Category>,
    pub backup: Option<BackupRecord>,
    pub write: WriteResult,
    /// SHA-256 of the rendered artifact.
    pub digest: String,
    pub warnings: Vec<String>,
    pub rendered: String,
}

impl SyncReport {
    pub fn modes_written(&self) -> usize {
        self.modes.len()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ModeSync {
    modes_dir: PathBuf,
    backup_root: PathBuf,
    recursive: bool,
    table: CategoryTable,
    validator: Validator,
}

impl ModeSync {
    /// Backups for global targets default to the parent of `modes_dir`.
    pub fn new(modes_dir: impl Into<PathBuf>) -> Self {
        let modes_dir = modes_dir.into();
        let backup_root = modes_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            modes_dir,
            backup_root,
            recursive: true,
            table: CategoryTable::default(),
            validator: Validator::default(),
        }
    }

    pub fn with_backup_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.backup_root = root.into();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_category_table(mut self, table: CategoryTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_validation_level(mut self, level: ValidationLevel) -> Self {
        self.validator = Validator::new(level);
        self
    }

    pub fn modes_dir(&self) -> &Path {
        &self.modes_dir
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    pub fn discover(&self, source: ModeSource) -> Result<DiscoveryOutcome, SyncError> {
        let options = DiscoveryOptions {
            recursive: self.recursive,
            source,
        };
        Ok(discover(&self.modes_dir, &self.table, &options)?)
    }

    /// One report per discovered mode, plus one failed report per
    /// duplicate-slug rejection.
    pub fn validate(&self, outcome: &DiscoveryOutcome) -> Vec<ValidationReport> {
        let mut reports = self.validator.validate_all(outcome.modes.iter());
        reports.extend(outcome.rejected.iter().map(|r| {
            ValidationReport::failed(r.mode.slug.clone(), r.mode.origin.clone(), r.reason())
        }));
        reports
    }

    /// Runs one sync pass. Nothing is written unless every check passes.
    pub fn sync(&self, target: &SyncTarget, request: &SyncRequest) -> Result<SyncReport, SyncError> {
        let outcome = self.discover(target.mode_source())?;
        let mut warnings: Vec<String> = outcome
            .warnings
            .iter()
            .map(|w| format!("skipped {}: {}", w.path.display(), w.reason))
            .collect();

        let reports = self.validate(&outcome);
        for report in &reports {
            warnings.extend(report.warnings.iter().map(|w| format!("{}: {w}", report.slug)));
        }
        let modes = self.accepted_modes(outcome, &reports, request.skip_invalid, &mut warnings)?;

        let strategy = Strategy::from_name(&request.strategy)?;
        let ordered = strategy.order(&modes, &request.options)?;
        if ordered.is_empty() {
            return Err(SyncError::NoModes {
                root: self.modes_dir.clone(),
            });
        }

        let rendered = render_artifact(&ordered)?;
        let digest = content_digest(rendered.as_bytes());
        let path = target.output_path();

        for change in check_existing_artifact(&path, &rendered) {
            warn!(target = %path.display(), "{change}");
            warnings.push(change);
        }

        let mut backup = None;
        if request.create_backup && !request.dry_run && would_change(&path, &rendered)? {
            let manager = target.backup_manager(&self.backup_root);
            if let BackupOutcome::Created(record) = manager.backup(target.backup_kind())? {
                backup = Some(record);
            }
        }

        let write = write_atomic(&path, &rendered, request.dry_run)?;

        let mut categories: Vec<Category> = ordered.iter().map(|m| m.category).collect();
        categories.sort();
        categories.dedup();

        info!(
            target = %path.display(),
            strategy = %strategy,
            modes = ordered.len(),
            "sync finished: {:?}",
            write
        );

        Ok(SyncReport {
            target: path,
            strategy,
            modes: ordered.into_iter().map(|m| m.slug).collect(),
            categories,
            backup,
            write,
            digest,
            warnings,
            rendered,
        })
    }

    fn accepted_modes(
        &self,
        outcome: DiscoveryOutcome,
        reports: &[ValidationReport],
        skip_invalid: bool,
        warnings: &mut Vec<String>,
    ) -> Result<CategorizedModeSet, SyncError> {
        if reports.iter().all(ValidationReport::is_valid) {
            return Ok(outcome.modes);
        }
        if !skip_invalid {
            return Err(ValidationError {
                reports: reports.to_vec(),
            }
            .into());
        }

        let invalid: HashSet<&Path> = reports
            .iter()
            .filter(|r| !r.is_valid())
            .map(|r| r.path.as_path())
            .collect();
        for report in reports.iter().filter(|r| !r.is_valid()) {
            warn!(slug = %report.slug, path = %report.path.display(), "dropping invalid mode");
            warnings.push(format!(
                "dropped invalid mode '{}' ({}): {}",
                report.slug,
                report.path.display(),
                report.errors.join("; ")
            ));
        }
        let mut modes = outcome.modes;
        modes.retain(|m| !invalid.contains(m.origin.as_path()));
        Ok(modes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
