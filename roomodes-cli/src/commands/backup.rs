//! `roomodes backup`, `roomodes restore`, `roomodes list-backups`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, ValueEnum};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use roomodes_sync::{
    paths, BackupKind, BackupManager, BackupOutcome, BackupRecord, RestoreSelector,
};

use super::{project_dir_or_cwd, GlobalOpts};

/// Which artifact(s) a backup command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Local,
    Global,
    Custom,
    All,
}

impl KindArg {
    fn kinds(self) -> Vec<BackupKind> {
        match self {
            KindArg::Local => vec![BackupKind::Local],
            KindArg::Global => vec![BackupKind::Global],
            KindArg::Custom => vec![BackupKind::Custom],
            KindArg::All => BackupKind::ALL.to_vec(),
        }
    }
}

/// Location flags shared by the backup commands.
#[derive(Args, Debug)]
pub struct LocationArgs {
    /// Project holding .roomodes and the cache/ backup directories [default: current dir].
    #[arg(short = 'p', long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Global custom_modes.yaml [env: ROO_MODES_CONFIG].
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl LocationArgs {
    fn manager(&self) -> Result<BackupManager> {
        let project_dir = project_dir_or_cwd(self.project_dir.as_deref())?;
        let manager = BackupManager::new(project_dir);
        // Only global backups need this path; resolve it best-effort.
        Ok(match paths::global_artifact_path(self.config.as_deref()) {
            Ok(path) => manager.with_global_artifact(path),
            Err(e) => {
                tracing::debug!("global artifact path unavailable: {e}");
                manager
            }
        })
    }
}

// ---------------------------------------------------------------------------
// backup
// ---------------------------------------------------------------------------

/// Arguments for `roomodes backup`.
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Artifact to back up.
    #[arg(short = 't', long = "kind", value_enum, default_value = "all")]
    pub kind: KindArg,

    #[command(flatten)]
    pub location: LocationArgs,
}

impl BackupArgs {
    pub fn run(self, _global: &GlobalOpts) -> Result<()> {
        let manager = self.location.manager()?;
        for kind in self.kind.kinds() {
            let outcome = manager
                .backup(kind)
                .with_context(|| format!("{kind} backup failed"))?;
            match outcome {
                BackupOutcome::Created(record) => println!(
                    "✓ {kind} backup #{} → {}",
                    record.number,
                    record.path.display()
                ),
                BackupOutcome::NothingToBackup { source, .. } => println!(
                    "{} {kind}: nothing to back up ({} does not exist)",
                    "·".bright_black(),
                    source.display()
                ),
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// restore
// ---------------------------------------------------------------------------

/// Arguments for `roomodes restore`.
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Artifact to restore.
    #[arg(short = 't', long = "kind", value_enum, default_value = "local")]
    pub kind: KindArg,

    /// Backup number to restore [default: latest].
    #[arg(long, value_name = "N", conflicts_with = "file")]
    pub number: Option<u32>,

    /// Restore from this backup file.
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub location: LocationArgs,
}

impl RestoreArgs {
    pub fn run(self, _global: &GlobalOpts) -> Result<()> {
        let selector = match (self.number, self.file) {
            (Some(n), _) => RestoreSelector::Number(n),
            (None, Some(file)) => RestoreSelector::Path(file),
            (None, None) => RestoreSelector::Latest,
        };
        if self.kind == KindArg::All && matches!(selector, RestoreSelector::Path(_)) {
            bail!("--file needs a single --kind (local, global or custom)");
        }

        let manager = self.location.manager()?;
        let kinds = self.kind.kinds();
        if kinds.len() > 1 {
            // Every kind needs a usable backup before any artifact is replaced.
            let missing: Vec<String> = kinds
                .iter()
                .filter_map(|&kind| {
                    manager
                        .resolve_source(kind, &selector)
                        .err()
                        .map(|e| format!("{kind}: {e}"))
                })
                .collect();
            if !missing.is_empty() {
                bail!(
                    "nothing restored; no usable backup for:\n  {}",
                    missing.join("\n  ")
                );
            }
        }

        for kind in kinds {
            let restored = manager
                .restore(kind, &selector)
                .with_context(|| format!("{kind} restore failed"))?;
            println!("✓ {kind} restored → {}", restored.display());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// list-backups
// ---------------------------------------------------------------------------

/// Arguments for `roomodes list-backups`.
#[derive(Args, Debug)]
pub struct ListBackupsArgs {
    /// Which backups to list.
    #[arg(short = 't', long = "kind", value_enum, default_value = "all")]
    pub kind: KindArg,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub location: LocationArgs,
}

#[derive(Tabled)]
struct BackupTableRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "#")]
    number: u32,
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "size")]
    size: String,
    #[tabled(rename = "modified")]
    modified: String,
}

impl ListBackupsArgs {
    pub fn run(self, _global: &GlobalOpts) -> Result<()> {
        let manager = self.location.manager()?;
        let mut records: Vec<BackupRecord> = Vec::new();
        for kind in self.kind.kinds() {
            records.extend(
                manager
                    .list(kind)
                    .with_context(|| format!("failed to list {kind} backups"))?,
            );
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&records).context("failed to serialize backups")?
            );
            return Ok(());
        }

        if records.is_empty() {
            println!(
                "No backups found in {}.",
                manager.project_dir().join(paths::CACHE_DIR).display()
            );
            return Ok(());
        }

        let rows: Vec<BackupTableRow> = records
            .iter()
            .map(|r| BackupTableRow {
                kind: r.kind.to_string(),
                number: r.number,
                file: file_name(&r.path),
                size: human_size(r.size),
                modified: r
                    .modified
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}
