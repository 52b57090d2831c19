//! Subcommand implementations. Each `XxxArgs::run` is a thin adapter over
//! `roomodes-core` / `roomodes-sync`.

pub mod backup;
pub mod list;
pub mod sync;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use roomodes_core::ValidationLevel;
use roomodes_sync::{paths, ModeSync};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    pub modes_dir: PathBuf,
    pub recursive: bool,
}

impl GlobalOpts {
    pub fn resolve(modes_dir: Option<PathBuf>, recursive: bool) -> Self {
        Self {
            modes_dir: paths::modes_dir(modes_dir.as_deref()),
            recursive,
        }
    }

    /// Engine for the modes directory. `level` overrides `ROO_MODES_VALIDATION_LEVEL`.
    pub fn engine(&self, level: Option<ValidationLevel>) -> Result<ModeSync> {
        let level = match level {
            Some(level) => level,
            None => paths::validation_level().context("invalid ROO_MODES_VALIDATION_LEVEL")?,
        };
        Ok(ModeSync::new(&self.modes_dir)
            .recursive(self.recursive)
            .with_validation_level(level))
    }
}

/// `explicit`, or the current directory.
pub fn project_dir_or_cwd(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("could not determine current directory"),
    }
}

/// Prints non-fatal findings to stderr.
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
}
