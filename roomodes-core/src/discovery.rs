//! Mode discovery: walk a directory, parse each YAML file into a [`Mode`].
//!
//! A file that cannot be read or parsed is skipped and reported as a
//! [`DiscoveryWarning`]. Only problems with the root itself are fatal.
//!
//! Traversal is sorted by file name, so the order of modes within a category
//! is stable for a given directory snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::category::CategoryTable;
use crate::error::{io_err, DiscoveryError};
use crate::types::{CategorizedModeSet, Mode, ModeSource};

/// File extensions treated as mode files.
pub const MODE_FILE_EXTENSIONS: &[&str] = &["yaml", "yml"];

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub recursive: bool,
    pub source: ModeSource,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            source: ModeSource::Global,
        }
    }
}

/// A file that was skipped during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    pub path: PathBuf,
    pub reason: String,
}

/// A mode whose slug was already claimed by an earlier file.
#[derive(Debug, Clone)]
pub struct RejectedMode {
    pub mode: Mode,
    pub first_definition: PathBuf,
}

impl RejectedMode {
    pub fn reason(&self) -> String {
        format!(
            "duplicate slug '{}' (first defined in {})",
            self.mode.slug,
            self.first_definition.display()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    pub root: PathBuf,
    pub modes: CategorizedModeSet,
    pub warnings: Vec<DiscoveryWarning>,
    pub rejected: Vec<RejectedMode>,
}

impl DiscoveryOutcome {
    /// True when no mode was accepted. Warnings and rejections do not count.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// 1. Single file
// ---------------------------------------------------------------------------

/// Parses one mode file. The error string is the human-readable skip reason.
pub fn load_mode_file(path: &Path) -> Result<Mode, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;
    if contents.trim().is_empty() {
        return Err("file is empty".to_owned());
    }
    let mut mode: Mode =
        serde_yaml::from_str(&contents).map_err(|e| format!("invalid mode YAML: {e}"))?;
    mode.origin = path.to_path_buf();
    Ok(mode)
}

fn is_mode_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MODE_FILE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// 2. Directory walk
// ---------------------------------------------------------------------------

/// Discovers every mode under `root`.
pub fn discover(
    root: &Path,
    table: &CategoryTable,
    options: &DiscoveryOptions,
) -> Result<DiscoveryOutcome, DiscoveryError> {
    let meta = match std::fs::metadata(root) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
        Err(e) => return Err(io_err(root, e)),
    };
    if !meta.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    std::fs::read_dir(root).map_err(|e| io_err(root, e))?;

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut outcome = DiscoveryOutcome {
        root: root.to_path_buf(),
        ..DiscoveryOutcome::default()
    };
    let mut first_seen: HashMap<String, PathBuf> = HashMap::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), "skipping unreadable entry: {e}");
                outcome.warnings.push(DiscoveryWarning {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_mode_file(entry.path()) {
            continue;
        }
        let path = entry.path();

        let mut mode = match load_mode_file(path) {
            Ok(mode) => mode,
            Err(reason) => {
                warn!(path = %path.display(), "skipping mode file: {reason}");
                outcome.warnings.push(DiscoveryWarning {
                    path: path.to_path_buf(),
                    reason,
                });
                continue;
            }
        };
        mode.source = options.source;
        mode.category = table.categorize(mode.slug.as_str());

        if !mode.slug.as_str().is_empty() {
            if let Some(first) = first_seen.get(mode.slug.as_str()) {
                warn!(slug = %mode.slug, path = %path.display(), "duplicate slug rejected");
                outcome.rejected.push(RejectedMode {
                    mode,
                    first_definition: first.clone(),
                });
                continue;
            }
            first_seen.insert(mode.slug.0.clone(), path.to_path_buf());
        }

        debug!(slug = %mode.slug, category = %mode.category, path = %path.display(), "discovered mode");
        outcome.modes.insert(mode);
    }

    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
