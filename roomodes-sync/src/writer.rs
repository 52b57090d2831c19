//! Hash-gated atomic writer.
//!
//! ## `write_atomic` protocol
//!
//! 1. Normalise line endings to LF.
//! 2. SHA-256 the new content and whatever is on disk.
//! 3. Identical → `Unchanged`, the file is not touched (mtime preserved).
//! 4. Dry run → `WouldWrite`.
//! 5. Write `<path>.roomodes.tmp` next to the target.
//! 6. Rename over the target (atomic on POSIX); remove the tmp on failure.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::WriteError;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped, on-disk content already matches.
    Unchanged { path: PathBuf },
    /// Dry run: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    /// True when the target differs (or would differ) from what was on disk.
    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

// ---------------------------------------------------------------------------
// Digest helpers
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 of `content`.
pub fn content_digest(content: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(content);
    hex::encode(h.finalize())
}

pub(crate) fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

/// Digest of the current file, `None` when it does not exist.
fn existing_digest(path: &Path) -> Result<Option<String>, WriteError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            Ok(Some(content_digest(normalize_line_endings(&text).as_bytes())))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(WriteError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Whether writing `content` to `path` would change the file.
pub fn would_change(path: &Path, content: &str) -> Result<bool, WriteError> {
    let digest = content_digest(normalize_line_endings(content).as_bytes());
    Ok(existing_digest(path)?.as_deref() != Some(digest.as_str()))
}

// ---------------------------------------------------------------------------
// write_atomic
// ---------------------------------------------------------------------------

fn tmp_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.roomodes.tmp", path.display()))
}

/// Atomically replace `path` with `content` unless it already holds it.
pub fn write_atomic(path: &Path, content: &str, dry_run: bool) -> Result<WriteResult, WriteError> {
    let content = normalize_line_endings(content);

    if !would_change(path, &content)? {
        debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    replace_file(path, content.as_bytes(), &tmp_path_for(path))?;

    info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Replaces `path` with exactly `bytes`, no comparison and no normalisation.
pub fn replace_atomic(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    replace_file(path, bytes, &tmp_path_for(path))
}

/// Writes `bytes` to `tmp`, then renames it over `path`.
fn replace_file(path: &Path, bytes: &[u8], tmp: &Path) -> Result<(), WriteError> {
    let fail = |p: &Path, source| WriteError {
        path: p.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| fail(parent, e))?;
    }
    std::fs::write(tmp, bytes).map_err(|e| fail(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(fail(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
