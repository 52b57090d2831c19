//! Filesystem layout and environment configuration.
//!
//! Every resolver has a pure `_from`/`_at` form taking explicit inputs; the
//! short form reads the process environment and home directory. Tests call
//! the pure forms only.

use std::path::{Path, PathBuf};

use roomodes_core::{ConfigurationError, ValidationLevel};

use crate::error::SyncError;

pub const ENV_MODES_DIR: &str = "ROO_MODES_DIR";
pub const ENV_CONFIG_PATH: &str = "ROO_MODES_CONFIG";
pub const ENV_VALIDATION_LEVEL: &str = "ROO_MODES_VALIDATION_LEVEL";

pub const LOCAL_ARTIFACT: &str = ".roomodes";
pub const GLOBAL_ARTIFACT: &str = "custom_modes.yaml";
/// Project-level copy of the global artifact, backed up as `custom`.
pub const SECONDARY_ARTIFACT: &str = "custom_modes.yaml";

pub const DEFAULT_MODES_DIR: &str = "modes";
pub const CACHE_DIR: &str = "cache";
pub const LOCAL_BACKUP_DIR: &str = "roo_modes_local_backup";
pub const GLOBAL_BACKUP_DIR: &str = "roo_modes_global_backup";

pub const HOST_EXTENSION_ID: &str = "rooveterinaryinc.roo-cline";
/// Editor flavours checked for the global settings directory, in order.
pub const EDITOR_APPS: &[&str] = &["Code", "VSCodium", "code", "code-insiders"];

// ---------------------------------------------------------------------------
// Project layout
// ---------------------------------------------------------------------------

pub fn local_artifact_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LOCAL_ARTIFACT)
}

pub fn secondary_artifact_path(project_dir: &Path) -> PathBuf {
    project_dir.join(SECONDARY_ARTIFACT)
}

pub fn local_backup_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(CACHE_DIR).join(LOCAL_BACKUP_DIR)
}

pub fn global_backup_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(CACHE_DIR).join(GLOBAL_BACKUP_DIR)
}

// ---------------------------------------------------------------------------
// Global artifact
// ---------------------------------------------------------------------------

/// `<home>/.config/<app>/User/globalStorage/<extension>/settings/custom_modes.yaml`
pub fn global_artifact_path_at(home: &Path, app: &str) -> PathBuf {
    home.join(".config")
        .join(app)
        .join("User")
        .join("globalStorage")
        .join(HOST_EXTENSION_ID)
        .join("settings")
        .join(GLOBAL_ARTIFACT)
}

/// First existing candidate among [`EDITOR_APPS`], else the `Code` path.
pub fn default_global_artifact_path_at(home: &Path) -> PathBuf {
    EDITOR_APPS
        .iter()
        .map(|app| global_artifact_path_at(home, app))
        .find(|p| p.exists())
        .unwrap_or_else(|| global_artifact_path_at(home, EDITOR_APPS[0]))
}

/// Explicit override, then the env value, then the default under `home`.
pub fn global_artifact_path_from(
    explicit: Option<&Path>,
    env_value: Option<&str>,
    home: Option<&Path>,
) -> Result<PathBuf, SyncError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(value));
    }
    home.map(default_global_artifact_path_at)
        .ok_or(SyncError::HomeNotFound)
}

/// [`global_artifact_path_from`] against the real environment.
pub fn global_artifact_path(explicit: Option<&Path>) -> Result<PathBuf, SyncError> {
    let env_value = std::env::var(ENV_CONFIG_PATH).ok();
    global_artifact_path_from(explicit, env_value.as_deref(), dirs::home_dir().as_deref())
}

// ---------------------------------------------------------------------------
// Modes directory and validation level
// ---------------------------------------------------------------------------

pub fn modes_dir_from(explicit: Option<&Path>, env_value: Option<&str>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| {
            env_value
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODES_DIR))
}

pub fn modes_dir(explicit: Option<&Path>) -> PathBuf {
    let env_value = std::env::var(ENV_MODES_DIR).ok();
    modes_dir_from(explicit, env_value.as_deref())
}

pub fn validation_level_from(env_value: Option<&str>) -> Result<ValidationLevel, ConfigurationError> {
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(value) => value.parse(),
        None => Ok(ValidationLevel::default()),
    }
}

pub fn validation_level() -> Result<ValidationLevel, ConfigurationError> {
    let env_value = std::env::var(ENV_VALIDATION_LEVEL).ok();
    validation_level_from(env_value.as_deref())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
