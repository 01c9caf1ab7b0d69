//! Platform-specific data directory resolution.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "CONTEXTCORE_DATA_DIR";

/// Directory name under the platform data directory.
const APP_DIR_NAME: &str = "contextcore";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `CONTEXTCORE_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/contextcore`)
///
/// The directory is created if it does not exist.
pub fn data_root() -> Result<PathBuf, PathError> {
    resolve_data_root(env::var_os(DATA_DIR_ENV))
}

/// Resolve the data root from an override value (empty counts as unset).
fn resolve_data_root(override_dir: Option<OsString>) -> Result<PathBuf, PathError> {
    let root = match override_dir {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join(APP_DIR_NAME),
    };

    ensure_dir(&root)?;
    Ok(root)
}

/// Create `path` as a directory if needed.
pub(super) fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    tracing::debug!(path = %path.display(), "creating data directory");
    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
