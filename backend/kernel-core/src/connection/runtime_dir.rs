//! Platform-aware detection of the runtime directory for connection files.
//!
//! Lookup order:
//! 1. Explicit directory from configuration
//! 2. JUPYTER_RUNTIME_DIR environment variable
//! 3. Platform data directory via `dirs` crate + `jupyter/runtime`

use crate::error::descriptor::DescriptorError;

use common::ErrorLocation;

use std::env;
use std::fs::create_dir_all;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info};

pub const RUNTIME_DIR_ENV: &str = "JUPYTER_RUNTIME_DIR";
const JUPYTER_DIR_NAME: &str = "jupyter";
const RUNTIME_DIR_NAME: &str = "runtime";

/// Resolve the directory connection files are written to.
///
/// # Errors
///
/// Returns [`DescriptorError::RuntimeDir`] if no directory can be determined.
#[track_caller]
pub fn resolve_runtime_dir(configured: Option<&Path>) -> Result<PathBuf, DescriptorError> {
    if let Some(dir) = configured {
        debug!("Using configured runtime dir {}", dir.display());
        return Ok(dir.to_path_buf());
    }

    if let Ok(dir) = env::var(RUNTIME_DIR_ENV) {
        info!("Using {RUNTIME_DIR_ENV} override: {dir}");
        return Ok(PathBuf::from(dir));
    }

    dirs::data_dir()
        .map(|d| d.join(JUPYTER_DIR_NAME).join(RUNTIME_DIR_NAME))
        .ok_or_else(|| DescriptorError::RuntimeDir {
            message: format!("No platform data directory and {RUNTIME_DIR_ENV} is unset"),
            location: ErrorLocation::from(Location::caller()),
        })
}

#[track_caller]
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), DescriptorError> {
    create_dir_all(dir).map_err(|e| DescriptorError::Write {
        location: ErrorLocation::from(Location::caller()),
        path: dir.to_path_buf(),
        source: e,
    })
}
