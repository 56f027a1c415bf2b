//! Kernel specs (`kernel.json`) and the directories they are discovered in.
//!
//! See <https://jupyter-client.readthedocs.io/en/latest/kernels.html#kernel-specs>
//! for the format.

use crate::error::kernelspec::KernelSpecError;

use common::ErrorLocation;

use std::collections::BTreeMap;
use std::env;
use std::fs::{read_dir, read_to_string};
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub const KERNEL_SPEC_FILE_NAME: &str = "kernel.json";
const KERNELS_DIR_NAME: &str = "kernels";
const JUPYTER_PATH_ENV: &str = "JUPYTER_PATH";
const JUPYTER_DATA_DIR_ENV: &str = "JUPYTER_DATA_DIR";

/// How the kernel wants to be interrupted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterruptMode {
    /// Interrupts are delivered as a signal.
    #[default]
    Signal,

    /// Interrupts are sent as messages on the control socket.
    Message,
}

/// Parsed `kernel.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KernelSpec {
    /// Launch command; may contain the `{connection_file}` placeholder.
    pub argv: Vec<String>,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub interrupt_mode: InterruptMode,

    /// Extra environment for the kernel process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl KernelSpec {
    /// Load `<kernel_dir>/kernel.json`.
    ///
    /// # Errors
    ///
    /// - [`KernelSpecError::Read`] if the file is missing or unreadable
    /// - [`KernelSpecError::Parse`] if it is not valid JSON for a spec
    /// - [`KernelSpecError::Validation`] if `argv` is empty
    #[track_caller]
    pub fn load(kernel_dir: &Path) -> Result<Self, KernelSpecError> {
        let path = kernel_dir.join(KERNEL_SPEC_FILE_NAME);

        let contents = read_to_string(&path).map_err(|e| KernelSpecError::Read {
            location: ErrorLocation::from(Location::caller()),
            path: path.clone(),
            source: e,
        })?;

        let spec: KernelSpec =
            serde_json::from_str(&contents).map_err(|e| KernelSpecError::Parse {
                location: ErrorLocation::from(Location::caller()),
                path: path.clone(),
                reason: e.to_string(),
            })?;

        spec.validate(&path)?;

        debug!("Loaded kernel spec '{}' from {}", spec.display_name, path.display());
        Ok(spec)
    }

    #[track_caller]
    fn validate(&self, path: &Path) -> Result<(), KernelSpecError> {
        if self.argv.is_empty() || self.argv[0].trim().is_empty() {
            return Err(KernelSpecError::Validation {
                location: ErrorLocation::from(Location::caller()),
                path: path.to_path_buf(),
                reason: "argv must name an executable".to_string(),
            });
        }
        Ok(())
    }
}

/// Ordered search path for kernel data directories.
///
/// `JUPYTER_PATH` entries first, then the user data dir, then the optional
/// interpreter prefix, then system-wide locations.
pub fn data_search_paths(interpreter_prefix: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(jupyter_path) = env::var_os(JUPYTER_PATH_ENV) {
        paths.extend(env::split_paths(&jupyter_path));
    }

    match env::var_os(JUPYTER_DATA_DIR_ENV) {
        Some(data_dir) => paths.push(PathBuf::from(data_dir)),
        None => {
            if let Some(data_dir) = dirs::data_dir() {
                paths.push(data_dir.join("jupyter"));
            }
        }
    }

    if let Some(prefix) = interpreter_prefix {
        paths.push(prefix.join("share").join("jupyter"));
    }

    #[cfg(unix)]
    paths.extend([
        PathBuf::from("/usr/share/jupyter"),
        PathBuf::from("/usr/local/share/jupyter"),
    ]);

    #[cfg(windows)]
    if let Some(program_data) = env::var_os("ProgramData") {
        paths.push(PathBuf::from(program_data).join("jupyter"));
    }

    paths
}

/// List every loadable kernel spec on the search path.
///
/// Unreadable directories and malformed specs are skipped.
pub fn list_kernels(interpreter_prefix: Option<&Path>) -> Vec<(PathBuf, KernelSpec)> {
    data_search_paths(interpreter_prefix)
        .iter()
        .flat_map(|dir| list_kernels_in(dir))
        .collect()
}

/// List kernel specs under `<data_dir>/kernels/*/kernel.json`.
pub fn list_kernels_in(data_dir: &Path) -> Vec<(PathBuf, KernelSpec)> {
    let kernels_dir = data_dir.join(KERNELS_DIR_NAME);
    let Ok(entries) = read_dir(&kernels_dir) else {
        trace!("No kernels directory at {}", kernels_dir.display());
        return Vec::new();
    };

    let mut kernels: Vec<(PathBuf, KernelSpec)> = entries
        .flatten()
        .filter_map(|entry| {
            let dir = entry.path();
            match KernelSpec::load(&dir) {
                Ok(spec) => Some((dir, spec)),
                Err(e) => {
                    debug!("Skipping kernel at {}: {e}", dir.display());
                    None
                }
            }
        })
        .collect();

    kernels.sort_by(|a, b| a.0.cmp(&b.0));
    kernels
}
