//! Environment-based overrides.

use std::env;
use std::path::PathBuf;

use log::{info, trace, warn};

/// Overrides the configured kernel directory.
pub const KERNEL_DIR_ENV: &str = "KERNEL_DIR";

/// Load `.env` from the working directory, then from the executable's directory.
///
/// Returns the file that was loaded, if any. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {}", path.display());
        return Some(path);
    }

    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let env_path = exe_dir.join(".env");
    if !env_path.exists() {
        trace!("No .env found");
        return None;
    }

    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            info!("Loaded .env from: {}", env_path.display());
            Some(env_path)
        }
        Err(e) => {
            warn!("Failed to parse .env at {}: {e}", env_path.display());
            None
        }
    }
}

pub(crate) fn kernel_dir_override() -> Option<PathBuf> {
    env::var_os(KERNEL_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
