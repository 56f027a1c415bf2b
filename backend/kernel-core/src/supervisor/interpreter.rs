//! Interpreter-name recognition for portable kernel specs.
//!
//! Kernel specs are often written with a bare `python3` as their first
//! argument. That name is swapped for a concrete interpreter so the same spec
//! works across installations.

use std::env;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Interpreter names that are replaced with a resolved runtime path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizedInterpreter {
    Python,
    Python3,
}

/// The complete set of recognized launch names, compared case-insensitively.
const RECOGNIZED_NAMES: [(&str, RecognizedInterpreter); 4] = [
    ("python", RecognizedInterpreter::Python),
    ("python3", RecognizedInterpreter::Python3),
    ("python.exe", RecognizedInterpreter::Python),
    ("python3.exe", RecognizedInterpreter::Python3),
];

/// Executables searched on PATH, in order, when no interpreter is configured.
const PATH_CANDIDATES: [&str; 2] = ["python3", "python"];

impl RecognizedInterpreter {
    /// Recognize a launch argument. Paths and versioned names are not matched.
    pub fn recognize(arg: &str) -> Option<Self> {
        RECOGNIZED_NAMES
            .iter()
            .find(|(name, _)| arg.eq_ignore_ascii_case(name))
            .map(|(_, interpreter)| *interpreter)
    }
}

/// Resolve the runtime that replaces a recognized interpreter name.
///
/// Uses `configured` when set, otherwise the first of `python3` / `python`
/// found on `PATH`.
pub fn resolve_runtime(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }

    let found = PATH_CANDIDATES.iter().find_map(|name| find_on_path(name));
    match &found {
        Some(path) => debug!("Resolved interpreter runtime {}", path.display()),
        None => warn!("No interpreter found on PATH (tried {PATH_CANDIDATES:?})"),
    }
    found
}

/// First executable file named `name` on `PATH`.
pub(crate) fn find_on_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .flat_map(|dir| executable_names(name).into_iter().map(move |n| dir.join(n)))
        .find(|candidate| is_executable(candidate))
}

fn executable_names(name: &str) -> Vec<String> {
    if cfg!(windows) {
        vec![format!("{name}.exe"), name.to_string()]
    } else {
        vec![name.to_string()]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
