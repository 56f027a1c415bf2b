use common::ErrorLocation;

use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum KernelSpecError {
    #[error("Kernel Spec Read Error: {path}: {source} {location}")]
    Read {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("Kernel Spec Parse Error: {path}: {reason} {location}")]
    Parse {
        location: ErrorLocation,
        path: PathBuf,
        reason: String,
    },

    #[error("Kernel Spec Validation Error: {path}: {reason} {location}")]
    Validation {
        location: ErrorLocation,
        path: PathBuf,
        reason: String,
    },
}
