use common::ErrorLocation;

use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DescriptorError {
    #[error("Descriptor Write Error: {path}: {source} {location}")]
    Write {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("Descriptor Read Error: {path}: {source} {location}")]
    Read {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("Descriptor Parse Error: {path}: {reason} {location}")]
    Parse {
        location: ErrorLocation,
        path: PathBuf,
        reason: String,
    },

    #[error("Descriptor Serialize Error: {reason} {location}")]
    Serialize {
        location: ErrorLocation,
        reason: String,
    },

    #[error("Port Allocation Error: {message} {location}")]
    PortAllocation {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Runtime Directory Error: {message} {location}")]
    RuntimeDir {
        message: String,
        location: ErrorLocation,
    },
}
