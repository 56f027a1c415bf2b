use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TerminationError {
    #[error("Termination Error: {message} {location}")]
    Kill {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Termination Wait Error: {message} {location}")]
    Wait {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Termination Error: process {pid} still running after forced kill {location}")]
    StillRunning { pid: u32, location: ErrorLocation },
}
