use kernel_core::error::{ConfigError, RunError};

use common::ErrorLocation;

use thiserror::Error;

/// Errors surfaced by the `kernel-runner` binary.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Error from this app (logger setup, directories)
    #[error("Runner Error: {message} {location}")]
    Runner {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error from a kernel run (launch, transport, timeout, etc.)
    #[error(transparent)]
    Run(#[from] RunError),
}
