pub mod codec;
pub mod config;
pub mod descriptor;
pub mod kernelspec;
pub mod launch;
pub mod termination;
pub mod transport;

pub use codec::CodecError;
pub use config::ConfigError;
pub use descriptor::DescriptorError;
pub use kernelspec::KernelSpecError;
pub use launch::LaunchError;
pub use termination::TerminationError;
pub use transport::TransportError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use thiserror::Error;

/// Failure of a complete run: descriptor, launch, request, drain, terminate.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    KernelSpec(#[from] KernelSpecError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Termination(#[from] TerminationError),

    #[error("Timeout Error: kernel did not become idle within {timeout:?} {location}")]
    Timeout {
        timeout: Duration,
        location: ErrorLocation,
    },

    #[error("Cancelled Error: run cancelled before kernel became idle {location}")]
    Cancelled { location: ErrorLocation },

    #[error("Kernel Died Error: {message} {location}")]
    KernelDied {
        message: String,
        location: ErrorLocation,
    },
}

impl RunError {
    #[track_caller]
    pub fn timeout(timeout: Duration) -> Self {
        RunError::Timeout {
            timeout,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn cancelled() -> Self {
        RunError::Cancelled {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn kernel_died(message: impl Into<String>) -> Self {
        RunError::KernelDied {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether the kernel must be force-killed rather than asked to stop.
    pub fn requires_forced_termination(&self) -> bool {
        matches!(
            self,
            RunError::Timeout { .. } | RunError::Cancelled { .. } | RunError::KernelDied { .. }
        )
    }
}
