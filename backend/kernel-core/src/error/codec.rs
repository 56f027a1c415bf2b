use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Sign Error: {message} {location}")]
    Sign {
        message: String,
        location: ErrorLocation,
    },

    #[error("Signature Mismatch Error: {message} {location}")]
    SignatureMismatch {
        message: String,
        location: ErrorLocation,
    },
}

impl CodecError {
    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        CodecError::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn encode(message: impl Into<String>) -> Self {
        CodecError::Encode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn sign(message: impl Into<String>) -> Self {
        CodecError::Sign {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn signature_mismatch(message: impl Into<String>) -> Self {
        CodecError::SignatureMismatch {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Per-message failures are skipped by the receive loop; the rest abort.
    pub fn is_per_message(&self) -> bool {
        matches!(
            self,
            CodecError::Decode { .. } | CodecError::SignatureMismatch { .. }
        )
    }
}
