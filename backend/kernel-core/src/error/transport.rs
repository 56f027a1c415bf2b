use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Connect Error: {endpoint}: {message} {location}")]
    Connect {
        endpoint: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect Timeout Error: {endpoint}: {message} {location}")]
    Timeout {
        endpoint: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Receive Error: {message} {location}")]
    Recv {
        message: String,
        location: ErrorLocation,
    },
}

impl From<zeromq::ZmqError> for TransportError {
    #[track_caller]
    fn from(error: zeromq::ZmqError) -> Self {
        TransportError::Recv {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
