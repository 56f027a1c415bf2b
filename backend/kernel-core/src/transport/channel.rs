use crate::error::transport::TransportError;
use crate::transport::connect::connect_with_backoff;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use bytes::Bytes;
use log::{debug, trace, warn};
use tokio::time::timeout;
use zeromq::{DealerSocket, Socket, SocketRecv, SocketSend, SubSocket, ZmqMessage};

const SUBSCRIBE_ALL: &str = "";

/// Request channel: DEALER socket on the kernel's shell port.
pub type RequestChannel = Channel<DealerSocket>;

/// Broadcast channel: SUB socket on the kernel's iopub port, no topic filter.
pub type BroadcastChannel = Channel<SubSocket>;

/// A connected socket plus at most one message received ahead by [`Channel::pollable`].
pub struct Channel<S> {
    socket: S,
    endpoint: String,
    pending: Option<Vec<Bytes>>,
}

impl Channel<DealerSocket> {
    /// Connect a request channel to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Timeout`] if the kernel does not accept within `connect_timeout`.
    pub async fn connect(endpoint: &str, connect_timeout: Duration) -> Result<Self, TransportError> {
        let mut socket = DealerSocket::new();
        connect_with_backoff(&mut socket, endpoint, connect_timeout).await?;
        Ok(Self::from_socket(socket, endpoint))
    }
}

impl Channel<SubSocket> {
    /// Connect a broadcast channel to `endpoint` and subscribe to everything.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Timeout`] if the kernel does not accept within `connect_timeout`
    /// - [`TransportError::Connect`] if the subscription cannot be registered
    pub async fn connect(endpoint: &str, connect_timeout: Duration) -> Result<Self, TransportError> {
        let mut socket = SubSocket::new();
        connect_with_backoff(&mut socket, endpoint, connect_timeout).await?;

        socket
            .subscribe(SUBSCRIBE_ALL)
            .await
            .map_err(|e| TransportError::Connect {
                endpoint: endpoint.to_string(),
                message: format!("Failed to subscribe: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self::from_socket(socket, endpoint))
    }
}

impl<S: Socket> Channel<S> {
    fn from_socket(socket: S, endpoint: &str) -> Self {
        Self {
            socket,
            endpoint: endpoint.to_string(),
            pending: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Close the socket, logging any errors reported while shutting down.
    pub async fn close(self) {
        let endpoint = self.endpoint;
        for e in self.socket.close().await {
            warn!("Error closing socket for {endpoint}: {e}");
        }
        debug!("Closed channel to {endpoint}");
    }
}

impl<S: SocketSend> Channel<S> {
    /// Send one multipart message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] if the frame list is empty or the socket fails.
    pub async fn send(&mut self, frames: Vec<Bytes>) -> Result<(), TransportError> {
        let message = ZmqMessage::try_from(frames).map_err(|e| TransportError::Send {
            message: format!("Cannot send empty message: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.socket
            .send(message)
            .await
            .map_err(|e| TransportError::Send {
                message: format!("Failed to send to {}: {e}", self.endpoint),
                location: ErrorLocation::from(Location::caller()),
            })?;

        trace!("Sent message to {}", self.endpoint);
        Ok(())
    }
}

impl<S: SocketRecv> Channel<S> {
    /// Whether a message is ready, waiting at most `wait`.
    ///
    /// A message received while polling is kept and returned by the next
    /// [`Channel::recv`], so polling never drops data.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Recv`] if the socket fails.
    pub async fn pollable(&mut self, wait: Duration) -> Result<bool, TransportError> {
        if self.pending.is_some() {
            return Ok(true);
        }

        match timeout(wait, self.socket.recv()).await {
            Ok(Ok(message)) => {
                self.pending = Some(message.into_vec());
                Ok(true)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Ok(false),
        }
    }

    /// Block until the next message arrives.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Recv`] if the socket fails.
    pub async fn recv(&mut self) -> Result<Vec<Bytes>, TransportError> {
        if let Some(frames) = self.pending.take() {
            return Ok(frames);
        }

        let message = self.socket.recv().await?;
        Ok(message.into_vec())
    }
}
