use crate::error::transport::TransportError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace};
use tokio::time::{sleep, timeout};
use zeromq::Socket;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_INITIAL_INTERVAL: Duration = Duration::from_millis(50);
const CONNECT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Connect `socket` to `endpoint`, retrying until the kernel has bound it.
///
/// # Errors
///
/// Returns [`TransportError::Timeout`] if the endpoint does not accept a
/// connection within `max_elapsed`.
pub(crate) async fn connect_with_backoff<S: Socket>(
    socket: &mut S,
    endpoint: &str,
    max_elapsed: Duration,
) -> Result<(), TransportError> {
    let mut backoff = ExponentialBackoff {
        current_interval: CONNECT_INITIAL_INTERVAL,
        initial_interval: CONNECT_INITIAL_INTERVAL,
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };

    debug!("Connecting to {endpoint}");

    loop {
        let attempt = timeout(CONNECT_ATTEMPT_TIMEOUT, socket.connect(endpoint)).await;

        let failure = match attempt {
            Ok(Ok(())) => {
                debug!("Connected to {endpoint}");
                return Ok(());
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("attempt exceeded {CONNECT_ATTEMPT_TIMEOUT:?}"),
        };

        match backoff.next_backoff() {
            Some(delay) => {
                trace!("Connect to {endpoint} failed ({failure}), retrying after {delay:?}");
                sleep(delay).await;
            }
            None => {
                return Err(TransportError::Timeout {
                    endpoint: endpoint.to_string(),
                    message: format!("not reachable within {max_elapsed:?}: {failure}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }
}
