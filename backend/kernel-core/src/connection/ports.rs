//! Ephemeral loopback port reservation.

use crate::KERNEL_EPHEMERAL_BIND;
use crate::error::descriptor::DescriptorError;

use common::ErrorLocation;

use std::io::{Error as IoError, ErrorKind};
use std::net::TcpListener;
use std::panic::Location;

use log::trace;

const MAX_ATTEMPTS_PER_PORT: usize = 16;

/// Reserve `N` distinct free loopback ports.
///
/// Each port is found by binding `127.0.0.1:0` and reading back the port the
/// OS picked. All listeners are held until every port is drawn, so the OS
/// cannot hand out the same port twice; they are released on return so the
/// kernel can bind them.
#[track_caller]
pub fn allocate_ports<const N: usize>() -> Result<[u16; N], DescriptorError> {
    let mut listeners = Vec::with_capacity(N);
    let mut ports = [0u16; N];

    for slot in ports.iter_mut() {
        let mut attempts = 0;
        *slot = loop {
            attempts += 1;
            let (port, listener) = bind_ephemeral()?;
            if !listeners.iter().any(|(p, _)| *p == port) {
                trace!("Reserved port {port}");
                listeners.push((port, listener));
                break port;
            }
            if attempts >= MAX_ATTEMPTS_PER_PORT {
                return Err(DescriptorError::PortAllocation {
                    message: format!("No distinct port after {MAX_ATTEMPTS_PER_PORT} attempts"),
                    location: ErrorLocation::from(Location::caller()),
                    source: IoError::new(ErrorKind::AddrInUse, "duplicate ephemeral port"),
                });
            }
        };
    }

    drop(listeners);
    Ok(ports)
}

#[track_caller]
fn bind_ephemeral() -> Result<(u16, TcpListener), DescriptorError> {
    let listener =
        TcpListener::bind(KERNEL_EPHEMERAL_BIND).map_err(|e| DescriptorError::PortAllocation {
            message: format!("Failed to bind {KERNEL_EPHEMERAL_BIND}: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

    let port = listener
        .local_addr()
        .map_err(|e| DescriptorError::PortAllocation {
            message: format!("Listener has no local address: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?
        .port();

    Ok((port, listener))
}
