use crate::error::termination::TerminationError;
use crate::supervisor::launch::KernelProcess;

use common::ErrorLocation;

use std::panic::Location;
use std::process::ExitStatus;
use std::time::Duration;

use log::{debug, info, trace, warn};
use sysinfo::{Pid, ProcessesToUpdate, Signal, System};
use tokio::time::timeout as TokioTimeout;

/// How a kernel process came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Already gone before termination was requested.
    AlreadyExited(ExitStatus),

    /// Stopped within the grace period after a termination signal.
    Graceful(ExitStatus),

    /// Killed after the grace period elapsed or without a grace period.
    Forced(ExitStatus),
}

impl Termination {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Termination::AlreadyExited(status)
            | Termination::Graceful(status)
            | Termination::Forced(status) => *status,
        }
    }
}

/// Stop a kernel and reap it.
///
/// Sends a termination signal and waits up to `grace` for the process to
/// exit; if it is still running afterwards it is killed. A `grace` of zero
/// kills immediately. Calling this on a process that has already exited
/// returns [`Termination::AlreadyExited`].
///
/// # Errors
///
/// - [`TerminationError::Wait`] if the process status cannot be collected
/// - [`TerminationError::Kill`] if the forced kill fails
/// - [`TerminationError::StillRunning`] if the process survives the kill
pub async fn terminate(
    process: &mut KernelProcess,
    grace: Duration,
) -> Result<Termination, TerminationError> {
    let location = ErrorLocation::from(Location::caller());

    if let Some(status) = process.exit_status {
        trace!("Kernel {:?} already reaped ({status})", process.pid());
        return Ok(Termination::AlreadyExited(status));
    }

    match process.child.try_wait() {
        Ok(Some(status)) => {
            debug!("Kernel {:?} had already exited ({status})", process.pid());
            process.exit_status = Some(status);
            return Ok(Termination::AlreadyExited(status));
        }
        Ok(None) => {}
        Err(e) => {
            return Err(TerminationError::Wait {
                message: format!("Failed to poll kernel {:?}: {e}", process.pid()),
                location,
                source: e,
            });
        }
    }

    if !grace.is_zero() && send_terminate_signal(process.pid()) {
        match TokioTimeout(grace, process.child.wait()).await {
            Ok(Ok(status)) => {
                info!("Kernel {:?} stopped gracefully ({status})", process.pid());
                process.exit_status = Some(status);
                return Ok(Termination::Graceful(status));
            }
            Ok(Err(e)) => {
                return Err(TerminationError::Wait {
                    message: format!("Failed to wait for kernel {:?}: {e}", process.pid()),
                    location,
                    source: e,
                });
            }
            Err(_) => {
                warn!(
                    "Kernel {:?} still running after {grace:?}, killing",
                    process.pid()
                );
            }
        }
    }

    force_kill(process, location).await
}

/// Kill the kernel without a grace period and reap it.
///
/// # Errors
///
/// See [`terminate`].
pub async fn kill(process: &mut KernelProcess) -> Result<Termination, TerminationError> {
    terminate(process, Duration::ZERO).await
}

async fn force_kill(
    process: &mut KernelProcess,
    location: ErrorLocation,
) -> Result<Termination, TerminationError> {
    let pid = process.pid();

    // `kill` also waits for the process, so the child is reaped here.
    if let Err(e) = process.child.kill().await {
        return Err(TerminationError::Kill {
            message: format!("Failed to kill kernel {pid:?}: {e}"),
            location,
            source: e,
        });
    }

    match process.child.try_wait() {
        Ok(Some(status)) => {
            info!("Kernel {pid:?} killed ({status})");
            process.exit_status = Some(status);
            Ok(Termination::Forced(status))
        }
        Ok(None) => Err(TerminationError::StillRunning {
            pid: pid.unwrap_or_default(),
            location,
        }),
        Err(e) => Err(TerminationError::Wait {
            message: format!("Failed to reap kernel {pid:?}: {e}"),
            location,
            source: e,
        }),
    }
}

/// Ask the process to stop. Returns `false` when no signal could be delivered,
/// in which case the caller falls back to a forced kill.
fn send_terminate_signal(pid: Option<u32>) -> bool {
    let Some(pid) = pid else {
        return false;
    };

    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    match sys.process(pid).map(|p| p.kill_with(Signal::Term)) {
        Some(Some(sent)) => {
            debug!("Sent SIGTERM to kernel {pid}: success={sent}");
            sent
        }
        Some(None) => {
            debug!("SIGTERM unsupported on this platform for kernel {pid}");
            false
        }
        None => {
            debug!("Kernel {pid} not found in process table");
            false
        }
    }
}
