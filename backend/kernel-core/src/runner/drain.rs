use crate::config::{InboundVerification, RunnerConfig};
use crate::error::RunError;
use crate::execution::{ExecutionOutcome, ExecutionState, ExecutionTracker, KernelEvent};
use crate::supervisor::KernelProcess;
use crate::transport::BroadcastChannel;
use crate::wire::MessageCodec;

use bytes::Bytes;
use log::{debug, info, trace, warn};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Receive broadcast messages until the kernel reports idle.
///
/// Each wait is bounded by the poll interval so kernel exit is noticed while
/// nothing is being published.
pub(super) async fn drain<F>(
    codec: &MessageCodec,
    broadcast: &mut BroadcastChannel,
    process: &mut KernelProcess,
    config: &RunnerConfig,
    cancel: &CancellationToken,
    mut on_event: F,
) -> Result<ExecutionOutcome, RunError>
where
    F: FnMut(&KernelEvent),
{
    let run_timeout = config.timing.run_timeout();
    let poll_interval = config.timing.poll_interval();
    let policy = config.security.inbound_verification;
    let deadline = Instant::now() + run_timeout;

    let mut tracker = ExecutionTracker::new();

    while !tracker.is_finished() {
        let now = Instant::now();
        if now >= deadline {
            return Err(RunError::timeout(run_timeout));
        }
        let wait = poll_interval.min(deadline - now);

        let ready = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RunError::cancelled()),
            ready = broadcast.pollable(wait) => ready?,
        };

        if !ready {
            if !process.is_running() {
                let status = process
                    .exit_status()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown status".to_string());
                return Err(RunError::kernel_died(format!(
                    "kernel exited ({status}) before becoming idle"
                )));
            }
            continue;
        }

        let frames = broadcast.recv().await?;
        let Some(event) = admit(codec, policy, frames) else {
            continue;
        };

        on_event(&event);
        if tracker.observe(event) == ExecutionState::TerminalError {
            return Err(RunError::kernel_died("kernel reported a dead status"));
        }
    }

    info!("Kernel is idle");
    Ok(tracker.into_outcome())
}

/// Verify, decode and map one message. Messages that fail are logged and dropped.
fn admit(
    codec: &MessageCodec,
    policy: InboundVerification,
    frames: Vec<Bytes>,
) -> Option<KernelEvent> {
    match policy {
        InboundVerification::Ignore => {}
        InboundVerification::Warn => {
            if let Err(e) = codec.verify(&frames) {
                warn!("Accepting unverified message: {e}");
            }
        }
        InboundVerification::Reject => {
            if let Err(e) = codec.verify(&frames) {
                warn!("Dropping unverified message: {e}");
                return None;
            }
        }
    }

    let message = match MessageCodec::decode(frames) {
        Ok(message) => message,
        Err(e) => {
            warn!("Skipping undecodable message: {e}");
            return None;
        }
    };

    trace!("Received {} ({})", message.header.msg_type, message.header.msg_id);

    match KernelEvent::from_message(&message) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!("Skipping message with bad content: {e}");
            None
        }
    }
}
