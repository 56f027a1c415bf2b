//! Execution lifecycle tracking.
//!
//! Broadcast messages are mapped to [`KernelEvent`]s and fed to an
//! [`ExecutionTracker`], which follows the kernel's `status` reports until it
//! returns to idle.

pub mod event;

pub use event::KernelEvent;

use crate::wire::KernelStatus;

use log::{debug, warn};

/// Execution state as seen by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionState {
    /// Assumed as soon as the request is sent.
    #[default]
    Busy,

    /// The kernel finished the request (successfully or not).
    Idle,

    /// The kernel reported that it is gone.
    TerminalError,
}

impl ExecutionState {
    /// Whether the run loop stops in this state.
    pub fn is_final(self) -> bool {
        !matches!(self, ExecutionState::Busy)
    }
}

impl From<KernelStatus> for ExecutionState {
    fn from(status: KernelStatus) -> Self {
        match status {
            KernelStatus::Starting | KernelStatus::Busy => ExecutionState::Busy,
            KernelStatus::Idle => ExecutionState::Idle,
            KernelStatus::Dead => ExecutionState::TerminalError,
        }
    }
}

/// What a completed run observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionOutcome {
    /// Every event, in arrival order.
    pub events: Vec<KernelEvent>,

    pub final_state: ExecutionState,

    /// `text/plain` payloads of all execution results, in order.
    pub results: Vec<String>,
}

/// State machine over broadcast events. Only `status` events change state.
#[derive(Debug, Default)]
pub struct ExecutionTracker {
    outcome: ExecutionOutcome,
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ExecutionState {
        self.outcome.final_state
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.final_state.is_final()
    }

    /// Record `event` and return the resulting state.
    pub fn observe(&mut self, event: KernelEvent) -> ExecutionState {
        match &event {
            KernelEvent::Status { execution_state } => {
                let next = ExecutionState::from(*execution_state);
                if next != self.outcome.final_state {
                    debug!("Execution state {:?} -> {next:?}", self.outcome.final_state);
                }
                self.outcome.final_state = next;
            }
            KernelEvent::ExecuteResult(result) => {
                if let Some(text) = result.plain_text() {
                    self.outcome.results.push(text.to_string());
                }
            }
            KernelEvent::Error(error) => {
                warn!("Kernel reported {}: {}", error.ename, error.evalue);
            }
            KernelEvent::Unknown { msg_type } => {
                debug!("Ignoring unknown message type {msg_type}");
            }
            KernelEvent::Stream(_) | KernelEvent::ExecuteInput(_) => {}
        }

        self.outcome.events.push(event);
        self.outcome.final_state
    }

    pub fn into_outcome(self) -> ExecutionOutcome {
        self.outcome
    }
}
