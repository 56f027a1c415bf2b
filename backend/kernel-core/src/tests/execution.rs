// Unit tests for the execution state machine and event mapping

use crate::execution::{ExecutionState, ExecutionTracker, KernelEvent};
use crate::session::Session;
use crate::wire::{
    ErrorContent, KernelMessage, KernelMessageType, KernelStatus, MessageCodec,
};

use common::RedactedKey;

use serde_json::{Value, json};

fn message(msg_type: KernelMessageType, content: Value) -> KernelMessage {
    let codec = MessageCodec::new(Session::new(RedactedKey::new("k"))).unwrap();
    let frames = codec.encode(msg_type, &content, None, None).unwrap().frames;
    MessageCodec::decode(frames).unwrap()
}

fn status(state: KernelStatus) -> KernelEvent {
    KernelEvent::Status {
        execution_state: state,
    }
}

/// **VALUE**: Verifies busy followed by idle finishes the run in the idle state.
#[test]
fn given_busy_then_idle_when_observed_then_finished_idle() {
    // GIVEN: A fresh tracker (assumed busy once the request is sent)
    let mut tracker = ExecutionTracker::new();
    assert_eq!(tracker.state(), ExecutionState::Busy);

    // WHEN: Observing busy then idle
    assert_eq!(tracker.observe(status(KernelStatus::Busy)), ExecutionState::Busy);
    assert!(!tracker.is_finished());
    let state = tracker.observe(status(KernelStatus::Idle));

    // THEN: Idle and finished
    assert_eq!(state, ExecutionState::Idle);
    assert!(tracker.is_finished());
}

/// **VALUE**: Verifies an error report does not end the run on its own.
///
/// **WHY THIS MATTERS**: The kernel always follows an error with an idle status. Stopping
/// at the error would terminate the kernel before it finishes publishing.
///
/// **BUG THIS CATCHES**: Would catch treating `error` as a terminal state.
#[test]
fn given_error_between_busy_and_idle_when_observed_then_state_unchanged_until_idle() {
    // GIVEN: A tracker that has seen busy
    let mut tracker = ExecutionTracker::new();
    tracker.observe(status(KernelStatus::Busy));

    // WHEN: An error arrives
    let state = tracker.observe(KernelEvent::Error(ErrorContent {
        ename: "NameError".to_string(),
        evalue: "name 'x' is not defined".to_string(),
        traceback: vec![],
    }));

    // THEN: Still busy, then idle ends it
    assert_eq!(state, ExecutionState::Busy);
    assert!(!tracker.is_finished());
    assert_eq!(tracker.observe(status(KernelStatus::Idle)), ExecutionState::Idle);
}

/// **VALUE**: Verifies unknown message types are recorded but never change state.
#[test]
fn given_unknown_event_when_observed_then_state_unchanged() {
    // GIVEN: A busy tracker
    let mut tracker = ExecutionTracker::new();

    // WHEN: An unknown event arrives
    let state = tracker.observe(KernelEvent::Unknown {
        msg_type: KernelMessageType::from("comm_open"),
    });

    // THEN: Still busy, event recorded
    assert_eq!(state, ExecutionState::Busy);
    assert_eq!(tracker.into_outcome().events.len(), 1);
}

/// **VALUE**: Verifies `starting` counts as busy and `dead` as a terminal error.
#[test]
fn given_lifecycle_statuses_when_mapped_then_starting_busy_and_dead_terminal() {
    assert_eq!(ExecutionState::from(KernelStatus::Starting), ExecutionState::Busy);
    assert_eq!(ExecutionState::from(KernelStatus::Dead), ExecutionState::TerminalError);

    let mut tracker = ExecutionTracker::new();
    assert_eq!(
        tracker.observe(status(KernelStatus::Dead)),
        ExecutionState::TerminalError
    );
    assert!(tracker.is_finished());
}

/// **VALUE**: Verifies the outcome keeps events in order and collects plain-text results.
#[test]
fn given_full_execution_when_observed_then_outcome_has_ordered_events_and_results() {
    // GIVEN: The messages of one execution
    let events = [
        message(KernelMessageType::Status, json!({"execution_state": "busy"})),
        message(
            KernelMessageType::ExecuteInput,
            json!({"code": "99 * 10 + 1", "execution_count": 1}),
        ),
        message(
            KernelMessageType::ExecuteResult,
            json!({"execution_count": 1, "data": {"text/plain": "991"}, "metadata": {}}),
        ),
        message(KernelMessageType::Status, json!({"execution_state": "idle"})),
    ]
    .iter()
    .map(|m| KernelEvent::from_message(m).unwrap())
    .collect::<Vec<_>>();

    // WHEN: Observing all of them
    let mut tracker = ExecutionTracker::new();
    for event in events.iter().cloned() {
        tracker.observe(event);
    }
    let outcome = tracker.into_outcome();

    // THEN: Ordered events, one result, idle
    assert_eq!(outcome.events, events);
    assert_eq!(outcome.results, vec!["991".to_string()]);
    assert_eq!(outcome.final_state, ExecutionState::Idle);
}

/// **VALUE**: Verifies content that does not match its declared type is a decode error.
///
/// **BUG THIS CATCHES**: Would catch a status message with an unknown execution state
/// being mapped to a default state instead of being skipped.
#[test]
fn given_mismatched_content_when_mapped_then_decode_error() {
    // GIVEN: Malformed status and stream messages
    let bad_status = message(KernelMessageType::Status, json!({"execution_state": "sleeping"}));
    let bad_stream = message(KernelMessageType::Stream, json!({"name": "stdout"}));

    // WHEN / THEN: Both fail to map
    assert!(KernelEvent::from_message(&bad_status).is_err());
    assert!(KernelEvent::from_message(&bad_stream).is_err());
}

/// **VALUE**: Verifies types outside the handled set map to `Unknown`.
#[test]
fn given_display_data_when_mapped_then_unknown_event() {
    // GIVEN: A known-but-unhandled type
    let msg = message(KernelMessageType::DisplayData, json!({"data": {}}));

    // WHEN: Mapping
    let event = KernelEvent::from_message(&msg).unwrap();

    // THEN: Unknown with the tag preserved
    assert_eq!(
        event,
        KernelEvent::Unknown {
            msg_type: KernelMessageType::DisplayData
        }
    );
}
