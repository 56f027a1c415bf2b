use kernel_core::error::{RunError, TerminationError};

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

/// **VALUE**: Verifies run-level errors record the caller's file and line.
///
/// **WHY THIS MATTERS**: Timeouts and kernel deaths are raised from several places in
/// the receive loop. The location tells which one fired.
#[test]
fn given_timeout_error_when_formatted_then_includes_duration_and_location() {
    // GIVEN: A timeout error created here
    let expected_line = line!() + 1;
    let err = RunError::timeout(Duration::from_millis(1500));

    // WHEN: Formatting
    let text = err.to_string();

    // THEN: Duration, this file and this line
    assert!(text.contains("1.5s"), "{text}");
    assert!(text.contains("run.rs"), "{text}");
    assert!(text.contains(&format!(":{expected_line}:")), "{text}");
}

/// **VALUE**: Verifies which errors require a forced kill instead of a graceful stop.
///
/// **BUG THIS CATCHES**: Would catch a timeout being handled with a graceful stop, which
/// gives an unresponsive kernel another full grace period.
#[test]
fn given_run_errors_when_classified_then_only_abort_kinds_force_termination() {
    assert!(RunError::timeout(Duration::from_secs(1)).requires_forced_termination());
    assert!(RunError::cancelled().requires_forced_termination());
    assert!(RunError::kernel_died("gone").requires_forced_termination());

    let still_running = RunError::from(TerminationError::StillRunning {
        pid: 42,
        location: ErrorLocation::from(Location::caller()),
    });
    assert!(!still_running.requires_forced_termination());
    assert!(still_running.to_string().contains("42"));
}
