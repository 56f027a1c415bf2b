use super::helpers::{leftover_files, runner, runtime_dir, stub_spec};

use kernel_core::error::RunError;
use kernel_core::execution::{ExecutionState, KernelEvent};
use kernel_core::wire::{KernelMessageType, KernelStatus};

use std::time::{Duration, Instant};

// ============================================================================
// End-to-end runs against the stub kernel
// ============================================================================

/// **VALUE**: Verifies a full run: busy, result "991", idle, in that order.
///
/// **WHY THIS MATTERS**: This is the whole client: descriptor, launch, signed request,
/// subscription, decode, state machine and termination working together.
///
/// **BUG THIS CATCHES**: Would catch a subscription that misses the first status, a
/// request the kernel cannot verify, or a loop that stops before idle.
#[tokio::test]
async fn given_stub_kernel_when_code_run_then_busy_result_idle_observed_in_order() {
    // GIVEN: A runner and the stub kernel
    let dir = runtime_dir();
    let runner = runner(dir.path(), 20_000);
    let spec = stub_spec(&[]);

    // WHEN: Running code
    let started = Instant::now();
    let mut seen = Vec::new();
    let outcome = runner
        .run_spec(&spec, "print(99 * 10 + 1)", |event| seen.push(event.clone()))
        .await
        .unwrap();

    // THEN: Exactly busy, result, idle
    assert_eq!(outcome.events.len(), 3, "events: {:?}", outcome.events);
    assert_eq!(
        outcome.events[0],
        KernelEvent::Status {
            execution_state: KernelStatus::Busy
        }
    );
    match &outcome.events[1] {
        KernelEvent::ExecuteResult(result) => assert_eq!(result.plain_text(), Some("991")),
        other => panic!("expected execute_result, got {other:?}"),
    }
    assert_eq!(
        outcome.events[2],
        KernelEvent::Status {
            execution_state: KernelStatus::Idle
        }
    );
    assert_eq!(outcome.results, vec!["991".to_string()]);
    assert_eq!(outcome.final_state, ExecutionState::Idle);

    // AND: The callback saw the same sequence, the run was bounded, and nothing is left behind
    assert_eq!(seen, outcome.events);
    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(leftover_files(dir.path()), 0);
}

/// **VALUE**: Verifies a kernel that never returns to idle times out and is reaped.
///
/// **WHY THIS MATTERS**: Without a deadline a stuck kernel hangs the client forever.
#[tokio::test]
async fn given_kernel_never_idle_when_run_then_timeout_within_deadline() {
    // GIVEN: A stub that stays busy and a short run timeout
    let dir = runtime_dir();
    let runner = runner(dir.path(), 1_500);
    let spec = stub_spec(&["--never-idle"]);

    // WHEN: Running
    let started = Instant::now();
    let result = runner.run_spec(&spec, "loop()", |_| {}).await;

    // THEN: Timeout, reported well before the test harness would give up
    assert!(matches!(result, Err(RunError::Timeout { .. })), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(12));
    assert_eq!(leftover_files(dir.path()), 0);
}

/// **VALUE**: Verifies a `dead` status ends the run as a kernel death.
#[tokio::test]
async fn given_kernel_reports_dead_when_run_then_kernel_died() {
    let dir = runtime_dir();
    let runner = runner(dir.path(), 10_000);

    let result = runner.run_spec(&stub_spec(&["--dead"]), "x", |_| {}).await;

    assert!(matches!(result, Err(RunError::KernelDied { .. })), "{result:?}");
}

/// **VALUE**: Verifies a kernel that exits mid-request is detected without waiting
/// for the full run timeout.
#[tokio::test]
async fn given_kernel_exits_on_request_when_run_then_kernel_died_before_deadline() {
    // GIVEN: A stub that exits as soon as it receives the request
    let dir = runtime_dir();
    let runner = runner(dir.path(), 30_000);

    // WHEN: Running
    let started = Instant::now();
    let result = runner
        .run_spec(&stub_spec(&["--exit-on-request"]), "x", |_| {})
        .await;

    // THEN: Kernel death, noticed long before the deadline
    assert!(matches!(result, Err(RunError::KernelDied { .. })), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(15));
}

/// **VALUE**: Verifies unknown types are surfaced and badly signed messages are dropped.
///
/// **BUG THIS CATCHES**: Would catch a forged `status` message changing state when the
/// policy is `reject`, or an unknown type aborting the run.
#[tokio::test]
async fn given_noisy_kernel_when_run_with_reject_policy_then_forgery_dropped_unknown_kept() {
    // GIVEN: A stub that also publishes an unknown type and a forged status
    let dir = runtime_dir();
    let runner = runner(dir.path(), 20_000);

    // WHEN: Running
    let outcome = runner
        .run_spec(&stub_spec(&["--noise"]), "x", |_| {})
        .await
        .unwrap();

    // THEN: busy, unknown(comm_open), result, idle; forged status dropped
    let unknown = KernelEvent::Unknown {
        msg_type: KernelMessageType::Other("comm_open".to_string()),
    };
    assert_eq!(outcome.events.len(), 4, "events: {:?}", outcome.events);
    assert_eq!(outcome.events[1], unknown);
    assert_eq!(outcome.results, vec!["991".to_string()]);
}

/// **VALUE**: Verifies cancellation aborts the run and kills the kernel.
#[tokio::test]
async fn given_cancelled_token_when_run_then_cancelled_error() {
    // GIVEN: A runner whose token is cancelled shortly after starting
    let dir = runtime_dir();
    let runner = runner(dir.path(), 30_000);
    let token = runner.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(800)).await;
        token.cancel();
    });

    // WHEN: Running against a kernel that never idles
    let started = Instant::now();
    let result = runner
        .run_spec(&stub_spec(&["--never-idle"]), "x", |_| {})
        .await;

    // THEN: Cancelled quickly
    assert!(matches!(result, Err(RunError::Cancelled { .. })), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(15));
}

/// **VALUE**: Verifies a missing kernel executable aborts with a launch error and
/// still removes the connection file.
#[tokio::test]
async fn given_missing_kernel_binary_when_run_then_launch_error_and_file_removed() {
    // GIVEN: A spec pointing at nothing
    let dir = runtime_dir();
    let runner = runner(dir.path(), 5_000);
    let mut spec = stub_spec(&[]);
    spec.argv[0] = "/nonexistent/stub-kernel".to_string();

    // WHEN: Running
    let result = runner.run_spec(&spec, "x", |_| {}).await;

    // THEN: Launch error, no descriptor left behind
    assert!(matches!(result, Err(RunError::Launch(_))), "{result:?}");
    assert_eq!(leftover_files(dir.path()), 0);
}
