// Unit tests for event rendering

use crate::output::render_event;

use kernel_core::execution::KernelEvent;
use kernel_core::wire::{
    ErrorContent, ExecuteInput, ExecuteResult, KernelMessageType, KernelStatus, Stream,
};

use std::collections::BTreeMap;

/// **VALUE**: Verifies each handled event renders the way an interactive client prints it.
#[test]
fn given_each_event_kind_when_rendered_then_console_text_matches() {
    let result = ExecuteResult {
        execution_count: 1,
        data: BTreeMap::from([(
            ExecuteResult::PLAIN_TEXT_MIME.to_string(),
            "991".into(),
        )]),
        metadata: BTreeMap::new(),
    };

    let cases = [
        (
            KernelEvent::Status {
                execution_state: KernelStatus::Busy,
            },
            "Kernel state: busy",
        ),
        (
            KernelEvent::Stream(Stream {
                name: "stdout".to_string(),
                text: "991\n".to_string(),
            }),
            "991",
        ),
        (
            KernelEvent::ExecuteInput(ExecuteInput {
                code: "print(99 * 10 + 1)".to_string(),
                execution_count: 1,
            }),
            "INFO: Kernel is executing print(99 * 10 + 1)",
        ),
        (KernelEvent::ExecuteResult(result), "991"),
        (
            KernelEvent::Unknown {
                msg_type: KernelMessageType::from("comm_open"),
            },
            "Unknown message type: comm_open",
        ),
    ];

    for (event, expected) in cases {
        assert_eq!(render_event(&event), expected);
    }
}

/// **VALUE**: Verifies errors render with their name, value and traceback.
#[test]
fn given_error_event_when_rendered_then_traceback_follows_summary() {
    // GIVEN: An error with a two-line traceback
    let event = KernelEvent::Error(ErrorContent {
        ename: "ZeroDivisionError".to_string(),
        evalue: "division by zero".to_string(),
        traceback: vec!["Traceback".to_string(), "  1 / 0".to_string()],
    });

    // WHEN: Rendering
    let text = render_event(&event);

    // THEN: Summary first, traceback lines after
    assert_eq!(
        text,
        "ERROR: ZeroDivisionError: division by zero\nTraceback\n  1 / 0"
    );
}

/// **VALUE**: Verifies a result without plain text still renders something.
#[test]
fn given_result_without_plain_text_when_rendered_then_placeholder() {
    let event = KernelEvent::ExecuteResult(ExecuteResult {
        execution_count: 2,
        data: BTreeMap::from([("image/png".to_string(), "iVBOR...".into())]),
        metadata: BTreeMap::new(),
    });

    assert!(render_event(&event).contains("text/plain"));
}
