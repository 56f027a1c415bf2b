//! Console rendering of broadcast events.

use kernel_core::execution::KernelEvent;
use kernel_core::wire::ExecuteResult;

/// The line(s) printed for `event`, as an interactive client shows them.
pub fn render_event(event: &KernelEvent) -> String {
    match event {
        KernelEvent::Status { execution_state } => {
            format!("Kernel state: {}", status_name(*execution_state))
        }
        KernelEvent::Stream(stream) => stream.text.trim_end_matches('\n').to_string(),
        KernelEvent::ExecuteInput(input) => format!("INFO: Kernel is executing {}", input.code),
        KernelEvent::ExecuteResult(result) => result
            .plain_text()
            .map(str::to_string)
            .unwrap_or_else(|| format!("<result without {}>", ExecuteResult::PLAIN_TEXT_MIME)),
        KernelEvent::Error(error) => {
            let mut text = format!("ERROR: {}: {}", error.ename, error.evalue);
            for line in &error.traceback {
                text.push('\n');
                text.push_str(line);
            }
            text
        }
        KernelEvent::Unknown { msg_type } => format!("Unknown message type: {msg_type}"),
    }
}

fn status_name(status: kernel_core::wire::KernelStatus) -> &'static str {
    use kernel_core::wire::KernelStatus;

    match status {
        KernelStatus::Starting => "starting",
        KernelStatus::Busy => "busy",
        KernelStatus::Idle => "idle",
        KernelStatus::Dead => "dead",
    }
}
