//! Content bodies of the messages the client sends and handles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Execute code on behalf of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub code: String,

    /// Execute as quietly as possible (no broadcast output, no history).
    pub silent: bool,

    pub store_history: bool,

    /// Names mapped to expressions evaluated after execution.
    pub user_expressions: BTreeMap<String, String>,

    /// Whether the kernel may send `input_request` messages.
    pub allow_stdin: bool,

    /// Abort the execution queue if this request raises.
    pub stop_on_error: bool,
}

impl ExecuteRequest {
    /// A plain, non-interactive execution that records history.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            silent: false,
            store_history: true,
            user_expressions: BTreeMap::new(),
            allow_stdin: false,
            stop_on_error: true,
        }
    }
}

/// Kernel lifecycle phase reported on the broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelStatus {
    /// Published exactly once at process startup.
    Starting,
    Busy,
    Idle,
    /// Reported by supervisors when the kernel process is gone.
    Dead,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub execution_state: KernelStatus,
}

/// Output written to stdout or stderr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// `stdout` or `stderr`.
    pub name: String,
    pub text: String,
}

/// Re-broadcast of the code being executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteInput {
    pub code: String,
    #[serde(default)]
    pub execution_count: i64,
}

/// Result value of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResult {
    #[serde(default)]
    pub execution_count: i64,

    /// MIME type to representation; `text/plain` is always present.
    pub data: BTreeMap<String, Value>,

    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ExecuteResult {
    pub const PLAIN_TEXT_MIME: &'static str = "text/plain";

    pub fn plain_text(&self) -> Option<&str> {
        self.data.get(Self::PLAIN_TEXT_MIME).and_then(Value::as_str)
    }
}

/// Error raised while executing a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContent {
    /// Exception name, such as `NameError`.
    pub ename: String,
    pub evalue: String,
    #[serde(default)]
    pub traceback: Vec<String>,
}
