//! Kernel wire protocol: message types, headers, and the signed envelope codec.
//!
//! See the [Messaging in Jupyter](https://jupyter-client.readthedocs.io/en/stable/messaging.html)
//! page for the protocol. A message on the wire is a multipart sequence:
//!
//! ```text
//! [identities..., <IDS|MSG>, hex(hmac), header, parent_header, metadata, content]
//! ```

pub mod codec;
pub mod content;

pub use codec::{DELIMITER, EncodedMessage, MessageCodec};
pub use content::{
    ErrorContent, ExecuteInput, ExecuteRequest, ExecuteResult, KernelStatus, Status, Stream,
};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message-type tag of a header.
///
/// Known tags get their own variant; anything else is carried verbatim in
/// [`KernelMessageType::Other`] so newer kernels never break decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KernelMessageType {
    ExecuteRequest,
    ExecuteReply,
    KernelInfoRequest,
    KernelInfoReply,
    ShutdownRequest,
    ShutdownReply,
    Status,
    Stream,
    ExecuteInput,
    ExecuteResult,
    DisplayData,
    Error,
    Other(String),
}

impl KernelMessageType {
    pub fn as_str(&self) -> &str {
        match self {
            KernelMessageType::ExecuteRequest => "execute_request",
            KernelMessageType::ExecuteReply => "execute_reply",
            KernelMessageType::KernelInfoRequest => "kernel_info_request",
            KernelMessageType::KernelInfoReply => "kernel_info_reply",
            KernelMessageType::ShutdownRequest => "shutdown_request",
            KernelMessageType::ShutdownReply => "shutdown_reply",
            KernelMessageType::Status => "status",
            KernelMessageType::Stream => "stream",
            KernelMessageType::ExecuteInput => "execute_input",
            KernelMessageType::ExecuteResult => "execute_result",
            KernelMessageType::DisplayData => "display_data",
            KernelMessageType::Error => "error",
            KernelMessageType::Other(tag) => tag,
        }
    }
}

impl From<&str> for KernelMessageType {
    fn from(tag: &str) -> Self {
        match tag {
            "execute_request" => KernelMessageType::ExecuteRequest,
            "execute_reply" => KernelMessageType::ExecuteReply,
            "kernel_info_request" => KernelMessageType::KernelInfoRequest,
            "kernel_info_reply" => KernelMessageType::KernelInfoReply,
            "shutdown_request" => KernelMessageType::ShutdownRequest,
            "shutdown_reply" => KernelMessageType::ShutdownReply,
            "status" => KernelMessageType::Status,
            "stream" => KernelMessageType::Stream,
            "execute_input" => KernelMessageType::ExecuteInput,
            "execute_result" => KernelMessageType::ExecuteResult,
            "display_data" => KernelMessageType::DisplayData,
            "error" => KernelMessageType::Error,
            other => KernelMessageType::Other(other.to_string()),
        }
    }
}

impl From<String> for KernelMessageType {
    fn from(tag: String) -> Self {
        KernelMessageType::from(tag.as_str())
    }
}

impl From<KernelMessageType> for String {
    fn from(msg_type: KernelMessageType) -> Self {
        msg_type.as_str().to_string()
    }
}

impl std::fmt::Display for KernelMessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Header of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelHeader {
    /// Unique per message.
    pub msg_id: String,

    /// Constant for the lifetime of a session.
    pub session: String,

    pub username: String,

    /// ISO 8601 creation time.
    pub date: String,

    pub msg_type: KernelMessageType,

    pub version: String,
}

/// A decoded message.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelMessage {
    /// Routing prefix that preceded the delimiter (empty on SUB/DEALER sockets).
    pub identities: Vec<Bytes>,

    pub header: KernelHeader,

    /// `None` when the parent header was sent as `{}`.
    pub parent_header: Option<KernelHeader>,

    pub metadata: Map<String, Value>,

    pub content: Value,
}

impl KernelMessage {
    pub fn msg_type(&self) -> &KernelMessageType {
        &self.header.msg_type
    }
}
