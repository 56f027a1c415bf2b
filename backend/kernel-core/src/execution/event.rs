use crate::error::codec::CodecError;
use crate::wire::{
    ErrorContent, ExecuteInput, ExecuteResult, KernelMessage, KernelMessageType, KernelStatus,
    Status, Stream,
};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A broadcast notification the client understands.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelEvent {
    Status { execution_state: KernelStatus },
    Stream(Stream),
    ExecuteInput(ExecuteInput),
    ExecuteResult(ExecuteResult),
    Error(ErrorContent),

    /// Any other message type. Carried so callers can report it; never affects state.
    Unknown { msg_type: KernelMessageType },
}

impl KernelEvent {
    /// Map a decoded broadcast message to an event.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the content does not match the declared message type.
    #[track_caller]
    pub fn from_message(message: &KernelMessage) -> Result<Self, CodecError> {
        let msg_type = message.msg_type();
        let event = match msg_type {
            KernelMessageType::Status => {
                let status: Status = parse_content(msg_type, &message.content)?;
                KernelEvent::Status {
                    execution_state: status.execution_state,
                }
            }
            KernelMessageType::Stream => {
                KernelEvent::Stream(parse_content(msg_type, &message.content)?)
            }
            KernelMessageType::ExecuteInput => {
                KernelEvent::ExecuteInput(parse_content(msg_type, &message.content)?)
            }
            KernelMessageType::ExecuteResult => {
                KernelEvent::ExecuteResult(parse_content(msg_type, &message.content)?)
            }
            KernelMessageType::Error => {
                KernelEvent::Error(parse_content(msg_type, &message.content)?)
            }
            other => KernelEvent::Unknown {
                msg_type: other.clone(),
            },
        };
        Ok(event)
    }
}

#[track_caller]
fn parse_content<T: DeserializeOwned>(
    msg_type: &KernelMessageType,
    content: &Value,
) -> Result<T, CodecError> {
    T::deserialize(content)
        .map_err(|e| CodecError::decode(format!("invalid {msg_type} content: {e}")))
}
