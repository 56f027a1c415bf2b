//! Signed multipart envelope codec.
//!
//! Outgoing messages are signed with HMAC-SHA256 over
//! `header ‖ parent_header ‖ metadata ‖ content`, in that order, and the hex
//! digest travels in the frame right after the delimiter.

use crate::PROTOCOL_VERSION;
use crate::error::codec::CodecError;
use crate::session::Session;
use crate::wire::{KernelHeader, KernelMessage, KernelMessageType};

use std::time::SystemTime;

use bytes::Bytes;
use hmac::{Hmac, Mac};
use humantime::format_rfc3339_micros;
use log::trace;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separates routing identities from the signed part of a message.
pub const DELIMITER: &[u8] = b"<IDS|MSG>";

/// Number of JSON blobs covered by the signature.
const SIGNED_BLOB_COUNT: usize = 4;
const EMPTY_OBJECT: &[u8] = b"{}";

/// An encoded message ready for a socket, plus the header it was built with.
#[derive(Debug, Clone)]
pub struct EncodedMessage {
    pub header: KernelHeader,
    pub frames: Vec<Bytes>,
}

/// Builds and parses signed envelopes for one session.
///
/// An empty signing key disables signing (the signature frame is empty), as
/// the protocol allows.
#[derive(Clone)]
pub struct MessageCodec {
    session: Session,
    mac: Option<HmacSha256>,
}

impl MessageCodec {
    /// Create a codec for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Sign`] if the HMAC backend rejects the session key.
    pub fn new(session: Session) -> Result<Self, CodecError> {
        let mac = if session.key().is_empty() {
            None
        } else {
            Some(
                HmacSha256::new_from_slice(session.key().as_bytes())
                    .map_err(|e| CodecError::sign(format!("HMAC-SHA256 unavailable: {e}")))?,
            )
        };

        Ok(Self { session, mac })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Build a header for a new outgoing message.
    pub fn new_header(&self, msg_type: KernelMessageType) -> KernelHeader {
        KernelHeader {
            msg_id: self.session.next_message_id(),
            session: self.session.id().to_string(),
            username: self.session.username().to_string(),
            date: format_rfc3339_micros(SystemTime::now()).to_string(),
            msg_type,
            version: PROTOCOL_VERSION.to_string(),
        }
    }

    /// Encode and sign a message.
    ///
    /// Returns the six frames `[delimiter, signature, header, parent, metadata, content]`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if any part fails to serialize.
    pub fn encode<T: Serialize>(
        &self,
        msg_type: KernelMessageType,
        content: &T,
        parent_header: Option<&KernelHeader>,
        metadata: Option<&Map<String, Value>>,
    ) -> Result<EncodedMessage, CodecError> {
        let header = self.new_header(msg_type);

        let blobs = [
            to_blob(&header)?,
            match parent_header {
                Some(parent) => to_blob(parent)?,
                None => Bytes::from_static(EMPTY_OBJECT),
            },
            match metadata {
                Some(metadata) => to_blob(metadata)?,
                None => Bytes::from_static(EMPTY_OBJECT),
            },
            to_blob(content)?,
        ];

        let signature = self.sign(&blobs);

        let mut frames = Vec::with_capacity(2 + SIGNED_BLOB_COUNT);
        frames.push(Bytes::from_static(DELIMITER));
        frames.push(Bytes::from(signature));
        frames.extend(blobs);

        trace!("Encoded {} ({})", header.msg_type, header.msg_id);
        Ok(EncodedMessage { header, frames })
    }

    /// Hex HMAC over the signed blobs, or empty when signing is disabled.
    pub fn sign(&self, blobs: &[Bytes]) -> String {
        match &self.mac {
            Some(mac) => {
                let mut mac = mac.clone();
                for blob in blobs {
                    mac.update(blob);
                }
                hex::encode(mac.finalize().into_bytes())
            }
            None => String::new(),
        }
    }

    /// Check the transmitted signature of a raw multipart message.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Decode`] if the frames are not a well-formed envelope
    /// - [`CodecError::SignatureMismatch`] if the digest does not match
    pub fn verify(&self, frames: &[Bytes]) -> Result<(), CodecError> {
        let delimiter_index = find_delimiter(frames)?;
        check_frame_count(frames, delimiter_index)?;

        let Some(mac) = &self.mac else {
            return Ok(());
        };

        let signature = &frames[delimiter_index + 1];
        let expected = hex::decode(signature)
            .map_err(|e| CodecError::signature_mismatch(format!("signature is not hex: {e}")))?;

        let mut mac = mac.clone();
        for blob in &frames[delimiter_index + 2..] {
            mac.update(blob);
        }

        mac.verify_slice(&expected)
            .map_err(|_| CodecError::signature_mismatch("HMAC digest does not match content"))
    }

    /// Parse a multipart message. No signature check is made here; see [`Self::verify`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the delimiter is missing, the number of
    /// frames after the signature is not exactly four, or a blob is not valid JSON
    /// of the expected shape.
    pub fn decode(frames: Vec<Bytes>) -> Result<KernelMessage, CodecError> {
        let delimiter_index = find_delimiter(&frames)?;
        check_frame_count(&frames, delimiter_index)?;

        let mut frames = frames;
        let blobs = frames.split_off(delimiter_index + 2);
        frames.truncate(delimiter_index);
        let identities = frames;

        let header: KernelHeader = serde_json::from_slice(&blobs[0])
            .map_err(|e| CodecError::decode(format!("invalid header: {e}")))?;

        let parent: Value = serde_json::from_slice(&blobs[1])
            .map_err(|e| CodecError::decode(format!("invalid parent header: {e}")))?;
        let parent_header = match parent {
            Value::Object(ref map) if map.is_empty() => None,
            other => Some(
                serde_json::from_value(other)
                    .map_err(|e| CodecError::decode(format!("invalid parent header: {e}")))?,
            ),
        };

        let metadata: Map<String, Value> = serde_json::from_slice(&blobs[2])
            .map_err(|e| CodecError::decode(format!("invalid metadata: {e}")))?;

        let content: Value = serde_json::from_slice(&blobs[3])
            .map_err(|e| CodecError::decode(format!("invalid content: {e}")))?;

        Ok(KernelMessage {
            identities,
            header,
            parent_header,
            metadata,
            content,
        })
    }
}

impl std::fmt::Debug for MessageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCodec")
            .field("session", &self.session)
            .field("signed", &self.mac.is_some())
            .finish()
    }
}

fn to_blob<T: Serialize + ?Sized>(value: &T) -> Result<Bytes, CodecError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| CodecError::encode(e.to_string()))
}

#[track_caller]
fn find_delimiter(frames: &[Bytes]) -> Result<usize, CodecError> {
    frames
        .iter()
        .position(|frame| frame.as_ref() == DELIMITER)
        .ok_or_else(|| CodecError::decode("missing <IDS|MSG> delimiter"))
}

#[track_caller]
fn check_frame_count(frames: &[Bytes], delimiter_index: usize) -> Result<(), CodecError> {
    let after_signature = frames.len().saturating_sub(delimiter_index + 2);
    if frames.len() < delimiter_index + 2 || after_signature != SIGNED_BLOB_COUNT {
        return Err(CodecError::decode(format!(
            "expected {SIGNED_BLOB_COUNT} frames after signature, got {after_signature}"
        )));
    }
    Ok(())
}
