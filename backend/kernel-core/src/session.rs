//! Per-run session context.
//!
//! A [`Session`] owns everything that must stay constant for the lifetime of
//! a run: the session id embedded in every header, the user label, and the
//! shared signing key. It is created once per run, handed to the codec, and
//! dropped (zeroizing the key) when the run ends.

use common::RedactedKey;

use uuid::Uuid;

pub const DEFAULT_USERNAME: &str = "kernel-client";

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    username: String,
    key: RedactedKey,
}

impl Session {
    /// Start a new session signed with `key`.
    pub fn new(key: RedactedKey) -> Self {
        Self::with_username(key, DEFAULT_USERNAME)
    }

    pub fn with_username(key: RedactedKey, username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            key,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn key(&self) -> &RedactedKey {
        &self.key
    }

    /// A fresh id for the next outgoing message.
    pub fn next_message_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
