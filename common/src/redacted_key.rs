//! Shared-secret handling with redacted Debug output.

use crate::{ErrorLocation, RedactError};

use std::fmt;
use std::panic::Location;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error, Serializer};
use zeroize::Zeroize;

/// A signing key that never exposes its value in logs or debug output.
///
/// The value is only reachable through [`RedactedKey::as_str`] /
/// [`RedactedKey::as_bytes`], or written out deliberately through
/// [`RedactedKey::serialize_exposed`] when the secret must be handed to a
/// peer (for example in a connection file).
#[derive(Clone, PartialEq, Eq)]
pub struct RedactedKey {
    inner: String,
}

impl RedactedKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { inner: key.into() }
    }

    /// Get the actual key value.
    ///
    /// # Security Note
    /// Only call this when the key is fed to a MAC or written to its peer.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Get the key length (safe to log).
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Serialize the raw key value.
    ///
    /// Use with `#[serde(serialize_with = "RedactedKey::serialize_exposed")]`
    /// on fields that must carry the secret on disk.
    pub fn serialize_exposed<S>(key: &RedactedKey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(key.as_str())
    }
}

impl fmt::Debug for RedactedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedactedKey([REDACTED])")
    }
}

impl fmt::Display for RedactedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED KEY]")
    }
}

impl Drop for RedactedKey {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

// Implicit serialization is refused; see `serialize_exposed`.
impl serde::Serialize for RedactedKey {
    #[track_caller]
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Err(S::Error::custom(RedactError::Serialization {
            message: String::from(
                "RedactedKey cannot be serialized implicitly - use serialize_exposed",
            ),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}

impl<'de> Deserialize<'de> for RedactedKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(RedactedKey::new)
    }
}
