//! Shared building blocks for the kernel client workspace.
//!
//! This crate holds the small, dependency-light types used by every other
//! crate in the workspace:
//!
//! - [`ErrorLocation`]: file/line/column capture for every error variant
//! - [`RedactedKey`]: a secret that never leaks through `Debug` or `Display`
//!
//! ## Architecture
//!
//! - **common** (this crate): Pure shared types
//! - **kernel-core**: Descriptor, supervisor, codec, transport, state machine
//! - **kernel-runner**: CLI wiring everything together

pub mod error;
pub mod redacted_key;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_key::RedactedKey;
