//! Connection descriptor ("connection file") generation and discovery.
//!
//! The descriptor carries the five socket ports and the shared signing key
//! that the client and the kernel use to find and authenticate each other.
//! It is written exactly once, before the kernel is launched, and is never
//! mutated afterwards.
//!
//! # On-disk format
//!
//! ```json
//! {
//!   "control_port": 50160,
//!   "shell_port": 57503,
//!   "transport": "tcp",
//!   "signature_scheme": "hmac-sha256",
//!   "stdin_port": 52597,
//!   "hb_port": 42540,
//!   "ip": "127.0.0.1",
//!   "iopub_port": 40885,
//!   "key": "..."
//! }
//! ```

pub mod ports;
pub mod runtime_dir;

pub use runtime_dir::{RUNTIME_DIR_ENV, resolve_runtime_dir};

use crate::error::descriptor::DescriptorError;
use crate::{KERNEL_IP, KERNEL_TRANSPORT, SIGNATURE_SCHEME};

use common::{ErrorLocation, RedactedKey};

use std::fs::{OpenOptions, hard_link, read_to_string, remove_file};
use std::io::Write;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CONNECTION_FILE_PREFIX: &str = "kernel-";
const CONNECTION_FILE_EXTENSION: &str = "json";

/// Endpoints and signing key shared with a kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub control_port: u16,
    pub shell_port: u16,
    pub transport: String,
    pub signature_scheme: String,
    pub stdin_port: u16,
    #[serde(rename = "hb_port", alias = "heartbeat_port")]
    pub heartbeat_port: u16,
    pub ip: String,
    #[serde(rename = "iopub_port", alias = "broadcast_port")]
    pub broadcast_port: u16,
    #[serde(serialize_with = "RedactedKey::serialize_exposed")]
    pub key: RedactedKey,
}

impl ConnectionDescriptor {
    /// Build a descriptor from a fresh set of loopback ports and a new key.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::PortAllocation`] if no ephemeral ports could be reserved.
    pub fn allocate() -> Result<Self, DescriptorError> {
        let [control, shell, stdin, heartbeat, broadcast] = ports::allocate_ports::<5>()?;

        Ok(Self {
            control_port: control,
            shell_port: shell,
            transport: KERNEL_TRANSPORT.to_string(),
            signature_scheme: SIGNATURE_SCHEME.to_string(),
            stdin_port: stdin,
            heartbeat_port: heartbeat,
            ip: KERNEL_IP.to_string(),
            broadcast_port: broadcast,
            key: RedactedKey::new(Uuid::new_v4().to_string()),
        })
    }

    /// `transport://ip:port` for the given port.
    pub fn endpoint(&self, port: u16) -> String {
        format!("{}://{}:{}", self.transport, self.ip, port)
    }

    pub fn shell_endpoint(&self) -> String {
        self.endpoint(self.shell_port)
    }

    pub fn broadcast_endpoint(&self) -> String {
        self.endpoint(self.broadcast_port)
    }

    /// Load a descriptor from a connection file.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Read`] if the file cannot be read and
    /// [`DescriptorError::Parse`] if it is not a valid descriptor.
    #[track_caller]
    pub fn read(path: &Path) -> Result<Self, DescriptorError> {
        let contents = read_to_string(path).map_err(|e| DescriptorError::Read {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&contents).map_err(|e| DescriptorError::Parse {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Persist the descriptor to `path`, failing if the file already exists.
    ///
    /// The content goes to a temp file first and is then linked into place,
    /// so a kernel never observes a half-written descriptor and an existing
    /// descriptor is never overwritten. The file holds the signing key and is
    /// readable by its owner only.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Write`] if the path is not writable or already exists.
    #[track_caller]
    pub fn write_once(&self, path: &Path) -> Result<(), DescriptorError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| DescriptorError::Serialize {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        let temp_path = path.with_extension(format!("{CONNECTION_FILE_EXTENSION}.tmp"));

        write_private(&temp_path, json.as_bytes()).map_err(|e| DescriptorError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        let linked = hard_link(&temp_path, path);
        if let Err(e) = remove_file(&temp_path) {
            debug!("Failed to remove temp descriptor {}: {e}", temp_path.display());
        }

        linked.map_err(|e| DescriptorError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!("Descriptor written to {}", path.display());
        Ok(())
    }
}

/// Create `path` (which must not exist) with owner-only permissions and write `contents`.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// A descriptor that has been persisted to its discovery file.
#[derive(Debug)]
pub struct ConnectionFile {
    descriptor: ConnectionDescriptor,
    path: PathBuf,
}

impl ConnectionFile {
    /// Allocate ports and a key, then persist the descriptor under `runtime_dir`.
    ///
    /// # Errors
    ///
    /// - [`DescriptorError::PortAllocation`] if ports could not be reserved
    /// - [`DescriptorError::RuntimeDir`] / [`DescriptorError::Write`] if the file cannot be written
    pub fn generate(runtime_dir: &Path) -> Result<Self, DescriptorError> {
        runtime_dir::ensure_dir(runtime_dir)?;

        let descriptor = ConnectionDescriptor::allocate()?;
        let path = runtime_dir.join(format!(
            "{CONNECTION_FILE_PREFIX}{}.{CONNECTION_FILE_EXTENSION}",
            Uuid::new_v4()
        ));

        descriptor.write_once(&path)?;

        info!(
            "Connection file {} (shell={}, iopub={}, key={} chars)",
            path.display(),
            descriptor.shell_port,
            descriptor.broadcast_port,
            descriptor.key.len()
        );

        Ok(Self { descriptor, path })
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort removal of the discovery file.
    pub fn remove(&self) {
        match remove_file(&self.path) {
            Ok(()) => debug!("Removed connection file {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove connection file {}: {e}",
                self.path.display()
            ),
        }
    }
}
