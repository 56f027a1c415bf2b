// Unit tests for connection descriptor generation and persistence

use crate::connection::ports::allocate_ports;
use crate::connection::{ConnectionDescriptor, ConnectionFile, RUNTIME_DIR_ENV, resolve_runtime_dir};
use crate::error::descriptor::DescriptorError;
use crate::{KERNEL_IP, KERNEL_TRANSPORT, SIGNATURE_SCHEME};

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use serial_test::serial;
use tempfile::TempDir;

/// **VALUE**: Verifies that a written descriptor has all nine fields with the right types.
///
/// **WHY THIS MATTERS**: The kernel parses this file before binding its sockets. A missing
/// or mistyped field makes the kernel exit at startup, which the client only sees as a
/// connect timeout.
///
/// **BUG THIS CATCHES**: Would catch the key being redacted on disk, the kernel-standard
/// `hb_port` / `iopub_port` names being lost, or ports serialized as strings.
#[test]
fn given_generated_connection_file_when_read_as_json_then_all_fields_present() {
    // GIVEN: A connection file in a temp runtime dir
    let temp = TempDir::new().unwrap();
    let file = ConnectionFile::generate(temp.path()).unwrap();

    // WHEN: Reading it back as raw JSON
    let contents = std::fs::read_to_string(file.path()).unwrap();
    let json: Value = serde_json::from_str(&contents).unwrap();

    // THEN: All nine fields are present with correct types
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 9, "unexpected fields: {object:?}");
    for port in ["control_port", "shell_port", "stdin_port", "hb_port", "iopub_port"] {
        let value = object[port].as_u64().unwrap();
        assert!(value > 0 && value <= u16::MAX as u64, "{port} = {value}");
    }
    assert_eq!(object["transport"], KERNEL_TRANSPORT);
    assert_eq!(object["ip"], KERNEL_IP);
    assert_eq!(object["signature_scheme"], SIGNATURE_SCHEME);

    let key = object["key"].as_str().unwrap();
    assert!(!key.is_empty());
    assert_eq!(key, file.descriptor().key.as_str());
}

/// **VALUE**: Verifies write-then-read reproduces the descriptor exactly.
#[test]
fn given_written_descriptor_when_read_then_equal() {
    // GIVEN: A generated connection file
    let temp = TempDir::new().unwrap();
    let file = ConnectionFile::generate(temp.path()).unwrap();

    // WHEN: Reading it
    let read = ConnectionDescriptor::read(file.path()).unwrap();

    // THEN: Same descriptor, same key
    assert_eq!(&read, file.descriptor());
    assert_eq!(read.key.as_str(), file.descriptor().key.as_str());
}

/// **VALUE**: Verifies a descriptor is never overwritten.
///
/// **WHY THIS MATTERS**: A running kernel may already have read the file. Replacing its
/// key would desynchronise signatures mid-run.
#[test]
fn given_existing_file_when_written_again_then_write_error() {
    // GIVEN: A descriptor already persisted at a path
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("kernel-fixed.json");
    let descriptor = ConnectionDescriptor::allocate().unwrap();
    descriptor.write_once(&path).unwrap();
    let original = std::fs::read_to_string(&path).unwrap();

    // WHEN: Writing another descriptor to the same path
    let other = ConnectionDescriptor::allocate().unwrap();
    let result = other.write_once(&path);

    // THEN: Write error, original content untouched, no temp file left behind
    assert!(matches!(result, Err(DescriptorError::Write { .. })));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    assert!(!path.with_extension("json.tmp").exists());
}

/// **VALUE**: Verifies the connection file is readable by its owner only.
///
/// **WHY THIS MATTERS**: The file carries the signing key. Anyone who can read it
/// can forge messages the client accepts as coming from the kernel.
///
/// **BUG THIS CATCHES**: Would catch the descriptor being created with the default
/// umask (typically 0644).
#[cfg(unix)]
#[test]
fn given_generated_connection_file_when_inspected_then_owner_only_permissions() {
    use std::os::unix::fs::PermissionsExt;

    // GIVEN: A freshly generated connection file
    let temp = TempDir::new().unwrap();
    let file = ConnectionFile::generate(temp.path()).unwrap();

    // WHEN: Reading its mode
    let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();

    // THEN: No group or other bits are set
    assert_eq!(mode & 0o077, 0, "connection file mode is {:o}", mode & 0o777);
}

/// **VALUE**: Verifies an unwritable runtime dir fails with a write error.
#[test]
fn given_runtime_dir_is_a_file_when_generated_then_write_error() {
    // GIVEN: A regular file where the runtime dir should be
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();

    // WHEN: Generating a connection file inside it
    let result = ConnectionFile::generate(&blocker);

    // THEN: Write error
    assert!(matches!(result, Err(DescriptorError::Write { .. })));
}

/// **VALUE**: Verifies the long field names are accepted when reading.
#[test]
fn given_long_port_names_when_read_then_aliases_accepted() {
    // GIVEN: A descriptor file using heartbeat_port / broadcast_port
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("kernel-long.json");
    std::fs::write(
        &path,
        r#"{
            "control_port": 1, "shell_port": 2, "transport": "tcp",
            "signature_scheme": "hmac-sha256", "stdin_port": 3,
            "heartbeat_port": 4, "ip": "127.0.0.1", "broadcast_port": 5,
            "key": "secret"
        }"#,
    )
    .unwrap();

    // WHEN: Reading
    let descriptor = ConnectionDescriptor::read(&path).unwrap();

    // THEN: Fields land in the right slots
    assert_eq!(descriptor.heartbeat_port, 4);
    assert_eq!(descriptor.broadcast_port, 5);
    assert_eq!(descriptor.broadcast_endpoint(), "tcp://127.0.0.1:5");
    assert_eq!(descriptor.key.as_str(), "secret");
}

/// **VALUE**: Verifies the key never leaks through Debug output.
#[test]
fn given_descriptor_when_debug_formatted_then_key_redacted() {
    // GIVEN: A fresh descriptor
    let descriptor = ConnectionDescriptor::allocate().unwrap();

    // WHEN: Debug formatting
    let debug = format!("{descriptor:?}");

    // THEN: The key is absent
    assert!(!debug.contains(descriptor.key.as_str()));
}

/// **VALUE**: Verifies the five reserved ports are distinct.
#[test]
fn given_port_allocation_when_five_requested_then_all_distinct() {
    // WHEN: Allocating five ports
    let ports = allocate_ports::<5>().unwrap();

    // THEN: No duplicates, none zero
    let unique: HashSet<u16> = ports.iter().copied().collect();
    assert_eq!(unique.len(), 5);
    assert!(!ports.contains(&0));
}

/// **VALUE**: Verifies removal deletes the discovery file and tolerates repetition.
#[test]
fn given_connection_file_when_removed_twice_then_file_gone_without_panic() {
    // GIVEN: A generated connection file
    let temp = TempDir::new().unwrap();
    let file = ConnectionFile::generate(temp.path()).unwrap();
    assert!(file.path().exists());

    // WHEN: Removing twice
    file.remove();
    file.remove();

    // THEN: Gone
    assert!(!file.path().exists());
}

/// **VALUE**: Verifies runtime dir precedence: configured, then environment.
#[test]
#[serial]
fn given_configured_and_env_runtime_dirs_when_resolved_then_configured_wins() {
    // GIVEN: Both an env override and a configured dir
    let configured = Path::new("/tmp/configured-runtime");
    unsafe { std::env::set_var(RUNTIME_DIR_ENV, "/tmp/env-runtime") };

    // WHEN: Resolving with and without the configured dir
    let with_config = resolve_runtime_dir(Some(configured)).unwrap();
    let from_env = resolve_runtime_dir(None).unwrap();
    unsafe { std::env::remove_var(RUNTIME_DIR_ENV) };

    // THEN: Configured first, env second
    assert_eq!(with_config, configured);
    assert_eq!(from_env, Path::new("/tmp/env-runtime"));
}
