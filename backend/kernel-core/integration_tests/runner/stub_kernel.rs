use super::helpers::STUB_KERNEL;

use std::process::Command;

/// **VALUE**: Verifies the stub kernel rejects an unknown flag with a usage error.
///
/// **BUG THIS CATCHES**: Would catch a typo in a test's kernel argv (say `--never_idle`)
/// being silently ignored, which turns a timeout test into a passing run.
#[test]
fn given_unknown_flag_when_stub_started_then_usage_error() {
    // GIVEN/WHEN: Starting the stub with a flag it does not know
    let output = Command::new(STUB_KERNEL)
        .args(["-f", "/tmp/unused.json", "--never_idle"])
        .output()
        .unwrap();

    // THEN: Exit code 2 and the flag named on stderr
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--never_idle"), "{stderr}");
}

/// **VALUE**: Verifies the stub kernel refuses to start without a connection file.
#[test]
fn given_no_connection_file_when_stub_started_then_usage_error() {
    let output = Command::new(STUB_KERNEL).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--file"), "{stderr}");
}

/// **VALUE**: Verifies an unreadable connection file is reported through the log and a
/// failure exit, not a panic.
#[test]
fn given_missing_connection_file_when_stub_started_then_logged_failure() {
    // GIVEN: A connection file path that does not exist
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("kernel-missing.json");

    // WHEN: Starting the stub
    let output = Command::new(STUB_KERNEL).arg("-f").arg(&missing).output().unwrap();

    // THEN: Exit code 1 with an error-level log line on stderr
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stub-kernel [ERROR]"), "{stderr}");
}
