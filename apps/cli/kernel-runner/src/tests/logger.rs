// Unit tests for logger initialization

use crate::error::RunnerError;
use crate::logger::{LOG_FILE_NAME, build_dispatch, initialize};

use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: Logger initialization might be reached from more than one code
/// path (main, tests). A second call must not try to install a second global logger.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when setting a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp.path());
    let result2 = initialize(temp.path());

    // THEN: Both should return Ok
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
}

/// **VALUE**: Verifies an unwritable log directory is reported as an error.
///
/// **BUG THIS CATCHES**: Would catch `fern::log_file()` being unwrapped, which turns a
/// bad `--log-dir` into a panic instead of a message.
#[test]
fn given_invalid_log_dir_when_dispatch_built_then_runner_error() {
    // GIVEN: A path below a regular file
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch
    let result = build_dispatch(&invalid_dir);

    // THEN: Runner error naming the log file
    match result {
        Err(RunnerError::Runner { message, .. }) => {
            assert!(message.contains(LOG_FILE_NAME), "{message}");
        }
        Err(other) => panic!("expected RunnerError::Runner, got {other}"),
        Ok(_) => panic!("expected an error for {}", invalid_dir.display()),
    }
}

/// **VALUE**: Verifies the log file is created in the requested directory.
#[test]
fn given_valid_log_dir_when_dispatch_built_then_log_file_created() {
    let temp = TempDir::new().unwrap();

    let result = build_dispatch(temp.path());

    assert!(result.is_ok());
    assert!(temp.path().join(LOG_FILE_NAME).exists());
}
