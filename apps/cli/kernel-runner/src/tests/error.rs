// Unit tests for error formatting and conversion

use crate::error::RunnerError;

use kernel_core::error::{ConfigError, RunError};

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

/// **VALUE**: Verifies app errors include their message and location.
#[test]
fn given_runner_error_when_formatted_then_includes_message_and_location() {
    // GIVEN: A runner error
    let err = RunnerError::Runner {
        message: String::from("Failed to create log directory"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Formatting
    let text = err.to_string();

    // THEN: Kind, message and this file
    assert!(text.contains("Runner Error"), "{text}");
    assert!(text.contains("Failed to create log directory"), "{text}");
    assert!(text.contains("error.rs"), "{text}");
}

/// **VALUE**: Verifies core errors pass through `?` unchanged.
///
/// **WHY THIS MATTERS**: The binary prints the error it gets. Wrapping would bury the
/// original location under the conversion site.
#[test]
fn given_core_errors_when_converted_then_display_is_transparent() {
    // GIVEN: A run error and a config error
    let run = RunError::timeout(Duration::from_secs(2));
    let run_text = run.to_string();
    let config = ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: "bad".to_string(),
    };
    let config_text = config.to_string();

    // WHEN: Converting into RunnerError
    let run: RunnerError = run.into();
    let config: RunnerError = config.into();

    // THEN: Same text, matching variants
    assert_eq!(run.to_string(), run_text);
    assert_eq!(config.to_string(), config_text);
    assert!(matches!(run, RunnerError::Run(RunError::Timeout { .. })));
    assert!(matches!(config, RunnerError::Config(_)));
}
