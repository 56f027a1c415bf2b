use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::here()` captures the exact call site.
///
/// **WHY THIS MATTERS**: Every error in the workspace carries an ErrorLocation. If capture
/// drifts, every error message points at the wrong line.
///
/// **BUG THIS CATCHES**: Would catch if `#[track_caller]` is dropped from `here()`, which
/// would make every location point into `error_location.rs` in the common crate.
#[test]
fn given_call_site_when_here_called_then_captures_file_line_column() {
    // GIVEN: The line the capture happens on
    let expected_line = line!() + 3;

    // WHEN: Capturing the location
    let location = ErrorLocation::here();

    // THEN: Should capture this file, this line, and a column
    assert!(
        location.file.contains("tests"),
        "Should capture the test file, got {}",
        location.file
    );
    assert_eq!(location.line, expected_line, "Should capture correct line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies that ErrorLocation Display formatting produces `[file:line:column]`.
///
/// **BUG THIS CATCHES**: Would catch if the Display implementation drops the brackets or
/// one of the three fields, which every error message depends on.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::from(Location::caller());

    // WHEN: Formatting as string
    let formatted = format!("{location}");

    // THEN: Should produce "[file:line:column]" format
    assert!(formatted.starts_with('['), "Should start with '['");
    assert!(formatted.ends_with(']'), "Should end with ']'");
    assert!(formatted.contains(&location.line.to_string()));
    assert!(formatted.contains(&location.column.to_string()));
    assert_eq!(
        formatted.matches(':').count(),
        2,
        "Should have exactly 2 colons"
    );
}

/// **VALUE**: Verifies that `#[track_caller]` propagates through helper constructors.
///
/// **BUG THIS CATCHES**: Would catch if error constructors lose `#[track_caller]` and all
/// report the same line.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    // GIVEN: A helper function that captures location
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::here()
    }

    // WHEN: Capturing location from different call sites
    let loc1 = capture_location();
    let loc2 = capture_location();

    // THEN: Same file, sequential lines
    assert_eq!(loc1.file, loc2.file, "Should have same file");
    assert_eq!(loc1.line + 1, loc2.line, "Lines should be sequential");
}
