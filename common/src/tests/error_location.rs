use crate::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Every error in the workspace carries an `ErrorLocation`; if capture
/// breaks, all error messages lose the `[file:line:column]` suffix.
#[test]
#[track_caller]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN / WHEN
    let location = ErrorLocation::from(Location::caller());

    // THEN
    assert!(location.file.ends_with("error_location.rs"));
    assert!(location.line > 0);
    assert!(location.column > 0);
}

#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    let location = ErrorLocation {
        file: "src/storage/mod.rs",
        line: 42,
        column: 7,
    };

    assert_eq!(location.to_string(), "[src/storage/mod.rs:42:7]");
}

/// **VALUE**: Error constructors rely on `#[track_caller]` propagation; without it
/// every error would point at the constructor instead of the failing call site.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    let first = capture_location();
    let second = capture_location();

    assert_eq!(first.file, second.file);
    assert_eq!(first.line + 1, second.line);
}
