// Unit tests for failure classification

use crate::classifier::{
    AppError, AppErrorKind, Classify, Failure, GENERIC_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE,
    TransportFailure, classify, handle_error, is_retryable,
};
use crate::logger::{Logger, LoggerConfig};

use common::HttpStatusCode;
use models::{AppMode, ErrorKind, LogLevel};

use serde_json::{Value, json};

// ============================================
// TRANSPORT FAILURES
// ============================================

/// **VALUE**: Verifies a request that never got a response is a network error.
///
/// **WHY THIS MATTERS**: The UI tells the user to check their connection only
/// for this kind. Any other classification sends them chasing a server bug.
///
/// **BUG THIS CATCHES**: Treating "no response" like a 500 response.
#[test]
fn given_no_response_when_classifying_then_network_503() {
    // GIVEN
    let failure = Failure::Transport(TransportFailure::no_response("connection refused"));

    // WHEN
    let classified = classify(&failure);

    // THEN
    assert_eq!(classified.kind(), ErrorKind::Network);
    assert_eq!(classified.status_code(), HttpStatusCode(503));
    assert_eq!(classified.message(), NETWORK_ERROR_MESSAGE);
    assert_eq!(
        classified.details(),
        Some(&json!({ "cause": "connection refused" }))
    );
}

#[test]
fn given_response_with_message_when_classifying_then_api_error_uses_message() {
    let failure = Failure::from_response(
        422u16,
        r#"{"message": "Email already taken", "error": "Conflict", "details": {"field": "email"}}"#,
    );

    let classified = classify(&failure);

    assert_eq!(classified.kind(), ErrorKind::Api);
    assert_eq!(classified.status_code(), HttpStatusCode(422));
    assert_eq!(classified.message(), "Email already taken");
    assert_eq!(classified.details(), Some(&json!({ "field": "email" })));
}

/// **VALUE**: Verifies the message fallback chain: `message`, then `error`,
/// then the generic text.
///
/// **BUG THIS CATCHES**: Picking `error` over `message`, or surfacing an empty
/// string to the user.
#[test]
fn given_response_bodies_when_classifying_then_message_falls_back_in_order() {
    let only_error = classify(&Failure::from_response(500u16, r#"{"error": "Internal"}"#));
    assert_eq!(only_error.message(), "Internal");

    let blank_message = classify(&Failure::from_response(
        500u16,
        r#"{"message": "  ", "error": "Internal"}"#,
    ));
    assert_eq!(blank_message.message(), "Internal");

    let empty_body = classify(&Failure::from_response(502u16, ""));
    assert_eq!(empty_body.message(), GENERIC_ERROR_MESSAGE);
    assert_eq!(empty_body.status_code(), HttpStatusCode(502));
    assert!(empty_body.details().is_none());
}

#[test]
fn given_plain_text_body_when_building_response_failure_then_wrapped_as_error_field() {
    let failure = TransportFailure::response(503u16, "Service Unavailable\n");

    match &failure {
        TransportFailure::Response { status, body } => {
            assert_eq!(*status, HttpStatusCode(503));
            assert_eq!(body, &json!({ "error": "Service Unavailable" }));
        }
        other => panic!("expected response failure, got {other:?}"),
    }
    assert_eq!(failure.classify().message(), "Service Unavailable");
}

#[test]
fn given_empty_body_when_building_response_failure_then_body_is_null() {
    match TransportFailure::response(500u16, "   ") {
        TransportFailure::Response { body, .. } => assert_eq!(body, Value::Null),
        other => panic!("expected response failure, got {other:?}"),
    }
}

// ============================================
// DOMAIN ERRORS
// ============================================

#[test]
fn given_each_app_error_kind_when_classifying_then_maps_kind_and_defaults() {
    let cases = [
        (AppError::application("Broken"), ErrorKind::App, 500, "Broken"),
        (AppError::validation("Bad input"), ErrorKind::Validation, 400, "Bad input"),
        (AppError::authentication(), ErrorKind::Authentication, 401, "Unauthorized"),
        (AppError::network(), ErrorKind::Network, 503, "Network error"),
    ];

    for (error, kind, status, message) in cases {
        let classified = classify(&Failure::App(error));
        assert_eq!(classified.kind(), kind);
        assert_eq!(classified.status_code(), HttpStatusCode(status));
        assert_eq!(classified.message(), message);
    }
}

#[test]
fn given_app_error_with_overrides_when_classifying_then_keeps_status_and_details() {
    let error = AppError::new(AppErrorKind::Validation, "Too many tags")
        .with_status(413u16)
        .with_details(json!({ "max": 10 }));

    let classified = error.classify();

    assert_eq!(classified.status_code(), HttpStatusCode(413));
    assert_eq!(classified.details(), Some(&json!({ "max": 10 })));
    assert!(error.to_string().contains("Too many tags"));
    assert!(error.to_string().contains("classifier.rs"));
}

#[test]
fn given_foreign_failure_when_classifying_then_unknown_500() {
    let classified = classify(&Failure::other("thread panicked"));

    assert_eq!(classified.kind(), ErrorKind::Unknown);
    assert_eq!(classified.status_code(), HttpStatusCode(500));
    assert_eq!(classified.message(), GENERIC_ERROR_MESSAGE);
}

// ============================================
// RETRYABILITY
// ============================================

/// **VALUE**: Verifies only 4xx transport responses are terminal.
///
/// **WHY THIS MATTERS**: Retrying a 400 or 401 burns the user's time and rate
/// limit budget for a request that can never succeed. Retrying a 503 or a
/// dropped connection is the whole point of the retry policy.
#[test]
fn given_failures_when_checking_retryable_then_only_client_errors_are_terminal() {
    assert!(!is_retryable(&Failure::from_response(400u16, "")));
    assert!(!is_retryable(&Failure::from_response(404u16, "")));
    assert!(!is_retryable(&Failure::from_response(499u16, "")));

    assert!(is_retryable(&Failure::from_response(500u16, "")));
    assert!(is_retryable(&Failure::from_response(503u16, "")));
    assert!(is_retryable(&Failure::Transport(TransportFailure::no_response("offline"))));
    assert!(is_retryable(&Failure::App(AppError::validation("bad"))));
    assert!(is_retryable(&Failure::other("boom")));
}

// ============================================
// HANDLE ERROR
// ============================================

#[test]
fn given_failure_when_handled_then_logged_at_error_level_and_returned() {
    // GIVEN: A production logger (nothing written to the console)
    let logger = Logger::new(LoggerConfig::production(false));
    let failure = Failure::from_response(500u16, r#"{"message": "db down"}"#);

    // WHEN
    let classified = handle_error(&failure, &logger);

    // THEN: Same record as classify(), and it landed in the error buffer
    assert_eq!(classified, classify(&failure));
    let stored = logger.stored_errors();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].level, LogLevel::Error);
    assert_eq!(stored[0].message, "API Error");
    assert_eq!(stored[0].environment, AppMode::Production);
}
