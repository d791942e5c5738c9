use guard_core::logger::{HttpErrorSink, Logger, LoggerConfig};
use guard_core::security::REDACTION_MARKER;

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Wait for the sink's background POSTs to arrive.
async fn received(server: &MockServer, expected: usize) -> Vec<Request> {
    for _ in 0..100 {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.len() >= expected {
            return requests;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    server.received_requests().await.unwrap_or_default()
}

/// **VALUE**: Verifies production error events reach the tracking endpoint
/// as JSON, with sensitive data already masked.
///
/// **WHY THIS MATTERS**: This is the only channel through which production
/// failures become visible to the team. A masked-after-send bug would ship
/// user passwords to a third party.
///
/// **BUG THIS CATCHES**:
/// - Sink not attached or not called in production
/// - Event serialized with the wrong field names
/// - Masking skipped on the forwarding path
#[tokio::test]
async fn given_production_logger_with_http_sink_when_error_logged_then_posted_as_json() {
    // GIVEN: An error-tracking endpoint
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let sink = HttpErrorSink::new(&format!("{}/ingest", server.uri())).unwrap();
    let logger = Logger::new(LoggerConfig::production(true)).with_sink(sink);

    // WHEN
    logger.error(
        "Checkout failed",
        Some(json!({ "orderId": 17, "token": "tok_live_123" })),
    );

    // THEN
    let requests = received(&server, 1).await;
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["level"], "error");
    assert_eq!(body["message"], "Checkout failed");
    assert_eq!(body["environment"], "production");
    assert_eq!(body["data"]["orderId"], 17);
    assert_eq!(body["data"]["token"], REDACTION_MARKER);
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn given_rejecting_endpoint_when_forwarding_then_logger_keeps_working() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = HttpErrorSink::new(&server.uri()).unwrap();
    let logger = Logger::new(LoggerConfig::production(true)).with_sink(sink);

    logger.error("first", None);
    logger.warn("second", None);
    logger.info("not forwarded", None);

    let requests = received(&server, 2).await;
    assert_eq!(requests.len(), 2);
    assert_eq!(logger.stored_errors().len(), 1);
}

#[test]
fn given_no_runtime_when_forwarding_then_event_dropped_without_panic() {
    let sink = HttpErrorSink::new("http://127.0.0.1:9/ingest").unwrap();
    let logger = Logger::new(LoggerConfig::production(true)).with_sink(sink);

    logger.error("outside any runtime", None);

    assert_eq!(logger.stored_errors().len(), 1);
}

#[test]
fn given_malformed_endpoint_when_creating_sink_then_error() {
    let err = HttpErrorSink::new("not a url").unwrap_err();
    assert!(err.to_string().contains("Error Sink Error"));
}
