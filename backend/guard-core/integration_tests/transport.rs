use guard_core::classifier::{Classify, Failure, TransportFailure, classify};
use guard_core::logger::{Logger, LoggerConfig};
use guard_core::retry::{RetryConfig, RetryPolicy};

use common::HttpStatusCode;
use models::ErrorKind;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One GET, mapped the way application code maps reqwest results.
async fn fetch(client: &reqwest::Client, url: &str) -> Result<String, Failure> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(TransportFailure::from_reqwest_response(response).await.into());
    }
    Ok(response.text().await?)
}

#[tokio::test]
async fn given_json_error_response_when_classified_then_api_error_with_server_message() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Display name taken",
            "details": { "field": "displayName" }
        })))
        .mount(&server)
        .await;

    // WHEN
    let failure = fetch(&reqwest::Client::new(), &format!("{}/profile", server.uri()))
        .await
        .unwrap_err();

    // THEN
    let classified = classify(&failure);
    assert_eq!(classified.kind(), ErrorKind::Api);
    assert_eq!(classified.status_code(), HttpStatusCode(422));
    assert_eq!(classified.message(), "Display name taken");
    assert_eq!(classified.details(), Some(&json!({ "field": "displayName" })));
    assert!(!failure.is_retryable());
}

#[tokio::test]
async fn given_unreachable_host_when_classified_then_network_error() {
    // Port 9 (discard) on loopback: connection refused
    let failure = fetch(&reqwest::Client::new(), "http://127.0.0.1:9/")
        .await
        .unwrap_err();

    let classified = failure.classify();
    assert_eq!(classified.kind(), ErrorKind::Network);
    assert_eq!(classified.status_code(), HttpStatusCode::SERVICE_UNAVAILABLE);
    assert!(failure.is_retryable());
}

/// **VALUE**: Verifies the retry policy recovers from a real transient 503.
///
/// **WHY THIS MATTERS**: End-to-end check that reqwest failures flow through
/// `Failure`, are judged retryable, and the next attempt's success wins.
#[tokio::test]
async fn given_one_transient_503_when_retrying_real_request_then_succeeds() {
    // GIVEN: First call 503, then 200
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1,2,3]"))
        .mount(&server)
        .await;

    let logger = Arc::new(Logger::new(LoggerConfig::production(false)));
    let policy = RetryPolicy::new(
        RetryConfig::new(3, Duration::from_millis(10), 2.0),
        logger,
    );
    let client = reqwest::Client::new();
    let url = format!("{}/items", server.uri());

    // WHEN
    let body = policy.run(|| fetch(&client, &url)).await.unwrap();

    // THEN
    assert_eq!(body, "[1,2,3]");
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 2);
}
