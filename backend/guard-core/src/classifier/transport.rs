//! The shape of a transport failure as seen by the classifier.

use common::HttpStatusCode;

use serde_json::{Value, json};
use thiserror::Error as ThisError;

#[derive(Debug, Clone, ThisError)]
pub enum TransportFailure {
    /// The request never completed (DNS, connect, timeout, offline).
    #[error("No response received: {message}")]
    NoResponse { message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} response")]
    Response { status: HttpStatusCode, body: Value },
}

impl TransportFailure {
    pub fn no_response(message: impl Into<String>) -> Self {
        TransportFailure::NoResponse {
            message: message.into(),
        }
    }

    /// Response with a raw body; JSON bodies are parsed, anything else is
    /// kept as the `error` field.
    pub fn response(status: impl Into<HttpStatusCode>, body: &str) -> Self {
        let body = match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(_) if body.trim().is_empty() => Value::Null,
            Err(_) => json!({ "error": body.trim() }),
        };

        TransportFailure::Response {
            status: status.into(),
            body,
        }
    }

    pub fn status(&self) -> Option<HttpStatusCode> {
        match self {
            TransportFailure::NoResponse { .. } => None,
            TransportFailure::Response { status, .. } => Some(*status),
        }
    }

    /// Categorize a reqwest error without looking at its message text.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            return TransportFailure::no_response(error.to_string());
        }

        match error.status() {
            Some(status) => TransportFailure::Response {
                status: HttpStatusCode(status.as_u16()),
                body: Value::Null,
            },
            None => TransportFailure::no_response(error.to_string()),
        }
    }

    /// Turn a completed, unsuccessful response into a failure, reading the
    /// body. Call only when `response.status()` is not a success.
    pub async fn from_reqwest_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::response(status, &body)
    }
}
