//! Failure classification.
//!
//! Every failure the guard sees is turned into a [`ClassifiedError`] by
//! [`classify`]. Decision order:
//!
//! 1. transport failure without a response -> `network`, 503
//! 2. transport failure with a response -> `api`, response status, message
//!    from the body's `message`, then `error`, then a generic fallback
//! 3. domain error -> the domain kind, with the error's own status/message
//! 4. anything else -> `unknown`, 500
//!
//! Classification never fails and never raises.

pub mod app_error;
pub mod transport;

pub use app_error::{AppError, AppErrorKind};
pub use transport::TransportFailure;

use crate::logger::Logger;

use common::HttpStatusCode;
use models::{ClassifiedError, ErrorKind};

use serde_json::{Value, json};
use thiserror::Error as ThisError;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Any failure an operation can raise.
#[derive(Debug, Clone, ThisError)]
pub enum Failure {
    #[error(transparent)]
    Transport(#[from] TransportFailure),

    #[error(transparent)]
    App(#[from] AppError),

    /// Failures from outside the taxonomy (a panic message, a foreign error).
    #[error("{0}")]
    Other(String),
}

impl Failure {
    pub fn other(message: impl Into<String>) -> Self {
        Failure::Other(message.into())
    }

    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        Failure::Transport(TransportFailure::from_reqwest(error))
    }

    pub fn from_response(status: impl Into<HttpStatusCode>, body: &str) -> Self {
        Failure::Transport(TransportFailure::response(status, body))
    }
}

impl From<reqwest::Error> for Failure {
    fn from(error: reqwest::Error) -> Self {
        Failure::from_reqwest(&error)
    }
}

/// Errors the retry policy and the action guard know how to judge.
pub trait Classify {
    fn classify(&self) -> ClassifiedError;

    /// Status of the transport response, if the failure carries one.
    fn response_status(&self) -> Option<HttpStatusCode>;

    /// Client errors (4xx responses) are not transient; everything else is.
    fn is_retryable(&self) -> bool {
        !self
            .response_status()
            .is_some_and(|status| status.is_client_error())
    }
}

impl Classify for Failure {
    fn classify(&self) -> ClassifiedError {
        classify(self)
    }

    fn response_status(&self) -> Option<HttpStatusCode> {
        match self {
            Failure::Transport(transport) => transport.status(),
            _ => None,
        }
    }
}

impl Classify for TransportFailure {
    fn classify(&self) -> ClassifiedError {
        classify_transport(self)
    }

    fn response_status(&self) -> Option<HttpStatusCode> {
        self.status()
    }
}

impl Classify for AppError {
    fn classify(&self) -> ClassifiedError {
        classify_app(self)
    }

    fn response_status(&self) -> Option<HttpStatusCode> {
        None
    }
}

pub fn classify(failure: &Failure) -> ClassifiedError {
    match failure {
        Failure::Transport(transport) => classify_transport(transport),
        Failure::App(app) => classify_app(app),
        Failure::Other(_) => ClassifiedError::new(
            ErrorKind::Unknown,
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            GENERIC_ERROR_MESSAGE,
            None,
        ),
    }
}

pub fn is_retryable(failure: &Failure) -> bool {
    failure.is_retryable()
}

/// Classify and record the failure at error level.
pub fn handle_error<E>(error: &E, logger: &Logger) -> ClassifiedError
where
    E: Classify + ?Sized,
{
    let classified = error.classify();

    let label = match classified.kind() {
        ErrorKind::Network => "Network Error",
        ErrorKind::Api => "API Error",
        ErrorKind::Validation => "Validation Error",
        ErrorKind::Authentication => "Authentication Error",
        ErrorKind::App => "Application Error",
        ErrorKind::Unknown => "Unknown Error",
    };
    logger.error(label, Some(classified.to_value()));

    classified
}

fn classify_transport(transport: &TransportFailure) -> ClassifiedError {
    match transport {
        TransportFailure::NoResponse { message } => ClassifiedError::new(
            ErrorKind::Network,
            HttpStatusCode::SERVICE_UNAVAILABLE,
            NETWORK_ERROR_MESSAGE,
            Some(json!({ "cause": message })),
        ),
        TransportFailure::Response { status, body } => {
            let message = body_text(body, "message")
                .or_else(|| body_text(body, "error"))
                .unwrap_or(GENERIC_ERROR_MESSAGE);

            ClassifiedError::new(
                ErrorKind::Api,
                *status,
                message,
                body.get("details").cloned(),
            )
        }
    }
}

fn classify_app(app: &AppError) -> ClassifiedError {
    let kind = match app.kind() {
        AppErrorKind::Application => ErrorKind::App,
        AppErrorKind::Validation => ErrorKind::Validation,
        AppErrorKind::Authentication => ErrorKind::Authentication,
        AppErrorKind::Network => ErrorKind::Network,
    };

    ClassifiedError::new(
        kind,
        app.status_code(),
        app.message(),
        app.details().cloned(),
    )
}

/// Non-empty string field of a JSON body.
fn body_text<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}
