//! Domain errors raised by calling code.
//!
//! The hierarchy is a closed set of kinds sharing one payload; the
//! classifier switches on the kind.

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use serde_json::Value;
use thiserror::Error as ThisError;

pub const DEFAULT_APPLICATION_MESSAGE: &str = "An application error occurred";
pub const DEFAULT_VALIDATION_MESSAGE: &str = "Validation failed";
pub const DEFAULT_AUTHENTICATION_MESSAGE: &str = "Unauthorized";
pub const DEFAULT_NETWORK_MESSAGE: &str = "Network error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppErrorKind {
    /// Base application error.
    Application,
    Validation,
    Authentication,
    Network,
}

impl AppErrorKind {
    pub fn default_status(&self) -> HttpStatusCode {
        match self {
            AppErrorKind::Application => HttpStatusCode(500),
            AppErrorKind::Validation => HttpStatusCode(400),
            AppErrorKind::Authentication => HttpStatusCode(401),
            AppErrorKind::Network => HttpStatusCode(503),
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            AppErrorKind::Application => DEFAULT_APPLICATION_MESSAGE,
            AppErrorKind::Validation => DEFAULT_VALIDATION_MESSAGE,
            AppErrorKind::Authentication => DEFAULT_AUTHENTICATION_MESSAGE,
            AppErrorKind::Network => DEFAULT_NETWORK_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, ThisError)]
#[error("{message} {location}")]
pub struct AppError {
    kind: AppErrorKind,
    message: String,
    status_code: HttpStatusCode,
    details: Option<Value>,
    location: ErrorLocation,
}

impl AppError {
    /// Error of `kind` with its default status code.
    #[track_caller]
    pub fn new(kind: AppErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: kind.default_status(),
            details: None,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn application(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Application, message)
    }

    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Validation, message)
    }

    /// 401 with the default "Unauthorized" message.
    #[track_caller]
    pub fn authentication() -> Self {
        Self::new(
            AppErrorKind::Authentication,
            AppErrorKind::Authentication.default_message(),
        )
    }

    /// 503 with the default "Network error" message.
    #[track_caller]
    pub fn network() -> Self {
        Self::new(AppErrorKind::Network, AppErrorKind::Network.default_message())
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_status(mut self, status_code: impl Into<HttpStatusCode>) -> Self {
        self.status_code = status_code.into();
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn kind(&self) -> AppErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> HttpStatusCode {
        self.status_code
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn location(&self) -> ErrorLocation {
        self.location
    }
}
