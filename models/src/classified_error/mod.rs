//! Uniform failure record produced by the error classifier.

use crate::AppMode;

use common::HttpStatusCode;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Message shown to production users instead of the raw diagnostic.
pub const GENERIC_USER_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Taxonomy bucket of a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The request never completed (no response).
    Network,
    /// The server answered with an error response.
    Api,
    /// A generic application-level error raised by calling code.
    App,
    /// Anything the classifier does not recognize.
    Unknown,
    Validation,
    Authentication,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Api => "api",
            ErrorKind::App => "app",
            ErrorKind::Unknown => "unknown",
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure after classification.
///
/// Immutable: fields are only readable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    message: String,
    status_code: HttpStatusCode,
    kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ClassifiedError {
    pub fn new(
        kind: ErrorKind,
        status_code: impl Into<HttpStatusCode>,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status_code: status_code.into(),
            kind,
            details,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> HttpStatusCode {
        self.status_code
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Text safe to put in front of a user.
    ///
    /// Development builds see the raw message; production builds get a
    /// generic, non-diagnostic message while the full record stays in the
    /// local error buffer.
    pub fn user_message(&self, mode: AppMode) -> &str {
        match mode {
            AppMode::Development => &self.message,
            AppMode::Production => GENERIC_USER_MESSAGE,
        }
    }

    /// JSON form used as structured log data.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.kind, self.status_code, self.message)
    }
}

impl std::error::Error for ClassifiedError {}
