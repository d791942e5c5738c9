use common::ErrorLocation;
use models::{ClassifiedError, FormResult};

use std::panic::Location;

use thiserror::Error as ThisError;

/// Why a guarded action did not produce a value.
#[derive(Debug, ThisError)]
pub enum GuardError {
    #[error("Rate Limited Error: too many attempts for '{key}' {location}")]
    RateLimited { key: String, location: ErrorLocation },

    #[error("Invalid Input Error: {} field(s) failed validation {location}", .result.errors.len())]
    Invalid {
        result: FormResult,
        location: ErrorLocation,
    },

    #[error("Action Failed Error: {error} {location}")]
    Failed {
        error: ClassifiedError,
        location: ErrorLocation,
    },
}

impl GuardError {
    #[track_caller]
    pub fn rate_limited(key: impl Into<String>) -> Self {
        GuardError::RateLimited {
            key: key.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid(result: FormResult) -> Self {
        GuardError::Invalid {
            result,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn failed(error: ClassifiedError) -> Self {
        GuardError::Failed {
            error,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// The classified failure, when the action itself failed.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            GuardError::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn error_category(&self) -> &'static str {
        match self {
            GuardError::RateLimited { .. } => "rate_limited",
            GuardError::Invalid { .. } => "invalid_input",
            GuardError::Failed { .. } => "failed",
        }
    }
}
