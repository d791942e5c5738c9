use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Failures raised by a storage tier.
///
/// These never escape `CredentialStore`; they are logged and absorbed there.
#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("Quota Exceeded Error: writing '{key}' needs {required} bytes, limit is {limit} {location}")]
    QuotaExceeded {
        key: String,
        required: usize,
        limit: usize,
        location: ErrorLocation,
    },

    #[error("Storage Unavailable Error: {message} {location}")]
    Unavailable {
        message: String,
        location: ErrorLocation,
    },

    #[error("Storage IO Error: {path}: {source} {location}")]
    Io {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage Format Error: {path}: {message} {location}")]
    Format {
        path: PathBuf,
        message: String,
        location: ErrorLocation,
    },
}

impl StorageError {
    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            location: ErrorLocation::from(Location::caller()),
            source,
        }
    }

    /// Short category name for log data.
    pub fn error_category(&self) -> &'static str {
        match self {
            StorageError::QuotaExceeded { .. } => "quota_exceeded",
            StorageError::Unavailable { .. } => "unavailable",
            StorageError::Io { .. } => "io",
            StorageError::Format { .. } => "format",
        }
    }
}
