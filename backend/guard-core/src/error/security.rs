//! Error types for the security helpers.

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SecurityError {
    #[error("Upload Rejected: '{file_name}': {reason} {location}")]
    Upload {
        file_name: String,
        reason: UploadRejection,
        location: ErrorLocation,
    },
}

impl SecurityError {
    #[track_caller]
    pub fn upload(file_name: impl Into<String>, reason: UploadRejection) -> Self {
        SecurityError::Upload {
            file_name: file_name.into(),
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn upload_reason(&self) -> Option<&UploadRejection> {
        match self {
            SecurityError::Upload { reason, .. } => Some(reason),
        }
    }
}

/// Specific reasons for rejecting an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    TooLarge { max: u64, actual: u64 },
    MimeTypeNotAllowed { mime_type: String },
    ExtensionNotAllowed { extension: String },
    ExtensionMismatch { extension: String, mime_type: String },
}

impl std::fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge { max, actual } => {
                write!(f, "file too large ({} bytes, maximum {})", actual, max)
            }
            Self::MimeTypeNotAllowed { mime_type } => {
                write!(f, "file type '{}' is not allowed", mime_type)
            }
            Self::ExtensionNotAllowed { extension } if extension.is_empty() => {
                write!(f, "file has no extension")
            }
            Self::ExtensionNotAllowed { extension } => {
                write!(f, "extension '.{}' is not allowed", extension)
            }
            Self::ExtensionMismatch {
                extension,
                mime_type,
            } => {
                write!(
                    f,
                    "extension '.{}' does not match file type '{}'",
                    extension, mime_type
                )
            }
        }
    }
}
