//! Checks applied to a file before it is uploaded.

use crate::error::{SecurityError, UploadRejection};

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const DEFAULT_ALLOWED_MIME_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Known extension -> MIME type pairs.
const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadPolicy {
    pub max_bytes: u64,
    pub allowed_mime_types: Vec<String>,
}

impl FileUploadPolicy {
    /// Extensions accepted under this policy: those whose MIME type is on
    /// the allow-list.
    pub fn allowed_extensions(&self) -> Vec<&'static str> {
        EXTENSION_MIME_TYPES
            .iter()
            .filter(|(_, mime)| self.allows_mime(mime))
            .map(|(extension, _)| *extension)
            .collect()
    }

    fn allows_mime(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }
}

impl Default for FileUploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|mime| mime.to_string())
                .collect(),
        }
    }
}

/// What the client knows about a picked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub file_name: String,
    /// MIME type as declared by the picker / browser.
    pub mime_type: String,
    pub size_bytes: u64,
}

impl UploadCandidate {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    /// Lowercased text after the last dot, empty if there is none.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// Size, then MIME type, then extension, then extension/MIME agreement.
#[track_caller]
pub fn validate_file_upload(
    candidate: &UploadCandidate,
    policy: &FileUploadPolicy,
) -> Result<(), SecurityError> {
    if candidate.size_bytes > policy.max_bytes {
        return Err(SecurityError::upload(
            &candidate.file_name,
            UploadRejection::TooLarge {
                max: policy.max_bytes,
                actual: candidate.size_bytes,
            },
        ));
    }

    if !policy.allows_mime(&candidate.mime_type) {
        return Err(SecurityError::upload(
            &candidate.file_name,
            UploadRejection::MimeTypeNotAllowed {
                mime_type: candidate.mime_type.clone(),
            },
        ));
    }

    let extension = candidate.extension();
    if !policy.allowed_extensions().contains(&extension.as_str()) {
        return Err(SecurityError::upload(
            &candidate.file_name,
            UploadRejection::ExtensionNotAllowed { extension },
        ));
    }

    let extension_mime = EXTENSION_MIME_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, mime)| *mime);

    if !extension_mime.is_some_and(|mime| mime.eq_ignore_ascii_case(&candidate.mime_type)) {
        return Err(SecurityError::upload(
            &candidate.file_name,
            UploadRejection::ExtensionMismatch {
                extension,
                mime_type: candidate.mime_type.clone(),
            },
        ));
    }

    Ok(())
}
