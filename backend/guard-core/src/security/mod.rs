//! Security helpers that sit next to credential handling: input and URL
//! sanitization, upload checks, log payload masking, fingerprinting and
//! the content security policy string.

pub mod csp;
pub mod hash;
pub mod mask;
pub mod sanitize;
pub mod upload;

pub use csp::{content_security_policy, generate_nonce};
pub use hash::hash_text;
pub use mask::{REDACTION_MARKER, mask_sensitive};
pub use sanitize::{sanitize_input, sanitize_url};
pub use upload::{FileUploadPolicy, UploadCandidate, validate_file_upload};
