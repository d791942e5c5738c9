//! Shared primitives for the client guard workspace.
//!
//! Everything here is dependency-light and used by both the `models`
//! crate (plain data) and `guard-core` (the algorithms):
//!
//! - [`ErrorLocation`]: file/line/column captured with `#[track_caller]`
//! - [`HttpStatusCode`]: status code categorization for retry decisions
//! - [`RedactedSecret`]: credential wrapper that never prints its value

pub mod error;
pub mod http_status;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;

#[cfg(test)]
mod tests;
