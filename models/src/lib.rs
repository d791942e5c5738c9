//! Domain models for the client guard.
//!
//! This crate contains the plain data structures that flow between the
//! guard components. Models carry no policy - classification, retry,
//! throttling and storage decisions all live in `guard-core`.
//!
//! ## Architecture
//!
//! - **common**: error locations, status codes, redacted secrets
//! - **models** (this crate): records produced and consumed by the guard
//! - **guard-core**: the algorithms operating on these records

pub mod app_mode;
pub mod classified_error;
pub mod credential;
pub mod log_event;
pub mod retry_attempt;
pub mod validation;

pub use app_mode::AppMode;
pub use classified_error::{ClassifiedError, ErrorKind};
pub use credential::{StorageTier, StoredCredential};
pub use log_event::{LogEvent, LogLevel};
pub use retry_attempt::RetryAttempt;
pub use validation::{FormResult, ValidationResult};

#[cfg(test)]
mod tests;
