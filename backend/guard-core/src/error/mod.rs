pub mod config;
pub mod guard;
pub mod logger;
pub mod security;
pub mod storage;

pub use guard::GuardError;
pub use security::{SecurityError, UploadRejection};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error(transparent)]
    Security(#[from] security::SecurityError),

    #[error(transparent)]
    Logger(#[from] logger::LoggerError),
}
