//! Two-tier credential storage.
//!
//! # Policy
//! - Writes go to exactly one tier, chosen by the process mode: the
//!   session tier in production, the persistent tier otherwise.
//! - Reads probe the session tier first and fall back to the persistent
//!   tier, whatever the mode.
//! - `remove` and `clear` touch both tiers; one failing tier does not
//!   stop the other.
//! - A failing tier never surfaces an error: the failure is logged at
//!   error level and the operation becomes a no-op (or `None`).

pub mod auth;
pub mod file;
pub mod memory;

pub use auth::{AUTH_TOKEN_KEY, AuthTokens, REFRESH_TOKEN_KEY, USER_KEY};
pub use file::{CREDENTIALS_FILE_NAME, FileStore};
pub use memory::MemoryStore;

use crate::error::storage::StorageError;
use crate::logger::Logger;

use common::RedactedSecret;
use models::{AppMode, StorageTier, StoredCredential};

use std::fmt;
use std::sync::Arc;

use serde_json::json;

/// One storage area. Implementations must be safe to share across threads.
pub trait KeyValueStore: Send + Sync {
    /// Short name used in log data.
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

pub struct CredentialStore {
    mode: AppMode,
    session: Box<dyn KeyValueStore>,
    persistent: Box<dyn KeyValueStore>,
    logger: Arc<Logger>,
}

impl CredentialStore {
    pub fn new(
        mode: AppMode,
        session: impl KeyValueStore + 'static,
        persistent: impl KeyValueStore + 'static,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            mode,
            session: Box::new(session),
            persistent: Box::new(persistent),
            logger,
        }
    }

    /// The tier `set` writes to in this mode.
    pub fn write_tier(&self) -> StorageTier {
        match self.mode {
            AppMode::Production => StorageTier::Session,
            AppMode::Development => StorageTier::Persistent,
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        let tier = self.write_tier();
        let result = self.tier(tier).set(key, value);
        self.absorb("set", key, result);
    }

    pub fn get(&self, key: &str) -> Option<RedactedSecret> {
        self.entry(key).map(|credential| credential.value)
    }

    /// Like [`CredentialStore::get`], also reporting which tier answered.
    pub fn entry(&self, key: &str) -> Option<StoredCredential> {
        let result = self.probe(key);
        self.absorb("get", key, result).flatten()
    }

    /// Each tier is attempted even when the other one fails.
    pub fn remove(&self, key: &str) {
        for tier in [StorageTier::Session, StorageTier::Persistent] {
            let result = self.tier(tier).remove(key);
            self.absorb("remove", key, result);
        }
    }

    pub fn clear(&self) {
        for tier in [StorageTier::Session, StorageTier::Persistent] {
            let result = self.tier(tier).clear();
            self.absorb("clear", "*", result);
        }
    }

    fn probe(&self, key: &str) -> Result<Option<StoredCredential>, StorageError> {
        for tier in [StorageTier::Session, StorageTier::Persistent] {
            if let Some(value) = self.tier(tier).get(key)? {
                return Ok(Some(StoredCredential {
                    key: key.to_owned(),
                    value: RedactedSecret::new(value),
                    tier,
                }));
            }
        }
        Ok(None)
    }

    fn tier(&self, tier: StorageTier) -> &dyn KeyValueStore {
        match tier {
            StorageTier::Session => self.session.as_ref(),
            StorageTier::Persistent => self.persistent.as_ref(),
        }
    }

    /// Log a tier failure and swallow it.
    fn absorb<T>(&self, operation: &str, key: &str, result: Result<T, StorageError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.logger.error(
                    "Credential storage failure",
                    Some(json!({
                        "operation": operation,
                        "key": key,
                        "category": e.error_category(),
                        "error": e.to_string(),
                    })),
                );
                None
            }
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("mode", &self.mode)
            .field("session", &self.session.name())
            .field("persistent", &self.persistent.name())
            .finish()
    }
}
