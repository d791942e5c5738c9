use super::KeyValueStore;
use crate::APP_NAME;
use crate::error::storage::StorageError;

use common::ErrorLocation;

use std::collections::BTreeMap;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::Mutex;

pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Durable tier: a JSON object on disk, rewritten atomically on every
/// change (temp file + rename).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store at `{dir}/credentials.json`. The directory is created on the
    /// first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CREDENTIALS_FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    /// Platform data directory, e.g. `~/.local/share/client-guard`.
    #[track_caller]
    pub fn in_default_location() -> Result<Self, StorageError> {
        let base = dirs::data_local_dir()
            .ok_or_else(|| StorageError::unavailable("No local data directory on this platform"))?;
        Ok(Self::new(base.join(APP_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[track_caller]
    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| StorageError::Format {
            path: self.path.clone(),
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Format {
            path: self.path.clone(),
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json).map_err(|e| StorageError::io(&temp_path, e))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| StorageError::io(&self.path, e))?;

        debug!("Wrote {} credential entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_all()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path).map_err(|e| StorageError::io(&self.path, e))
    }
}
