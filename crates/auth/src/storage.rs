//! Durable persistence for the `token` and `user` keys.
//!
//! Both keys are always written and erased in a single operation so that a
//! reader never observes one without the other.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Raw persisted values. `user` holds the serialized profile JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntries {
    #[serde(default, rename = "token", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, rename = "user", skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl StoredEntries {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

pub trait SessionStorage: Send + Sync + 'static {
    fn read(&self) -> Result<StoredEntries, StorageError>;

    /// Persist both keys together.
    fn write(&self, token: &str, user: &str) -> Result<(), StorageError>;

    /// Remove both keys together.
    fn erase(&self) -> Result<(), StorageError>;
}

/// Keeps the two keys in a single JSON document on disk.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStorage for FileStorage {
    fn read(&self) -> Result<StoredEntries, StorageError> {
        let _guard = self.lock.lock();

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(StoredEntries::default())
            }
            Err(error) => return Err(self.io_error(error)),
        };

        if contents.trim().is_empty() {
            return Ok(StoredEntries::default());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, token: &str, user: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
            }
        }

        let entries = StoredEntries {
            token: Some(token.to_string()),
            user: Some(user.to_string()),
        };
        let body = serde_json::to_vec_pretty(&entries)?;

        // rename is atomic on the same filesystem, so readers see either
        // the previous pair or the new one
        let staging = self.staging_path();
        fs::write(&staging, body).map_err(|error| self.io_error(error))?;
        fs::rename(&staging, &self.path).map_err(|error| self.io_error(error))?;

        debug!(path = %self.path.display(), "persisted session");
        Ok(())
    }

    fn erase(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock();

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "erased persisted session");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}

/// Process-local storage, used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<StoredEntries>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with arbitrary (possibly inconsistent) entries.
    pub fn with_entries(entries: StoredEntries) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn snapshot(&self) -> StoredEntries {
        self.entries.lock().clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> Result<StoredEntries, StorageError> {
        Ok(self.entries.lock().clone())
    }

    fn write(&self, token: &str, user: &str) -> Result<(), StorageError> {
        *self.entries.lock() = StoredEntries {
            token: Some(token.to_string()),
            user: Some(user.to_string()),
        };
        Ok(())
    }

    fn erase(&self) -> Result<(), StorageError> {
        *self.entries.lock() = StoredEntries::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_reads_empty_when_missing() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        assert!(storage.read().unwrap().is_empty());
    }

    #[test]
    fn file_storage_round_trips_both_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/session.json"));

        storage.write("tok", "{\"id\":1}").unwrap();
        let entries = storage.read().unwrap();

        assert_eq!(entries.token.as_deref(), Some("tok"));
        assert_eq!(entries.user.as_deref(), Some("{\"id\":1}"));
        assert!(!dir.path().join("nested/session.json.tmp").exists());
    }

    #[test]
    fn file_storage_erase_removes_both_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        storage.write("tok", "{}").unwrap();
        storage.erase().unwrap();

        assert!(storage.read().unwrap().is_empty());
        assert!(!storage.path().exists());
        storage.erase().expect("erasing twice is a no-op");
    }

    #[test]
    fn file_storage_reports_corrupt_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(path);
        assert!(matches!(storage.read(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn file_storage_uses_token_and_user_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::new(&path);

        storage.write("abc", "{}").unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(raw[TOKEN_KEY], "abc");
        assert_eq!(raw[USER_KEY], "{}");
    }

    #[test]
    fn memory_storage_write_and_erase() {
        let storage = MemoryStorage::new();
        storage.write("t", "u").unwrap();
        assert_eq!(storage.snapshot().token.as_deref(), Some("t"));

        storage.erase().unwrap();
        assert!(storage.snapshot().is_empty());
    }
}
