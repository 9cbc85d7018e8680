//! Origin-scoped key/value storage.
//!
//! The backend trait abstracts where the bytes live, allowing both a
//! file-backed document (one file per origin) and an in-memory map for tests.
//! [`Storage`] is what components hold: it speaks JSON and never lets a
//! backend failure escape as an error.

mod file;
mod memory;

use std::{fmt, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),

    #[error("quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Raw string store. Values are opaque to the backend.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn delete(&self, key: &str) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Clone)]
pub struct Storage(Arc<dyn KeyValueStore>);

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self(Arc::new(store))
    }

    pub fn memory() -> Self {
        Self::new(MemoryStore::default())
    }

    /// Decoded value under `key`, or `default` when absent or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.find(key).unwrap_or(default)
    }

    /// Decoded value under `key`; absent and malformed both read as `None`.
    pub fn find<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(key, err = %err, "failed to decode stored value");
                None
            }
        }
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        match self.0.read(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(key, err = %err, "failed to read from store");
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_raw(key, &raw),
            Err(err) => {
                tracing::error!(key, err = %err, "failed to encode value");
                false
            }
        }
    }

    pub fn set_raw(&self, key: &str, raw: &str) -> bool {
        match self.0.write(key, raw) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(key, err = %err, "failed to write to store");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.0.delete(key) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(key, err = %err, "failed to remove from store");
                false
            }
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }

    pub fn clear(&self) -> bool {
        match self.0.clear() {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(err = %err, "failed to clear store");
                false
            }
        }
    }
}
