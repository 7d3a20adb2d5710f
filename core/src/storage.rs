//! # Durable key/value storage
//!
//! [`Storage`] stands in for the browser's cookies and `localStorage`: a flat
//! map from string keys to string values, read and written synchronously.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStorage`]: an in-process map. Clones share the same map, so a
//!   test can hand one clone to the context and inspect another.
//! - [`FileStorage`]: one file per key under a base directory.
//!
//! ## File layout
//!
//! ```text
//! <base_dir>/
//! ├── localCharacters.json
//! ├── deletedCharacters.json
//! ├── token.json
//! ├── refreshToken.json
//! └── user.json
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Synchronous string key/value store.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Read `key` and deserialize it. Missing keys yield `None`.
pub fn load_json<T: DeserializeOwned>(
    storage: &impl Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    storage: &impl Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)
}

/// Like [`load_json`], but logs and discards failures. Corrupt or unreadable
/// entries read as absent.
pub fn load_json_or_default<T: DeserializeOwned + Default>(storage: &impl Storage, key: &str) -> T {
    match load_json(storage, key) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!(key, error = %e, "discarding unreadable stored value");
            T::default()
        }
    }
}

/// Read a JSON array stored under `key`, decoding each element on its own.
///
/// Elements that do not decode as `T` are logged and skipped so the rest of
/// the list survives. An entry that is not an array at all reads as empty.
pub fn load_json_items<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Vec<T> {
    let raw: Vec<serde_json::Value> = load_json_or_default(storage, key);
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(key, index, error = %e, "skipping unreadable stored item");
                None
            }
        })
        .collect()
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Filesystem-backed storage that survives restarts.
#[derive(Clone, Debug)]
pub struct FileStorage {
    base: PathBuf,
}

impl FileStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.base)?;
        std::fs::write(self.entry_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.entry_path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Storage picked at runtime from `ClientConfig::storage_dir`.
#[derive(Clone, Debug)]
pub enum ConfiguredStorage {
    Memory(MemoryStorage),
    File(FileStorage),
}

impl ConfiguredStorage {
    pub fn from_dir(dir: Option<&std::path::Path>) -> Self {
        match dir {
            Some(dir) => ConfiguredStorage::File(FileStorage::new(dir)),
            None => ConfiguredStorage::Memory(MemoryStorage::new()),
        }
    }
}

impl Storage for ConfiguredStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            ConfiguredStorage::Memory(s) => s.get(key),
            ConfiguredStorage::File(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            ConfiguredStorage::Memory(s) => s.set(key, value),
            ConfiguredStorage::File(s) => s.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            ConfiguredStorage::Memory(s) => s.remove(key),
            ConfiguredStorage::File(s) => s.remove(key),
        }
    }
}
