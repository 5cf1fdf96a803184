//! Key-value storage backends
//!
//! The `KeyValueStore` trait is the storage port the rest of the crate talks to.
//! Two backends exist: `MemoryStore` backs the session tier and lives only as
//! long as the process, `FileStore` backs the local tier and persists a single
//! JSON map in an XDG-compliant cache directory (`~/.cache/courtside/` on Linux).

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the durable store inside the cache directory
const STORE_FILE: &str = "storage.json";

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// A storage namespace must contain at least one non-whitespace character
    #[error("Storage namespace is required")]
    EmptyNamespace,

    /// Reading or writing the backing file failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The value could not be converted to or from JSON
    #[error("Storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal string key-value store, modelled on browser storage
///
/// Keys are full (already namespaced) keys. Implementations use interior
/// mutability so a store can be shared between managers.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently held by the store
    fn keys(&self) -> Vec<String>;
}

fn lock(entries: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory store used for the session tier
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }
}

/// Durable store that keeps every key in one JSON file
///
/// The file is read once on construction and rewritten atomically (write to a
/// temporary file, then rename) after every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Creates a FileStore in the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "courtside")?;
        Some(Self::in_dir(project_dirs.cache_dir()))
    }

    /// Creates a FileStore whose backing file lives in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_path(dir.join(STORE_FILE))
    }

    /// Creates a FileStore backed by the given file
    ///
    /// A missing or unreadable file starts the store empty.
    pub fn with_path(path: PathBuf) -> Self {
        let entries = match Self::read_file(&path) {
            Ok(entries) => entries,
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Discarding unreadable store at {}: {}", path.display(), e);
                HashMap::new()
            }
        };
        debug!("Opened store {} with {} keys", path.display(), entries.len());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<HashMap<String, String>, StorageError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        let previous = entries.insert(key.to_string(), value);
        if let Err(e) = self.persist(&entries) {
            // Memory must keep matching the file
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.persist(&entries) {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }
}
