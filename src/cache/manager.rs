//! Namespaced storage manager over the local and session tiers
//!
//! Provides a `StorageManager` that prefixes every key with the widget's
//! namespace, serializes values to JSON, and never surfaces storage failures to
//! callers: errors are logged and reads fall back to `None`.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::store::{FileStore, KeyValueStore, MemoryStore, StorageError};

/// Separator between the namespace and the logical key
const NAMESPACE_SEPARATOR: &str = "::";

/// Storage tier a value is kept in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageTier {
    /// Durable storage that survives restarts
    Local,
    /// Process-lifetime storage, cleared on every run and on explicit refresh
    Session,
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageTier::Local => write!(f, "local"),
            StorageTier::Session => write!(f, "session"),
        }
    }
}

/// Reads and writes JSON values under one namespace
///
/// Cloning is cheap: both tiers are shared behind `Arc`s, so two managers with
/// different namespaces can sit on top of the same stores.
#[derive(Clone)]
pub struct StorageManager {
    namespace: String,
    local: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageManager")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl StorageManager {
    /// Creates a manager using the XDG file store for the local tier
    ///
    /// Falls back to an in-memory local tier when no cache directory can be
    /// determined.
    pub fn new(namespace: &str) -> Result<Self, StorageError> {
        let local: Arc<dyn KeyValueStore> = match FileStore::new() {
            Some(store) => Arc::new(store),
            None => {
                warn!("No cache directory available; local storage will not persist");
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_stores(namespace, local, Arc::new(MemoryStore::new()))
    }

    /// Creates a manager over explicit backends
    ///
    /// Useful for testing or when a specific storage location is needed.
    pub fn with_stores(
        namespace: &str,
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
    ) -> Result<Self, StorageError> {
        if namespace.trim().is_empty() {
            return Err(StorageError::EmptyNamespace);
        }
        Ok(Self {
            namespace: namespace.to_string(),
            local,
            session,
        })
    }

    /// Creates a manager whose tiers are both in memory
    pub fn in_memory(namespace: &str) -> Result<Self, StorageError> {
        Self::with_stores(
            namespace,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Returns the namespace this manager writes under
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Builds the full storage key for a logical key
    pub fn namespaced_key(&self, key: &str) -> String {
        format!("{}{}{}", self.namespace, NAMESPACE_SEPARATOR, key)
    }

    fn store(&self, tier: StorageTier) -> &dyn KeyValueStore {
        match tier {
            StorageTier::Local => self.local.as_ref(),
            StorageTier::Session => self.session.as_ref(),
        }
    }

    /// Reads a JSON value from the given tier
    ///
    /// Returns `None` when the key is absent or the stored text does not
    /// deserialize into `T`.
    pub fn get_json<T: DeserializeOwned>(&self, tier: StorageTier, key: &str) -> Option<T> {
        let full_key = self.namespaced_key(key);
        debug!("Retrieve {} storage for key: {}", tier, full_key);

        let raw = self.store(tier).get(&full_key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("{} storage hit for key: {}", tier, full_key);
                Some(value)
            }
            Err(e) => {
                error!("Error reading {} storage for key {}: {}", tier, full_key, e);
                None
            }
        }
    }

    /// Writes a JSON value to the given tier
    ///
    /// Serialization and backend failures are logged and otherwise ignored.
    pub fn put_json<T: Serialize + ?Sized>(&self, tier: StorageTier, key: &str, value: &T) {
        let full_key = self.namespaced_key(key);
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|json| self.store(tier).set(&full_key, json));

        match result {
            Ok(()) => debug!("{} storage saved for key: {}", tier, full_key),
            Err(e) => error!("Storage save error for key {}: {}", full_key, e),
        }
    }

    /// Removes a single key from the given tier
    pub fn remove(&self, tier: StorageTier, key: &str) {
        let full_key = self.namespaced_key(key);
        match self.store(tier).remove(&full_key) {
            Ok(()) => debug!("{} storage removed for key: {}", tier, full_key),
            Err(e) => error!("Storage remove error for key {}: {}", full_key, e),
        }
    }

    /// Removes every key under this namespace from the given tier
    ///
    /// Keys belonging to other namespaces are left untouched. Returns the
    /// number of keys removed.
    pub fn clear_namespace(&self, tier: StorageTier) -> usize {
        let prefix = format!("{}{}", self.namespace, NAMESPACE_SEPARATOR);
        let store = self.store(tier);

        let mut removed = 0;
        for key in store.keys().into_iter().filter(|k| k.starts_with(&prefix)) {
            match store.remove(&key) {
                Ok(()) => removed += 1,
                Err(e) => error!("Storage remove error for key {}: {}", key, e),
            }
        }

        debug!(
            "{} storage cleared for namespace {}. Keys removed: {}",
            tier, self.namespace, removed
        );
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn shared_managers(ns1: &str, ns2: &str) -> (StorageManager, StorageManager) {
        let local: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        (
            StorageManager::with_stores(ns1, local.clone(), session.clone()).unwrap(),
            StorageManager::with_stores(ns2, local, session).unwrap(),
        )
    }

    #[test]
    fn test_rejects_blank_namespace() {
        assert!(matches!(
            StorageManager::in_memory("   "),
            Err(StorageError::EmptyNamespace)
        ));
    }

    #[test]
    fn test_namespaced_key_format() {
        let storage = StorageManager::in_memory("bbw-nbawidget").unwrap();
        assert_eq!(
            storage.namespaced_key("user_preferences"),
            "bbw-nbawidget::user_preferences"
        );
    }

    #[test]
    fn test_put_then_get_returns_equal_value() {
        let storage = StorageManager::in_memory("ns").unwrap();
        let value = json!({
            "events": [{"id": "401", "name": "Spurs at Lakers"}],
            "nested": {"count": 3, "flag": true, "none": null}
        });

        storage.put_json(StorageTier::Session, "schedule", &value);
        let read: serde_json::Value = storage.get_json(StorageTier::Session, "schedule").unwrap();

        assert_eq!(read, value);
    }

    #[test]
    fn test_put_then_get_typed_value() {
        let storage = StorageManager::in_memory("ns").unwrap();
        let data = TestData {
            name: "roundtrip".to_string(),
            value: 12345,
        };

        storage.put_json(StorageTier::Local, "typed", &data);

        assert_eq!(storage.get_json(StorageTier::Local, "typed"), Some(data));
    }

    #[test]
    fn test_tiers_are_separate() {
        let storage = StorageManager::in_memory("ns").unwrap();
        storage.put_json(StorageTier::Local, "key", &1);

        assert_eq!(storage.get_json::<i32>(StorageTier::Local, "key"), Some(1));
        assert_eq!(storage.get_json::<i32>(StorageTier::Session, "key"), None);
    }

    #[test]
    fn test_get_returns_none_for_type_mismatch() {
        let storage = StorageManager::in_memory("ns").unwrap();
        storage.put_json(StorageTier::Session, "key", &"text");

        assert_eq!(storage.get_json::<TestData>(StorageTier::Session, "key"), None);
    }

    #[test]
    fn test_remove_deletes_single_key() {
        let storage = StorageManager::in_memory("ns").unwrap();
        storage.put_json(StorageTier::Session, "a", &1);
        storage.put_json(StorageTier::Session, "b", &2);

        storage.remove(StorageTier::Session, "a");

        assert_eq!(storage.get_json::<i32>(StorageTier::Session, "a"), None);
        assert_eq!(storage.get_json::<i32>(StorageTier::Session, "b"), Some(2));
    }

    #[test]
    fn test_clear_namespace_leaves_other_namespaces() {
        let (ns1, ns2) = shared_managers("ns1", "ns2");
        ns1.put_json(StorageTier::Session, "schedule", &1);
        ns1.put_json(StorageTier::Session, "standings", &2);
        ns2.put_json(StorageTier::Session, "schedule", &3);

        let removed = ns1.clear_namespace(StorageTier::Session);

        assert_eq!(removed, 2);
        assert_eq!(ns1.get_json::<i32>(StorageTier::Session, "schedule"), None);
        assert_eq!(ns2.get_json::<i32>(StorageTier::Session, "schedule"), Some(3));
    }

    #[test]
    fn test_clear_namespace_does_not_match_longer_prefix() {
        let (short, long) = shared_managers("ns", "ns-extra");
        long.put_json(StorageTier::Local, "key", &1);

        assert_eq!(short.clear_namespace(StorageTier::Local), 0);
        assert_eq!(long.get_json::<i32>(StorageTier::Local, "key"), Some(1));
    }

    #[test]
    fn test_clear_namespace_only_touches_requested_tier() {
        let storage = StorageManager::in_memory("ns").unwrap();
        storage.put_json(StorageTier::Local, "key", &1);
        storage.put_json(StorageTier::Session, "key", &2);

        storage.clear_namespace(StorageTier::Session);

        assert_eq!(storage.get_json::<i32>(StorageTier::Local, "key"), Some(1));
    }

    #[test]
    fn test_local_tier_survives_new_manager() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let open = || {
            StorageManager::with_stores(
                "ns",
                Arc::new(FileStore::in_dir(temp_dir.path())),
                Arc::new(MemoryStore::new()),
            )
            .unwrap()
        };

        open().put_json(StorageTier::Local, "standings_2024_2", &json!({"children": []}));
        let read: Option<serde_json::Value> = open().get_json(StorageTier::Local, "standings_2024_2");

        assert_eq!(read, Some(json!({"children": []})));
    }

    #[test]
    fn test_clear_namespace_counts_only_persisted_removals() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("cache");
        let storage = StorageManager::with_stores(
            "ns",
            Arc::new(FileStore::in_dir(&dir)),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        storage.put_json(StorageTier::Local, "a", &1);
        storage.put_json(StorageTier::Local, "b", &2);

        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "a regular file").unwrap();

        assert_eq!(storage.clear_namespace(StorageTier::Local), 0);
        assert_eq!(storage.get_json::<i32>(StorageTier::Local, "a"), Some(1));
        assert_eq!(storage.get_json::<i32>(StorageTier::Local, "b"), Some(2));
    }
}
