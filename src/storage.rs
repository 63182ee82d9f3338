//! Key/value storage areas for session tokens
//!
//! Two scopes are available: [`SessionStorage`] lives in memory for as long
//! as the value (and its clones) does, and [`LocalStorage`] persists to a JSON
//! file so it survives restarts.

use crate::error::{ClientError, Result};
use papaya::HashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A string key/value store
///
/// Implementations use interior mutability so one store can be shared
/// between the request gateway and the view controller.
pub trait StorageArea: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key
    fn clear(&self) -> Result<()>;
}

impl<S: StorageArea + ?Sized> StorageArea for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// In-memory storage scoped to the lifetime of the store
///
/// Clones share the same entries.
#[derive(Clone, Default)]
pub struct SessionStorage {
    entries: Arc<HashMap<String, String>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all keys currently stored
    pub fn keys(&self) -> Vec<String> {
        self.entries.pin().iter().map(|(k, _)| k.clone()).collect()
    }
}

impl StorageArea for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.pin().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.pin().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.pin().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.pin().clear();
        Ok(())
    }
}

/// File-backed storage that outlives the process
///
/// The file holds a single JSON object of string values. Every mutation is
/// written through before returning.
#[derive(Clone)]
pub struct LocalStorage {
    inner: Arc<LocalStorageInner>,
}

struct LocalStorageInner {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries: BTreeMap<String, String> = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                ClientError::Storage(format!("{} is not a storage file: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(ClientError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), "Opened local storage");

        Ok(Self {
            inner: Arc::new(LocalStorageInner {
                path,
                entries: Mutex::new(entries),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Apply `change` to a copy of the entries, write it to disk, and keep it
    /// only once the write succeeded
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut entries = self.inner.entries.lock();
        let mut updated = entries.clone();
        change(&mut updated);

        let path = &self.inner.path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        // Write to a sibling file first so a crash never leaves half a file
        let tmp = path.with_extension("tmp");
        let text = serde_json::to_string_pretty(&updated)?;
        std::fs::write(&tmp, text)
            .and_then(|()| std::fs::rename(&tmp, path))
            .map_err(|e| ClientError::Storage(format!("failed to write {}: {e}", path.display())))?;

        debug!(path = %path.display(), keys = updated.len(), "Persisted local storage");
        *entries = updated;
        Ok(())
    }
}

impl StorageArea for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.update(BTreeMap::clear)
    }
}

#[cfg(test)]
pub(crate) fn temp_storage_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("storefront-client-{}", uuid::Uuid::new_v4()))
        .join("storage.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_storage() {
        let storage = SessionStorage::new();

        assert_eq!(storage.get("access"), None);

        storage.set("access", "access_token_123").unwrap();
        storage.set("refresh", "refresh_token_456").unwrap();
        assert_eq!(storage.get("access").as_deref(), Some("access_token_123"));

        // Clones share entries
        let shared = storage.clone();
        shared.remove("access").unwrap();
        assert_eq!(storage.get("access"), None);
        assert_eq!(storage.keys(), vec!["refresh".to_string()]);

        storage.clear().unwrap();
        assert!(shared.keys().is_empty());
    }

    #[test]
    fn test_local_storage_survives_reopen() {
        let path = temp_storage_path();

        let storage = LocalStorage::open(&path).unwrap();
        assert_eq!(storage.get("token"), None);
        storage.set("token", "a.b.c").unwrap();
        storage.set("access", "T").unwrap();
        storage.remove("access").unwrap();

        let reopened = LocalStorage::open(&path).unwrap();
        assert_eq!(reopened.get("token").as_deref(), Some("a.b.c"));
        assert_eq!(reopened.get("access"), None);

        reopened.clear().unwrap();
        assert_eq!(LocalStorage::open(&path).unwrap().get("token"), None);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_local_storage_rejects_garbage() {
        let path = temp_storage_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(LocalStorage::open(&path), Err(ClientError::Storage(_))));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let path = temp_storage_path();
        let dir = path.parent().unwrap().to_path_buf();

        let storage = LocalStorage::open(&path).unwrap();
        storage.set("token", "old").unwrap();

        // A plain file where the directory was makes every write fail
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "in the way").unwrap();

        assert!(matches!(storage.set("token", "new"), Err(ClientError::Storage(_))));
        assert_eq!(storage.get("token").as_deref(), Some("old"));

        assert!(storage.remove("token").is_err());
        assert_eq!(storage.get("token").as_deref(), Some("old"));

        std::fs::remove_file(&dir).ok();
    }

    #[test]
    fn test_shared_through_arc() {
        let storage: Arc<dyn StorageArea> = Arc::new(SessionStorage::new());
        let other = Arc::clone(&storage);

        storage.set("refresh", "R").unwrap();
        assert_eq!(other.get("refresh").as_deref(), Some("R"));
    }
}
