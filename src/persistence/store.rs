use super::files::{atomic_write, read_file};
#[cfg(test)]
use std::cell::{Cell, RefCell};
#[cfg(test)]
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Storage key for the active task list
pub const TASKS_KEY: &str = "focusfriend.tasks";
/// Storage key for the completed task history
pub const COMPLETED_TASKS_KEY: &str = "focusfriend.completedTasks";
/// Storage key for user settings
pub const SETTINGS_KEY: &str = "focusfriend.settings";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Keyed blob storage for persisted snapshots
pub trait KeyValueStore {
    /// Load the blob for `key`, `None` if nothing was stored yet
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob for `key`
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Serialize `value` as pretty JSON and save it under `key`
pub fn save_json<T: serde::Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.save(key, &json)
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        read_file(self.path_for(key)).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.dir.is_dir() {
            return Err(StorageError::Unavailable(format!(
                "data directory {} is missing",
                self.dir.display()
            )));
        }
        atomic_write(self.path_for(key), value).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })
    }
}

/// In-memory storage, used by tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.blobs.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.get() {
            return Err(StorageError::Unavailable(format!("write to {} rejected", key)));
        }
        self.insert(key, value);
        Ok(())
    }
}

/// Shared handles store into the same backend
impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(store.load(TASKS_KEY).unwrap().is_none());

        store.save(TASKS_KEY, "[]").unwrap();
        assert_eq!(store.load(TASKS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(temp_dir.path().join("focusfriend.tasks.json").exists());
    }

    #[test]
    fn test_file_store_missing_dir_fails() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path().join("does-not-exist"));

        let err = store.save(SETTINGS_KEY, "{}").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert!(err.to_string().contains("does-not-exist"));
    }

    #[test]
    fn test_memory_store_failing_mode() {
        let store = MemoryStore::new();
        store.save(TASKS_KEY, "[1]").unwrap();

        store.set_failing(true);
        assert!(store.save(TASKS_KEY, "[2]").is_err());
        // Previous value survives the rejected write
        assert_eq!(store.get(TASKS_KEY).as_deref(), Some("[1]"));
    }

    #[test]
    fn test_save_json() {
        let store = MemoryStore::new();
        save_json(&store, COMPLETED_TASKS_KEY, &vec![1, 2, 3]).unwrap();

        let stored: Vec<i32> = serde_json::from_str(&store.get(COMPLETED_TASKS_KEY).unwrap()).unwrap();
        assert_eq!(stored, vec![1, 2, 3]);
    }
}
