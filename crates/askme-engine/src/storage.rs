//! Key-value storage backing the persisted conversation slot.
//!
//! The conversation store only needs `get` and `set` on string keys. Two
//! implementations are provided:
//! - [`FileStorage`]: one `<key>.json` file per key inside a directory,
//!   written atomically.
//! - [`MemoryStorage`]: an in-process map, used by tests and ephemeral runs.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A durable string-to-string map.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with a single entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed storage: each key lives in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new `FileStorage`.
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Directory holding the entries.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file backing `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }

    /// Validate a key for filesystem safety.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
        }

        if key.contains("..") {
            return Err(StorageError::InvalidKey(
                "key cannot contain path traversal".to_string(),
            ));
        }

        for ch in key.chars() {
            if !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_' {
                return Err(StorageError::InvalidKey(format!(
                    "key contains invalid character: {ch}"
                )));
            }
        }

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::validate_key(key)?;

        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::validate_key(key)?;
        atomic_write(&self.entry_path(key), value.as_bytes())?;
        Ok(())
    }
}

/// Write content atomically using temp file + fsync + rename.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Unique temp name from timestamp and process ID
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let pid = std::process::id();

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("entry");
    let tmp_path = path.with_file_name(format!("{file_name}.{timestamp}.{pid}.tmp"));

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_file_storage() -> (TempDir, FileStorage) {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("storage")).unwrap();
        (temp, storage)
    }

    #[test]
    fn test_memory_get_missing() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("history").unwrap(), None);
    }

    #[test]
    fn test_memory_set_then_get() {
        let storage = MemoryStorage::new();
        storage.set("history", "[]").unwrap();
        assert_eq!(storage.get("history").unwrap().as_deref(), Some("[]"));

        storage.set("history", "[1]").unwrap();
        assert_eq!(storage.get("history").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_memory_with_entry() {
        let storage = MemoryStorage::with_entry("history", "garbage");
        assert_eq!(storage.get("history").unwrap().as_deref(), Some("garbage"));
    }

    #[test]
    fn test_arc_storage_shares_entries() {
        let shared = Arc::new(MemoryStorage::new());
        let handle = Arc::clone(&shared);
        handle.set("k", "v").unwrap();
        assert_eq!(shared.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_storage_creates_dir() {
        let (temp, _storage) = setup_file_storage();
        assert!(temp.path().join("storage").is_dir());
    }

    #[test]
    fn test_file_get_missing() {
        let (_temp, storage) = setup_file_storage();
        assert_eq!(storage.get("history").unwrap(), None);
    }

    #[test]
    fn test_file_set_then_get() {
        let (temp, storage) = setup_file_storage();
        storage.set("history", r#"[{"prompt":"a","response":"b"}]"#).unwrap();

        let raw = fs::read_to_string(temp.path().join("storage").join("history.json")).unwrap();
        assert_eq!(raw, r#"[{"prompt":"a","response":"b"}]"#);
        assert_eq!(storage.get("history").unwrap().as_deref(), Some(raw.as_str()));
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let (temp, storage) = setup_file_storage();
        storage.set("history", "[]").unwrap();
        drop(storage);

        let reopened = FileStorage::new(temp.path().join("storage")).unwrap();
        assert_eq!(reopened.get("history").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_validate_key_rejects_unsafe_keys() {
        let (_temp, storage) = setup_file_storage();
        assert!(matches!(storage.get(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.get("../etc"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.set("a/b", "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.set("a b", "x"), Err(StorageError::InvalidKey(_))));
        assert!(storage.set("chat-history_2", "x").is_ok());
    }

    #[test]
    fn test_atomic_write_no_temp_files_on_success() {
        let (temp, storage) = setup_file_storage();
        storage.set("history", "[]").unwrap();

        for entry in fs::read_dir(temp.path().join("storage")).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "Found temp file: {name}");
        }
    }
}
