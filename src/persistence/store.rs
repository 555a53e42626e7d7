use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{PersistenceError, PersistenceResult};

/// Browser-like storage quota
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Synchronous string key-value storage with a size quota
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;

    /// Fails with [`PersistenceError::StorageQuota`] when the write would
    /// exceed the quota; the previous value is kept in that case.
    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()>;

    /// Removing a missing key is not an error
    fn remove(&mut self, key: &str) -> PersistenceResult<()>;

    /// Every stored key, in no particular order
    fn list_keys(&self) -> PersistenceResult<Vec<String>>;

    fn contains(&self, key: &str) -> PersistenceResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> PersistenceResult<()> {
        (**self).remove(key)
    }

    fn list_keys(&self) -> PersistenceResult<Vec<String>> {
        (**self).list_keys()
    }
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

fn check_quota(key: &str, used_without_key: usize, value: &str, quota: usize) -> PersistenceResult<()> {
    let required = entry_size(key, value);
    let available = quota.saturating_sub(used_without_key);
    if required > available {
        log::warn!("Storage quota exceeded for '{}': {} > {}", key, required, available);
        return Err(PersistenceError::StorageQuota {
            key: key.to_owned(),
            required,
            available,
        });
    }
    Ok(())
}

/// In-memory store, used by tests and as a fallback when no directory is writable
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota_bytes: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| entry_size(k, v)).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        let existing = self.entries.get(key).map_or(0, |old| entry_size(key, old));
        check_quota(key, self.used_bytes() - existing, value, self.quota_bytes)?;
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PersistenceResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn list_keys(&self) -> PersistenceResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Directory-backed store: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    quota_bytes: usize,
}

impl FileStore {
    /// Create the store, creating `root` if it doesn't exist
    pub fn open(root: impl Into<PathBuf>, quota_bytes: usize) -> PersistenceResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::info!("Drawing storage at {}", root.display());
        Ok(Self { root, quota_bytes })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", file_name))
    }

    /// Bytes currently used by every stored file except `exclude`
    fn used_bytes_excluding(&self, exclude: &Path) -> PersistenceResult<usize> {
        let mut used = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path == exclude || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let key_len = path.file_stem().map_or(0, |stem| stem.len());
            used += key_len + entry.metadata()?.len() as usize;
        }
        Ok(used)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        let path = self.path_for(key);
        check_quota(key, self.used_bytes_excluding(&path)?, value, self.quota_bytes)?;

        // Write next to the target and rename so a crash never leaves a torn file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PersistenceResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Keys are recovered from file names, so only keys that survive
    /// file-name sanitizing unchanged round-trip
    fn list_keys(&self) -> PersistenceResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_owned());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(!store.contains("a").unwrap());
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "12345").unwrap();
        let err = store.set("other", "123456").unwrap_err();
        assert!(matches!(err, PersistenceError::StorageQuota { .. }));
        assert_eq!(store.get("other").unwrap(), None);

        // Overwriting an existing key only counts the new value
        store.set("k", "123456789").unwrap();
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("drawings"), DEFAULT_QUOTA_BYTES).unwrap();

        store.set("manga-drawings", "[]").unwrap();
        assert_eq!(store.get("manga-drawings").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("drawings/manga-drawings.json").exists());

        store.set("drawing-1", "{}").unwrap();
        let mut keys = store.list_keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["drawing-1", "manga-drawings"]);

        store.remove("manga-drawings").unwrap();
        assert_eq!(store.get("manga-drawings").unwrap(), None);
        assert_eq!(store.list_keys().unwrap(), vec!["drawing-1"]);
        store.remove("manga-drawings").unwrap();
    }

    #[test]
    fn test_file_store_quota() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path(), 16).unwrap();
        store.set("a", "0123456789").unwrap();
        assert!(matches!(
            store.set("b", "0123456789"),
            Err(PersistenceError::StorageQuota { .. })
        ));
        assert_eq!(store.get("b").unwrap(), None);
    }
}
