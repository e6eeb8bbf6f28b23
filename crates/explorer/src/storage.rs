//! Persistent key-value slots.
//!
//! Each slot is one JSON file under the store directory and always holds a
//! whole value; writes replace the previous content.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed slot store
#[derive(Debug, Clone)]
pub struct SlotStore {
    /// Directory holding one file per slot
    dir: PathBuf,
}

impl SlotStore {
    /// Open the store, creating its directory if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory: {}", dir.display()))?;
        debug!(dir = %dir.display(), "Slot store opened");

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a slot; `Ok(None)` when it has never been written
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.slot_path(key);
        if !path.exists() {
            debug!(key = key, "Slot empty");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read slot file: {}", path.display()))?;

        let data: T = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse slot file: {}", path.display()))?;

        debug!(key = key, "Slot read");
        Ok(Some(data))
    }

    /// Replace the content of a slot
    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let path = self.slot_path(key);

        let content = serde_json::to_string_pretty(data)
            .context("Failed to serialize slot data")?;

        // Readers never observe a partially written slot
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write slot file: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace slot file: {}", path.display()))?;

        debug!(key = key, path = %path.display(), "Slot written");
        Ok(())
    }

    /// Delete a slot; removing an empty slot is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove slot file: {}", path.display()))?;
        }
        Ok(())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.slot_path(key).exists()
    }

    /// Get the file path for a given key
    pub fn slot_path(&self, key: &str) -> PathBuf {
        let safe_key = key
            .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
            .replace("__", "_");

        self.dir.join(format!("{}.json", safe_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: u32,
        name: String,
    }

    #[test]
    fn test_set_and_get() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = SlotStore::new(temp_dir.path())?;

        let data = vec![TestData {
            id: 1,
            name: "test".to_string(),
        }];

        store.set("anime-wishlist", &data)?;

        let retrieved: Option<Vec<TestData>> = store.get("anime-wishlist")?;
        assert_eq!(retrieved, Some(data));
        assert!(!store.slot_path("anime-wishlist").with_extension("json.tmp").exists());

        Ok(())
    }

    #[test]
    fn test_missing_slot() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = SlotStore::new(temp_dir.path())?;

        let retrieved: Option<TestData> = store.get("nonexistent")?;
        assert_eq!(retrieved, None);

        Ok(())
    }

    #[test]
    fn test_corrupt_slot_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = SlotStore::new(temp_dir.path())?;

        std::fs::write(store.slot_path("broken"), "{not json")?;
        assert!(store.get::<TestData>("broken").is_err());

        Ok(())
    }

    #[test]
    fn test_exists_and_remove() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = SlotStore::new(temp_dir.path().join("nested"))?;

        let data = TestData {
            id: 1,
            name: "test".to_string(),
        };

        assert!(!store.exists("key"));
        store.set("key", &data)?;
        assert!(store.exists("key"));

        store.remove("key")?;
        assert!(!store.exists("key"));
        store.remove("key")?;

        Ok(())
    }

    #[test]
    fn test_key_sanitizing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = SlotStore::new(temp_dir.path())?;

        let path = store.slot_path("../anime:wishlist");
        assert_eq!(path.parent(), Some(temp_dir.path()));

        Ok(())
    }
}
