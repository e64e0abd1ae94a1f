//! Single-document JSON cache file.
//!
//! The whole document is held in memory and rewritten, pretty-printed, on
//! every new key. Writes go to a sibling temp file which is then renamed over
//! the cache, so a crash mid-write never leaves a truncated document.

use super::{CacheError, CacheStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug)]
pub struct JsonFileCacheStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl JsonFileCacheStore {
    /// Open the cache at `path`, loading it if it exists.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or is not a JSON object.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Opened JSON cache at {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    async fn persist(&self, entries: &BTreeMap<String, serde_json::Value>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");

        let mut file = tokio::fs::File::create(&tmp).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, &body).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for JsonFileCacheStore {
    async fn lookup(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &serde_json::Value) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(key) {
            return Ok(());
        }

        entries.insert(key.to_string(), value.clone());
        if let Err(e) = self.persist(&entries).await {
            // keep memory consistent with disk
            entries.remove(key);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileCacheStore::open(dir.path().join("cache.json"))
            .await
            .unwrap();
        assert_eq!(store.len().await, 0);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let store = JsonFileCacheStore::open(&path).await.unwrap();
        store
            .store("https://blockchain.info/rawtx/T1", &json!({"hash": "T1"}))
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileCacheStore::open(&path).await.unwrap();
        assert_eq!(
            reopened
                .lookup("https://blockchain.info/rawtx/T1")
                .await
                .unwrap(),
            Some(json!({"hash": "T1"}))
        );
    }

    #[tokio::test]
    async fn test_file_is_pretty_printed_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let store = JsonFileCacheStore::open(&path).await.unwrap();
        store.store("b", &json!(2)).await.unwrap();
        store.store("a", &json!(1)).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc, json!({"a": 1, "b": 2}));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_existing_key_is_immutable() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileCacheStore::open(dir.path().join("cache.json"))
            .await
            .unwrap();
        store.store("k", &json!("first")).await.unwrap();
        store.store("k", &json!("second")).await.unwrap();
        assert_eq!(store.lookup("k").await.unwrap(), Some(json!("first")));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            JsonFileCacheStore::open(&path).await,
            Err(CacheError::Serde(_))
        ));
    }
}
