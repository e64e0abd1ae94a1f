//! In-process cache store without durability, for tests and dry runs.

use super::{CacheError, CacheStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn lookup(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &serde_json::Value) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries
            .entry(key.to_string())
            .or_insert_with(|| value.clone());
        Ok(())
    }
}
