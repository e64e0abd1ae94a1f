//! Response cache: durable key/value memo of external lookups.
//!
//! Keys are fully-qualified request URLs, values the raw JSON documents the
//! upstream returned. Entries are never expired or overwritten once stored.

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileCacheStore;
pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache document error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Cache database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Persistence backend for cached responses.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Previously stored value for `key`, if any.
    async fn lookup(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    /// Persist `value` under `key`. Durable once this returns.
    ///
    /// Storing an existing key keeps the first value.
    async fn store(&self, key: &str, value: &serde_json::Value) -> Result<(), CacheError>;
}

/// Read-through cache in front of an external fetch.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    lock: Arc<Mutex<()>>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn lookup(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        self.store.lookup(key).await
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    ///
    /// A failed fetch is propagated and leaves the key absent. The whole
    /// lookup-fetch-store sequence runs under one lock.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, E>>,
        E: From<CacheError>,
    {
        let _guard = self.lock.lock().await;

        if let Some(value) = self.store.lookup(key).await? {
            debug!("Using cached response for {}", key);
            return Ok(value);
        }

        debug!("Cache miss, fetching {}", key);
        let value = fetch().await?;
        self.store.store(key, &value).await?;
        Ok(value)
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache").finish_non_exhaustive()
    }
}
