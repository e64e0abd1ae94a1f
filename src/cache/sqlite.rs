//! SQLite-backed cache store with incremental, per-key persistence.

use super::{CacheError, CacheStore};
use crate::db::init_db;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

#[derive(Debug, Clone)]
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the cache database at `db_path`.
    pub async fn open(db_path: &str) -> Result<Self, CacheError> {
        Ok(Self::new(init_db(db_path).await?))
    }

    pub async fn len(&self) -> Result<i64, CacheError> {
        let row = sqlx::query("SELECT COUNT(*) FROM response_cache")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn lookup(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        let row = sqlx::query("SELECT body FROM response_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, key: &str, value: &serde_json::Value) -> Result<(), CacheError> {
        let body = serde_json::to_string(value)?;

        sqlx::query(
            r#"
            INSERT INTO response_cache (key, body, fetched_at_ms)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(body)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
