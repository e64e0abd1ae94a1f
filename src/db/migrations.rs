//! Database migrations and initialization.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Initialize the SQLite database with schema and pragmas.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Single connection: the cache is accessed from one task at a time.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    run_migrations(&pool).await?;

    info!("Cache database initialized at {}", db_path);
    Ok(pool)
}

/// Run all database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

/// Configure SQLite pragmas. Every committed insert must reach disk before
/// the insert returns, hence `synchronous = FULL`.
async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    // journal_mode returns the actual mode set; must use fetch to get result
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    info!("SQLite journal_mode set to: {}", journal_mode);

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = FULL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db_path(dir: &TempDir) -> String {
        dir.path().join("cache.db").to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_init_db_creates_cache_table() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_db_path(&temp_dir);

        let pool = init_db(&db_path).await.expect("init_db failed");
        assert!(Path::new(&db_path).exists());

        let result: (String,) = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='response_cache'",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");
        assert_eq!(result.0, "response_cache");
    }

    #[tokio::test]
    async fn test_init_db_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/deeper/cache.db");

        init_db(&db_path.to_string_lossy())
            .await
            .expect("init_db failed");
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_init_db_reports_unusable_parent() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let db_path = blocker.join("cache.db");

        let result = init_db(&db_path.to_string_lossy()).await;
        assert!(matches!(result, Err(sqlx::Error::Io(_))));
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_db_path(&temp_dir))
            .await
            .expect("init_db failed");

        run_migrations(&pool)
            .await
            .expect("second migration run failed");
    }

    #[tokio::test]
    async fn test_synchronous_full() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_db_path(&temp_dir))
            .await
            .expect("init_db failed");

        // FULL == 2
        let result: (i64,) = sqlx::query_as("PRAGMA synchronous")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 2);
    }
}
