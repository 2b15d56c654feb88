use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::MIGRATION_001_KV_STORE;

/// Local key-value persistence backed by a single SQLite table.
///
/// Every value is replaced as a whole by one statement, so a reader sees
/// either the previous value or the new one, never a partial write.
///
/// Not `Clone`: a ledger store takes its repository by value, so one
/// repository backs at most one writer.
///
/// ```compile_fail
/// fn assert_clone<T: Clone>() {}
/// assert_clone::<spendlog::storage::Repository>();
/// ```
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect_with(options)
            .await
            .with_context(|| format!("Failed to open database '{}'", path))
    }

    /// Open a private in-memory database. Data is lost when the repository
    /// is dropped.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory database options")?;
        let repo = Self::connect_with(options)
            .await
            .context("Failed to open in-memory database")?;
        repo.migrate().await?;
        Ok(repo)
    }

    // One connection keeps every statement serialized and lets an in-memory
    // database live as long as the pool.
    async fn connect_with(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_KV_STORE)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(path: &str) -> Result<Self> {
        let repo = Self::connect(path).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Read the value stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read key '{}'", key))?;

        match row {
            Some(row) => Ok(Some(
                row.try_get("value")
                    .with_context(|| format!("Value of key '{}' is not text", key))?,
            )),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write key '{}'", key))?;

        tracing::debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    /// Store `value` under `key` only if the key is absent.
    /// Returns true if the value was written.
    pub async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO kv_store (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to initialize key '{}'", key))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() -> Result<()> {
        let repo = Repository::in_memory().await?;
        assert_eq!(repo.get("expenses").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_replaces_value() -> Result<()> {
        let repo = Repository::in_memory().await?;

        repo.put("expenses", "[]").await?;
        repo.put("expenses", "[1]").await?;

        assert_eq!(repo.get("expenses").await?.as_deref(), Some("[1]"));
        Ok(())
    }

    #[tokio::test]
    async fn test_put_if_absent_keeps_existing_value() -> Result<()> {
        let repo = Repository::in_memory().await?;

        assert!(repo.put_if_absent("expenses", "[]").await?);
        repo.put("expenses", "[1]").await?;
        assert!(!repo.put_if_absent("expenses", "[]").await?);

        assert_eq!(repo.get("expenses").await?.as_deref(), Some("[1]"));
        Ok(())
    }
}
