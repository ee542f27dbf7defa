// SQLite Connection Pool Setup

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use jobkeeper_core::error::AppError;

/// Create a SQLite connection pool with WAL mode and busy-timeout tuned for
/// a single-writer, many-reader job store.
///
/// # Configuration
/// - `JOBKEEPER_POOL_SIZE`: max connections (default: 20)
/// - `JOBKEEPER_POOL_TIMEOUT_SECS`: busy timeout in seconds (default: 5)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, AppError> {
    let max_connections: u32 = std::env::var("JOBKEEPER_POOL_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);

    let busy_timeout_secs: u64 = std::env::var("JOBKEEPER_POOL_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Database(e.to_string()))?
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(busy_timeout_secs))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(pool)
}
