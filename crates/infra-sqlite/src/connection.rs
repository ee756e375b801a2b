// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use waitlist_core::error::{AppError, Result};

const MAX_CONNECTIONS: u32 = 10;

// An in-memory database lives as long as its connection, and shared-cache
// readers fail with SQLITE_LOCKED instead of waiting. One pinned connection.
const MAX_MEMORY_CONNECTIONS: u32 = 1;

/// Create SQLite connection pool with WAL mode and foreign keys enabled
///
/// Accepts `sqlite::memory:`, `sqlite://path` or a bare file path. Parent
/// directories of a file database are created if missing.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("Invalid database URL {}: {}", database_url, e)))?
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true)
        .create_if_missing(true);

    if !in_memory {
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !Path::new(parent).exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(MAX_MEMORY_CONNECTIONS)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;

    tracing::debug!(database_url = %database_url, in_memory, "SQLite pool created");

    Ok(pool)
}
