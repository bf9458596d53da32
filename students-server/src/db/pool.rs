//! Database connection pool management
//!
//! Uses sqlx SqlitePool with explicit connection limits.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

/// Default maximum connections for the pool.
/// SQLite serializes writers anyway, so this mostly bounds concurrent readers.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a SQLite connection pool for the database file at `path`.
///
/// The file is created if missing. The parent directory must already exist.
///
/// # Errors
///
/// Returns an error if the first connection cannot be opened.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(Path::new("storage/storage.db")).await?;
/// ```
pub async fn create_pool(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    create_pool_with_options(path, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a SQLite connection pool with custom options.
///
/// # Arguments
///
/// * `path` - database file path
/// * `max_connections` - Maximum number of connections in the pool
pub async fn create_pool_with_options(
    path: &Path,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        // Concurrent writers wait on the lock instead of failing with SQLITE_BUSY
        .busy_timeout(BUSY_TIMEOUT)
        // FULL: a commit is on disk before the insert call returns
        .synchronous(SqliteSynchronous::Full);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}
