//! # Buffer Database
//!
//! Opens the SQLite file that holds the offline visit buffer.
//!
//! ## Where The Buffer Lives
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BufferLocation::File(path)                                             │
//! │    - parent directories are created on open                             │
//! │    - WAL journal, NORMAL synchronous                                    │
//! │    - small pool: the UI lists while a sync pass rewrites the record     │
//! │                                                                         │
//! │  BufferLocation::Memory                                                 │
//! │    - one connection that never idles out (the data lives in it)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, SchemaStatus};
use crate::repository::offline_visit::OfflineVisitRepository;

/// Default pool size for a file-backed buffer.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 2;

// =============================================================================
// Configuration
// =============================================================================

/// Where the buffer database is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferLocation {
    File(PathBuf),
    Memory,
}

/// How to open the buffer database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: BufferLocation,
    pub max_connections: u32,
}

impl DbConfig {
    /// A buffer stored in `path`. The file is created if it doesn't exist.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: BufferLocation::File(path.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// A private in-memory buffer (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            location: BufferLocation::Memory,
            max_connections: 1,
        }
    }

    /// Sets the pool size. Ignored for in-memory buffers.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the buffer database.
///
/// Cloning is cheap: the handle only wraps the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the buffer database and brings its schema up to date.
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        let pool = match &config.location {
            BufferLocation::File(path) => open_file(path, config.max_connections).await?,
            BufferLocation::Memory => open_memory().await?,
        };

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// Returns the offline visit repository bound to `record_name`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let pending = db.offline_visits("offline_visits").load_visits().await?;
    /// ```
    pub fn offline_visits(&self, record_name: impl Into<String>) -> OfflineVisitRepository {
        OfflineVisitRepository::new(self.pool.clone(), record_name)
    }

    /// Reports how many of the embedded migrations this file has applied.
    pub async fn schema_status(&self) -> DbResult<SchemaStatus> {
        migrations::schema_status(&self.pool).await
    }

    /// Closes the pool. Later buffer operations fail with a storage error.
    pub async fn close(&self) {
        info!("Closing buffer database");
        self.pool.close().await;
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn open_file(path: &Path, max_connections: u32) -> DbResult<SqlitePool> {
    info!(path = %path.display(), "Opening buffer database");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            DbError::ConnectionFailed(format!("Cannot create {}: {e}", parent.display()))
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        // May lose the last write on power loss, never a torn record
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

    debug!(max_connections, "Buffer pool ready");
    Ok(pool)
}

async fn open_memory() -> DbResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
