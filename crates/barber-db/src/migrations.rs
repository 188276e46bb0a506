//! # Buffer Schema
//!
//! SQL migrations embedded from `migrations/sqlite/`, applied on every open.
//!
//! New tables or columns get a new `NNN_description.sql` file; applied files
//! are never edited. A change to the *payload* layout of a named record is
//! not a migration: bump `BUFFER_SCHEMA_VERSION` and teach the repository to
//! read the old one.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far a buffer file's schema has been migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaStatus {
    /// Migrations embedded in this build.
    pub known: usize,
    /// Migrations recorded as applied in the file.
    pub applied: usize,
}

impl SchemaStatus {
    /// True when the file has every migration this build knows.
    pub fn is_current(&self) -> bool {
        self.applied >= self.known
    }
}

pub(crate) async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    let status = schema_status(pool).await?;
    if status.applied > status.known {
        // Written by a newer build; the record payload version still guards reads
        warn!(
            applied = status.applied,
            known = status.known,
            "Buffer database has migrations this build does not know"
        );
    } else {
        debug!(applied = status.applied, "Buffer schema up to date");
    }

    Ok(())
}

pub(crate) async fn schema_status(pool: &SqlitePool) -> DbResult<SchemaStatus> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;

    Ok(SchemaStatus {
        known: MIGRATOR.iter().count(),
        applied: applied.max(0) as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_open_applies_every_migration() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();

        let status = db.schema_status().await.unwrap();
        assert!(status.known >= 1);
        assert!(status.is_current());

        // Applying again is a no-op
        run_migrations(db.pool()).await.unwrap();
        assert_eq!(db.schema_status().await.unwrap(), status);
    }

    #[tokio::test]
    async fn test_status_read_failure_is_an_error() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let err = db.schema_status().await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_migration_table_is_an_error() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DROP TABLE _sqlx_migrations")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.schema_status().await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
    }
}
