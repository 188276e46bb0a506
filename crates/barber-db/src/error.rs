//! # Database Error Types
//!
//! Error types for the buffer medium.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncError::StorageFailure (barber-sync) ← Fatal to the operation      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored record could not be decoded or encoded.
    ///
    /// ## When This Occurs
    /// - Payload was truncated or edited by hand
    /// - A field has an unexpected type
    #[error("Record '{name}' is corrupt: {reason}")]
    Corrupt { name: String, reason: String },

    /// A stored record was written with a layout this build does not know.
    ///
    /// ## When This Occurs
    /// - The record was written by a newer release, then the app was downgraded
    #[error("Record '{name}' has schema version {found}, supported up to {supported}")]
    UnsupportedSchema {
        name: String,
        found: i64,
        supported: i64,
    },

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a Corrupt error for a named record.
    pub fn corrupt(name: impl Into<String>, reason: impl ToString) -> Self {
        DbError::Corrupt {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Serialization failures outside a named record's decode path.
impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Internal(format!("Serialization failed: {err}"))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DbError::UnsupportedSchema {
            name: "offline_visits".into(),
            found: 7,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "Record 'offline_visits' has schema version 7, supported up to 1"
        );

        let err = DbError::corrupt("offline_visits", "expected value at line 1");
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_pool_closed_maps_to_connection_failed() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }

    #[test]
    fn test_serde_error_maps_to_internal() {
        let err: DbError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert!(matches!(err, DbError::Internal(msg) if msg.starts_with("Serialization failed")));
    }
}
