//! # barber-db: Durable Buffer Storage
//!
//! This crate provides the local durable medium for the offline visit buffer.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Buffer Data Flow                                 │
//! │                                                                         │
//! │  OfflineVisitBuffer (barber-sync)                                      │
//! │       │  load_visits() / store_visits(&visits)                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    barber-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │ OfflineVisitRepo   │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ (VisitBufferStore) │  │ (embedded) │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  named_records table: one row, versioned JSON payload                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening the buffer database (file or in-memory)
//! - [`migrations`] - Embedded schema and its status
//! - [`error`] - Database error types
//! - [`repository`] - Buffer store trait and its SQLite implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use barber_db::{Database, DbConfig, VisitBufferStore};
//!
//! let db = Database::open(DbConfig::file("path/to/barber.db")).await?;
//! let store = db.offline_visits("offline_visits");
//! let pending = store.load_visits().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::SchemaStatus;
pub use pool::{BufferLocation, Database, DbConfig, DEFAULT_MAX_CONNECTIONS};
pub use repository::offline_visit::{
    OfflineVisitRepository, VisitBufferStore, BUFFER_SCHEMA_VERSION, DEFAULT_RECORD_NAME,
};
