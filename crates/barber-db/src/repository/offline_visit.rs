//! # Offline Visit Repository
//!
//! Durable storage for visits that could not be submitted yet.
//!
//! ## Record Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  named_records                                                          │
//! │  ┌────────────────┬────────────────┬──────────────────┬─────────────┐   │
//! │  │ name           │ schema_version │ payload          │ updated_at  │   │
//! │  ├────────────────┼────────────────┼──────────────────┼─────────────┤   │
//! │  │ offline_visits │ 1              │ {"version":1,    │ 2024-03-10T │   │
//! │  │                │                │  "visits":[...]} │ 12:00:00Z   │   │
//! │  └────────────────┴────────────────┴──────────────────┴─────────────┘   │
//! │                                                                         │
//! │  • The whole sequence lives in ONE row                                  │
//! │  • Every mutation rewrites the row in a single upsert                   │
//! │  • A missing row reads as an empty buffer                               │
//! │  • version 0 = bare JSON array (records imported from older clients)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store knows nothing about positions, delivery or pricing.
//! [`VisitBufferStore`] is the seam the buffer in barber-sync is written
//! against.

use async_trait::async_trait;
use barber_core::BufferedVisit;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Record name used when none is configured.
pub const DEFAULT_RECORD_NAME: &str = "offline_visits";

/// Payload layout written by this build.
pub const BUFFER_SCHEMA_VERSION: i64 = 1;

/// Layout of records written before the envelope existed.
const LEGACY_SCHEMA_VERSION: i64 = 0;

// =============================================================================
// Store Trait
// =============================================================================

/// Whole-sequence read/write access to the buffered visits.
#[async_trait]
pub trait VisitBufferStore: Send + Sync {
    /// Reads the persisted sequence. A missing record is an empty sequence.
    async fn load_visits(&self) -> DbResult<Vec<BufferedVisit>>;

    /// Replaces the persisted sequence with `visits`.
    async fn store_visits(&self, visits: &[BufferedVisit]) -> DbResult<()>;
}

// =============================================================================
// Envelope
// =============================================================================

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: i64,
    visits: &'a [BufferedVisit],
}

#[derive(Deserialize)]
struct Envelope {
    version: i64,
    visits: Vec<BufferedVisit>,
}

// =============================================================================
// SQLite Repository
// =============================================================================

/// Repository for the offline visit record.
#[derive(Debug, Clone)]
pub struct OfflineVisitRepository {
    pool: SqlitePool,
    record_name: String,
}

impl OfflineVisitRepository {
    /// Creates a repository bound to one named record.
    pub fn new(pool: SqlitePool, record_name: impl Into<String>) -> Self {
        OfflineVisitRepository {
            pool,
            record_name: record_name.into(),
        }
    }

    /// Name of the record this repository reads and writes.
    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    fn decode(&self, schema_version: i64, payload: &str) -> DbResult<Vec<BufferedVisit>> {
        match schema_version {
            LEGACY_SCHEMA_VERSION => {
                serde_json::from_str(payload).map_err(|e| DbError::corrupt(&self.record_name, e))
            }
            BUFFER_SCHEMA_VERSION => {
                let envelope: Envelope = serde_json::from_str(payload)
                    .map_err(|e| DbError::corrupt(&self.record_name, e))?;

                if envelope.version != schema_version {
                    return Err(DbError::corrupt(
                        &self.record_name,
                        format!(
                            "payload version {} does not match column version {}",
                            envelope.version, schema_version
                        ),
                    ));
                }

                Ok(envelope.visits)
            }
            found => Err(DbError::UnsupportedSchema {
                name: self.record_name.clone(),
                found,
                supported: BUFFER_SCHEMA_VERSION,
            }),
        }
    }
}

#[async_trait]
impl VisitBufferStore for OfflineVisitRepository {
    async fn load_visits(&self) -> DbResult<Vec<BufferedVisit>> {
        let row = sqlx::query(
            r#"
            SELECT schema_version, payload
            FROM named_records
            WHERE name = ?1
            "#,
        )
        .bind(&self.record_name)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(record = %self.record_name, "No buffer record yet");
            return Ok(Vec::new());
        };

        let schema_version: i64 = row.try_get("schema_version")?;
        let payload: String = row.try_get("payload")?;

        let visits = self.decode(schema_version, &payload).inspect_err(|e| {
            warn!(record = %self.record_name, error = %e, "Buffer record unreadable");
        })?;

        debug!(
            record = %self.record_name,
            schema_version,
            count = visits.len(),
            "Loaded buffered visits"
        );

        Ok(visits)
    }

    async fn store_visits(&self, visits: &[BufferedVisit]) -> DbResult<()> {
        let payload = serde_json::to_string(&EnvelopeRef {
            version: BUFFER_SCHEMA_VERSION,
            visits,
        })?;

        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO named_records (name, schema_version, payload, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name) DO UPDATE SET
                schema_version = excluded.schema_version,
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.record_name)
        .bind(BUFFER_SCHEMA_VERSION)
        .bind(&payload)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(
            record = %self.record_name,
            count = visits.len(),
            "Stored buffered visits"
        );

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
