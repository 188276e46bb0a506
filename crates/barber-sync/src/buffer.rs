//! # Offline Visit Buffer
//!
//! Durable local queue of visits pending submission, and the synchronization
//! pass that drains it against a [`RemoteVisitStore`].
//!
//! ## Synchronization Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load_visits()  ──►  [ v0, v1, v2 ]                                     │
//! │                                                                         │
//! │  for each position, in insertion order, one at a time:                 │
//! │    1. create_visit(now, total, phone)          ──► visit id            │
//! │       (skipped when the parent row committed on an earlier attempt)    │
//! │    2. create_visit_service_lines(lines)        ──► ack                 │
//! │       (skipped when the visit has no services)                         │
//! │    both ok  → succeeded += position                                    │
//! │    any err  → failed[position] = ItemFailure, keep going               │
//! │                                                                         │
//! │  v0 ✓   v1 ✗   v2 ✓                                                     │
//! │                                                                         │
//! │  remove succeeded positions highest first:  remove(2), remove(0)        │
//! │  store_visits([ v1 ])   ← ONE write, skipped if nothing changed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! - Delivery errors are data: they land in [`SyncReport::failed`]
//! - Storage errors are fatal: the pass returns `SyncError::StorageFailure`
//!   and the persisted buffer is exactly what it was before the pass
//!
//! ## Concurrency
//! The buffer holds no lock. Callers must not run `synchronize` concurrently
//! with another `synchronize`, `append` or `remove_at` on the same record:
//! the last write wins.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use barber_core::{BufferedVisit, PriceLookup, VisitDraft};
use barber_db::{Database, VisitBufferStore};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::remote::{DeliveryError, RemoteVisitStore};

// =============================================================================
// Sync Report
// =============================================================================

/// Which of the two remote calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    /// The parent visit row was not created.
    Visit,
    /// The parent row exists but its line items were not created.
    ServiceLines,
}

impl fmt::Display for FailedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedStage::Visit => write!(f, "visit"),
            FailedStage::ServiceLines => write!(f, "service_lines"),
        }
    }
}

/// Why a buffered visit stayed in the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub local_id: String,
    pub stage: FailedStage,
    pub reason: DeliveryError,
}

/// Outcome of one synchronization pass.
///
/// Positions refer to the buffer as it was read at the start of the pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Positions committed remotely and removed from the buffer.
    pub succeeded: BTreeSet<usize>,
    /// Positions left in the buffer, with the reason.
    pub failed: BTreeMap<usize, ItemFailure>,
}

impl SyncReport {
    /// Returns true if the pass had nothing to do.
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }

    /// Number of visits the pass tried to deliver.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Returns true if every attempted visit was delivered.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// =============================================================================
// Buffer
// =============================================================================

/// Durable queue of visits pending submission.
///
/// Every operation reads the persisted sequence; every mutation rewrites it.
/// There is no in-memory copy to go stale.
#[derive(Clone)]
pub struct OfflineVisitBuffer {
    store: Arc<dyn VisitBufferStore>,
}

impl fmt::Debug for OfflineVisitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineVisitBuffer").finish_non_exhaustive()
    }
}

impl OfflineVisitBuffer {
    /// Creates a buffer over an injected store.
    pub fn new(store: Arc<dyn VisitBufferStore>) -> Self {
        OfflineVisitBuffer { store }
    }

    /// Creates a buffer over the named record of a database.
    pub fn from_database(db: &Database, record_name: impl Into<String>) -> Self {
        Self::new(Arc::new(db.offline_visits(record_name)))
    }

    /// Buffers a visit with a fresh local id and `created_at = now`.
    ///
    /// No deduplication: appending the same draft twice yields two entries.
    pub async fn append(&self, draft: VisitDraft) -> SyncResult<BufferedVisit> {
        let visit = BufferedVisit::from_draft(draft, Utc::now());
        self.push(visit.clone()).await?;
        Ok(visit)
    }

    /// Appends an already-built entry (keeps its id and committed parent).
    pub(crate) async fn push(&self, visit: BufferedVisit) -> SyncResult<()> {
        let mut visits = self.store.load_visits().await?;

        debug!(
            local_id = %visit.local_id,
            position = visits.len(),
            total = %visit.total(),
            "Buffering visit"
        );

        visits.push(visit);
        self.store.store_visits(&visits).await?;
        Ok(())
    }

    /// Returns the buffered visits in insertion order.
    ///
    /// The returned vector is a copy; changing it does not touch the buffer.
    pub async fn list(&self) -> SyncResult<Vec<BufferedVisit>> {
        Ok(self.store.load_visits().await?)
    }

    /// Number of buffered visits.
    pub async fn len(&self) -> SyncResult<usize> {
        Ok(self.store.load_visits().await?.len())
    }

    /// Returns true if nothing is buffered.
    pub async fn is_empty(&self) -> SyncResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Deletes the entry at `index` and returns it.
    ///
    /// ## Errors
    /// - `IndexOutOfRange` if `index` is not a valid position right now
    pub async fn remove_at(&self, index: usize) -> SyncResult<BufferedVisit> {
        let mut visits = self.store.load_visits().await?;

        if index >= visits.len() {
            return Err(SyncError::IndexOutOfRange {
                index,
                len: visits.len(),
            });
        }

        let removed = visits.remove(index);
        self.store.store_visits(&visits).await?;

        info!(local_id = %removed.local_id, index, "Removed buffered visit");
        Ok(removed)
    }

    /// Deletes the entry with `local_id` and returns it.
    ///
    /// Unlike positions, local ids stay valid across other removals.
    pub async fn remove(&self, local_id: &str) -> SyncResult<BufferedVisit> {
        let mut visits = self.store.load_visits().await?;

        let index = position_of(&visits, local_id)?;
        let removed = visits.remove(index);
        self.store.store_visits(&visits).await?;

        info!(local_id = %removed.local_id, index, "Removed buffered visit");
        Ok(removed)
    }

    /// Submits one buffered visit now and removes it on success.
    ///
    /// Returns the backend visit id. On a line-item failure the committed
    /// parent id is recorded on the entry before the error is returned.
    pub async fn confirm(
        &self,
        local_id: &str,
        remote: &dyn RemoteVisitStore,
        prices: &dyn PriceLookup,
    ) -> SyncResult<String> {
        let mut visits = self.store.load_visits().await?;
        let index = position_of(&visits, local_id)?;

        let parent_before = visits[index].remote_visit_id.clone();
        match deliver(&mut visits[index], remote, prices).await {
            Ok(visit_id) => {
                visits.remove(index);
                self.store.store_visits(&visits).await?;
                info!(local_id, %visit_id, "Confirmed buffered visit");
                Ok(visit_id)
            }
            Err(failure) => {
                if visits[index].remote_visit_id != parent_before {
                    self.store.store_visits(&visits).await?;
                }
                warn!(
                    local_id,
                    stage = %failure.stage,
                    error = %failure.reason,
                    "Failed to confirm buffered visit"
                );
                Err(SyncError::Delivery(failure.reason))
            }
        }
    }

    /// Drains the buffer against `remote`, pricing line items via `prices`.
    ///
    /// Item failures are reported, never raised. See the module docs for the
    /// full contract.
    pub async fn synchronize(
        &self,
        remote: &dyn RemoteVisitStore,
        prices: &dyn PriceLookup,
    ) -> SyncResult<SyncReport> {
        let mut visits = self.store.load_visits().await?;
        let mut report = SyncReport::default();

        if visits.is_empty() {
            debug!("Buffer empty, nothing to synchronize");
            return Ok(report);
        }

        info!(pending = visits.len(), "Starting synchronization pass");

        let mut parents_committed = 0usize;
        for (index, visit) in visits.iter_mut().enumerate() {
            let had_parent = visit.remote_visit_id.is_some();

            match deliver(visit, remote, prices).await {
                Ok(visit_id) => {
                    debug!(index, local_id = %visit.local_id, %visit_id, "Visit delivered");
                    report.succeeded.insert(index);
                }
                Err(failure) => {
                    if !had_parent && visit.remote_visit_id.is_some() {
                        parents_committed += 1;
                    }
                    warn!(
                        index,
                        local_id = %failure.local_id,
                        stage = %failure.stage,
                        error = %failure.reason,
                        "Visit delivery failed, keeping it buffered"
                    );
                    report.failed.insert(index, failure);
                }
            }
        }

        // Highest first so earlier removals don't shift later positions
        for &index in report.succeeded.iter().rev() {
            visits.remove(index);
        }

        if !report.succeeded.is_empty() || parents_committed > 0 {
            self.store.store_visits(&visits).await.map_err(|e| {
                error!(
                    error = %e,
                    delivered = report.succeeded.len(),
                    "Failed to persist buffer after synchronization"
                );
                SyncError::StorageFailure(e)
            })?;
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            remaining = visits.len(),
            "Synchronization pass complete"
        );

        Ok(report)
    }
}

fn position_of(visits: &[BufferedVisit], local_id: &str) -> SyncResult<usize> {
    visits
        .iter()
        .position(|v| v.local_id == local_id)
        .ok_or_else(|| SyncError::UnknownVisit(local_id.to_string()))
}

/// Delivers one visit: parent row, then line items.
///
/// When the parent row commits but the lines fail, the parent id is written
/// onto `visit` so a later attempt does not create a second parent.
pub(crate) async fn deliver(
    visit: &mut BufferedVisit,
    remote: &dyn RemoteVisitStore,
    prices: &dyn PriceLookup,
) -> Result<String, ItemFailure> {
    let failure = |stage, reason| ItemFailure {
        local_id: visit.local_id.clone(),
        stage,
        reason,
    };

    let visit_id = match &visit.remote_visit_id {
        Some(existing) => {
            debug!(local_id = %visit.local_id, visit_id = %existing, "Parent row already committed");
            existing.clone()
        }
        None => {
            let request = visit.new_visit_request(Utc::now());
            remote
                .create_visit(&request)
                .await
                .map_err(|reason| failure(FailedStage::Visit, reason))?
        }
    };

    let lines = visit.service_lines(&visit_id, prices);
    if !lines.is_empty() {
        if let Err(reason) = remote.create_visit_service_lines(&lines).await {
            let failed = failure(FailedStage::ServiceLines, reason);
            visit.remote_visit_id = Some(visit_id);
            return Err(failed);
        }
    }

    Ok(visit_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
