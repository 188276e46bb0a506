//! # Visit Recorder
//!
//! The front door for new visits: submit now when the backend is reachable,
//! buffer otherwise.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record(draft)                                                          │
//! │       │                                                                 │
//! │       ├── validate ✗ ─────────────────────► Err(Validation)            │
//! │       ▼                                                                 │
//! │  create_visit                                                           │
//! │       ├── retryable error ────────────────► Buffered (no parent id)    │
//! │       ├── rejected (4xx) ─────────────────► Err(Delivery)              │
//! │       ▼                                                                 │
//! │  create_visit_service_lines                                             │
//! │       ├── any error ──────────────────────► Buffered (with parent id)  │
//! │       ▼                                                                 │
//! │  Submitted { visit_id }                                                 │
//! │                                                                         │
//! │  defer(draft)   → validate, then straight into the buffer              │
//! │  flush()        → one synchronization pass with the session catalog    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use barber_core::{BufferedVisit, ServiceCatalog, VisitDraft};
use chrono::Utc;
use tracing::{info, warn};

use crate::buffer::{OfflineVisitBuffer, SyncReport};
use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteVisitStore;

/// What happened to a recorded visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The visit and its line items are on the backend.
    Submitted { visit_id: String },
    /// The visit is in the offline buffer.
    Buffered(BufferedVisit),
}

/// Records visits against the backend, falling back to the offline buffer.
pub struct VisitRecorder {
    buffer: OfflineVisitBuffer,
    remote: Arc<dyn RemoteVisitStore>,
    catalog: ServiceCatalog,
}

impl VisitRecorder {
    /// Creates a recorder with the catalog fetched for this session.
    pub fn new(
        buffer: OfflineVisitBuffer,
        remote: Arc<dyn RemoteVisitStore>,
        catalog: ServiceCatalog,
    ) -> Self {
        VisitRecorder {
            buffer,
            remote,
            catalog,
        }
    }

    /// The offline buffer behind this recorder.
    pub fn buffer(&self) -> &OfflineVisitBuffer {
        &self.buffer
    }

    /// The session's service catalog.
    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Replaces the session catalog (e.g. after a manual refresh).
    pub fn set_catalog(&mut self, catalog: ServiceCatalog) {
        self.catalog = catalog;
    }

    /// Builds a draft priced with the session catalog.
    pub fn draft(
        &self,
        barber: Option<String>,
        services: Vec<String>,
        phone: Option<&str>,
    ) -> VisitDraft {
        VisitDraft::priced(barber, services, phone, &self.catalog)
    }

    /// Submits a visit now, buffering it if the backend can't take it.
    pub async fn record(&self, draft: VisitDraft) -> SyncResult<RecordOutcome> {
        draft.validate()?;

        let mut visit = BufferedVisit::from_draft(draft, Utc::now());
        let request = visit.new_visit_request(Utc::now());

        let visit_id = match self.remote.create_visit(&request).await {
            Ok(visit_id) => visit_id,
            Err(err) if err.is_retryable() => {
                warn!(local_id = %visit.local_id, error = %err, "Backend unreachable, buffering visit");
                self.buffer.push(visit.clone()).await?;
                return Ok(RecordOutcome::Buffered(visit));
            }
            Err(err) => return Err(SyncError::Delivery(err)),
        };

        let lines = visit.service_lines(&visit_id, &self.catalog);
        if !lines.is_empty() {
            if let Err(err) = self.remote.create_visit_service_lines(&lines).await {
                warn!(
                    local_id = %visit.local_id,
                    %visit_id,
                    error = %err,
                    "Line items failed after visit row committed, buffering for retry"
                );
                visit.remote_visit_id = Some(visit_id);
                self.buffer.push(visit.clone()).await?;
                return Ok(RecordOutcome::Buffered(visit));
            }
        }

        info!(%visit_id, total = %visit.total(), "Visit recorded");
        Ok(RecordOutcome::Submitted { visit_id })
    }

    /// Queues a visit without trying to submit it.
    pub async fn defer(&self, draft: VisitDraft) -> SyncResult<BufferedVisit> {
        draft.validate()?;
        self.buffer.append(draft).await
    }

    /// Submits one queued visit now.
    pub async fn confirm(&self, local_id: &str) -> SyncResult<String> {
        self.buffer
            .confirm(local_id, self.remote.as_ref(), &self.catalog)
            .await
    }

    /// Runs one synchronization pass over the buffer.
    pub async fn flush(&self) -> SyncResult<SyncReport> {
        self.buffer
            .synchronize(self.remote.as_ref(), &self.catalog)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::tests::{flaky_buffer, FakeRemote};
    use barber_core::{Money, Service, ValidationError};
    use std::sync::atomic::Ordering;

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new(vec![
            Service::new("s1", "Haircut", Money::from_cents(2000)),
            Service::new("s2", "Beard trim", Money::from_cents(1500)),
        ])
    }

    async fn recorder(remote: Arc<FakeRemote>) -> VisitRecorder {
        let (buffer, _) = flaky_buffer().await;
        VisitRecorder::new(buffer, remote, catalog())
    }

    fn services(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_record_submits_when_online() {
        let remote = Arc::new(FakeRemote::default());
        let recorder = recorder(remote.clone()).await;

        let draft = recorder.draft(Some("b1".into()), services(&["s1", "s2"]), Some("555-1234"));
        assert_eq!(draft.total(), Money::from_cents(3500));

        let outcome = recorder.record(draft).await.unwrap();

        assert_eq!(outcome, RecordOutcome::Submitted { visit_id: "101".into() });
        assert_eq!(remote.lines.lock().unwrap().len(), 2);
        assert!(recorder.buffer().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_record_buffers_when_offline() {
        let remote = Arc::new(FakeRemote::failing_visit_call(0));
        let recorder = recorder(remote.clone()).await;

        let draft = recorder.draft(Some("b1".into()), services(&["s1"]), None);
        let outcome = recorder.record(draft).await.unwrap();

        let RecordOutcome::Buffered(visit) = outcome else {
            panic!("expected the visit to be buffered");
        };
        assert_eq!(visit.remote_visit_id, None);
        assert_eq!(recorder.buffer().list().await.unwrap(), vec![visit]);

        // Back online
        let report = recorder.flush().await.unwrap();
        assert_eq!(report.succeeded.len(), 1);
        assert!(recorder.buffer().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_record_keeps_parent_when_lines_fail() {
        let remote = Arc::new(FakeRemote::failing_line_call(0));
        let recorder = recorder(remote.clone()).await;

        let draft = recorder.draft(Some("b1".into()), services(&["s1", "s2"]), None);
        let RecordOutcome::Buffered(visit) = recorder.record(draft).await.unwrap() else {
            panic!("expected the visit to be buffered");
        };
        assert_eq!(visit.remote_visit_id.as_deref(), Some("101"));

        recorder.flush().await.unwrap();
        assert_eq!(remote.visit_calls.load(Ordering::SeqCst), 1);
        assert!(recorder.buffer().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_record_surfaces_rejection() {
        let remote = Arc::new(FakeRemote::default());
        remote.reject_visits.store(true, Ordering::SeqCst);
        let recorder = recorder(remote).await;

        let draft = recorder.draft(Some("b1".into()), services(&["s1"]), None);
        let err = recorder.record(draft).await.unwrap_err();

        assert!(matches!(err, SyncError::Delivery(_)));
        assert!(!err.is_retryable());
        assert!(recorder.buffer().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_buffered() {
        let remote = Arc::new(FakeRemote::default());
        let recorder = recorder(remote.clone()).await;

        let draft = recorder.draft(Some("b1".into()), services(&["s1", " "]), None);
        let err = recorder.defer(draft).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::Validation(ValidationError::Required { .. })
        ));
        assert!(recorder.buffer().is_empty().await.unwrap());
        assert_eq!(remote.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_free_text_phone_is_accepted() {
        let phones = ["ask for Ivan", "555-1234 ext 12", "+359 88 123 4567 / 0888 765 432"];

        // Online: submitted as typed
        let remote = Arc::new(FakeRemote::default());
        let online = recorder(remote.clone()).await;
        for phone in phones {
            let draft = online.draft(Some("b1".into()), services(&["s1"]), Some(phone));
            let outcome = online.record(draft).await.unwrap();
            assert!(matches!(outcome, RecordOutcome::Submitted { .. }));
        }
        let sent: Vec<_> = remote
            .visits
            .lock()
            .unwrap()
            .iter()
            .map(|v| v.phone.clone().unwrap())
            .collect();
        assert_eq!(sent, phones);

        // Deferred: buffered as typed
        let remote = Arc::new(FakeRemote::default());
        let offline = recorder(remote.clone()).await;
        for phone in phones {
            let draft = offline.draft(None, services(&["s2"]), Some(phone));
            offline.defer(draft).await.unwrap();
        }
        let buffered: Vec<_> = offline
            .buffer()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.phone.unwrap())
            .collect();
        assert_eq!(buffered, phones);
        assert_eq!(remote.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_defer_then_confirm() {
        let remote = Arc::new(FakeRemote::default());
        let recorder = recorder(remote.clone()).await;

        let queued = recorder
            .defer(recorder.draft(None, services(&["s2"]), Some("555-0002")))
            .await
            .unwrap();
        assert_eq!(remote.total_calls(), 0);

        let visit_id = recorder.confirm(&queued.local_id).await.unwrap();
        assert_eq!(visit_id, "101");
        assert!(recorder.buffer().is_empty().await.unwrap());

        let lines = remote.lines.lock().unwrap();
        assert_eq!(lines[0].barber_id, None);
        assert_eq!(lines[0].amount(), Money::from_cents(1500));
    }
}
