//! # barber-sync: Offline Buffer and Backend Sync
//!
//! Records visits against the hosted backend and keeps the ones that could
//! not be submitted in a durable local buffer until a synchronization pass
//! delivers them.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         barber-sync                                     │
//! │                                                                         │
//! │  UI / caller                                                            │
//! │       │ record(draft) / defer(draft) / flush()                          │
//! │       ▼                                                                 │
//! │  ┌──────────────────┐   offline    ┌──────────────────────────────┐    │
//! │  │  VisitRecorder   │ ───────────► │  OfflineVisitBuffer          │    │
//! │  │  (recorder.rs)   │              │  (buffer.rs)                 │    │
//! │  └────────┬─────────┘              │  append / list / remove_at   │    │
//! │           │ online                 │  synchronize → SyncReport    │    │
//! │           ▼                        └───────┬──────────────┬───────┘    │
//! │  ┌──────────────────────────────┐          │              │            │
//! │  │  dyn RemoteVisitStore        │ ◄────────┘              ▼            │
//! │  │  └── SupabaseClient          │             dyn VisitBufferStore     │
//! │  │      (supabase.rs)           │             (barber-db, SQLite)      │
//! │  └──────────────────────────────┘                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Guarantees
//! - At-least-once: a visit leaves the buffer only after both its parent row
//!   and its line items were accepted
//! - A visit whose parent row committed keeps the parent id, so retries only
//!   resubmit the line items
//! - One pass submits visits sequentially in buffer order
//!
//! ## Collaborators Are Injected
//! The buffer takes its store, and `synchronize` takes its remote and price
//! lookup, as arguments. Nothing in this crate owns a global client.

pub mod buffer;
pub mod config;
pub mod error;
pub mod recorder;
pub mod remote;
pub mod supabase;

// =============================================================================
// Re-exports
// =============================================================================

pub use buffer::{FailedStage, ItemFailure, OfflineVisitBuffer, SyncReport};
pub use config::{RemoteSettings, ShopSettings, StorageSettings, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use recorder::{RecordOutcome, VisitRecorder};
pub use remote::{DeliveryError, RemoteVisitStore};
pub use supabase::SupabaseClient;
