//! # Repository Module
//!
//! Database repository implementations for the local buffer.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OfflineVisitBuffer                                                    │
//! │       │                                                                 │
//! │       │  store.load_visits() / store.store_visits(&visits)             │
//! │       ▼                                                                 │
//! │  dyn VisitBufferStore                                                  │
//! │  ├── OfflineVisitRepository   (SQLite, production)                     │
//! │  └── test doubles             (failure injection)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  named_records                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`offline_visit::OfflineVisitRepository`] - Versioned visit buffer record

pub mod offline_visit;
