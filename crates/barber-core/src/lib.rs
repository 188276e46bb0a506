//! # barber-core: Pure Domain Logic for the Barbershop Data Layer
//!
//! This crate holds the types and rules shared by the storage and sync
//! crates. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Barber POS Data Layer                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Point-of-sale front end (web)                    │   │
//! │  │      Pick barber ──► Pick services ──► Confirm / Queue visit     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   barber-sync (buffer + backend)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ barber-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │    day    │  │   │
//! │  │   │ Buffered  │  │   Money   │  │ Catalog   │  │ DayWindow │  │   │
//! │  │   │  Visit    │  │           │  │ Lookup    │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BufferedVisit, VisitDraft, ServiceLine, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - `PriceLookup` and the per-session `ServiceCatalog`
//! - [`day`] - Half-open day windows in the shop's timezone
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use barber_core::{Money, Service, ServiceCatalog, VisitDraft};
//!
//! let catalog = ServiceCatalog::new(vec![
//!     Service::new("s1", "Haircut", Money::from_major_minor(20, 0)),
//!     Service::new("s2", "Beard trim", Money::from_major_minor(15, 0)),
//! ]);
//!
//! let draft = VisitDraft::priced(
//!     Some("b1".to_string()),
//!     vec!["s1".to_string(), "s2".to_string()],
//!     Some("555-1234"),
//!     &catalog,
//! );
//! assert_eq!(draft.total(), Money::from_major_minor(35, 0));
//! ```

pub mod day;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use day::DayWindow;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PriceLookup, ServiceCatalog};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of service lines on a single visit.
///
/// Guards against runaway line-item batches from a stuck UI control.
pub const MAX_SERVICES_PER_VISIT: usize = 50;

/// Maximum length, in characters, of the free-text contact phone.
pub const MAX_PHONE_LEN: usize = 200;
