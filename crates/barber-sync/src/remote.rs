//! # Remote Visit Store
//!
//! The contract the buffer is synchronized against.
//!
//! ## Two Calls Per Visit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_visit(NewVisit)                 ──► visit id ("981")           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  create_visit_service_lines([           ──► ack                        │
//! │      { visit_id: "981", service_id: "s1", barber_id: "b1", 20.00 },    │
//! │      { visit_id: "981", service_id: "s2", barber_id: "b1", 15.00 },    │
//! │  ])                                                                     │
//! │                                                                         │
//! │  The two calls are NOT atomic. A visit whose parent row committed but  │
//! │  whose lines failed keeps the parent id so the next attempt only       │
//! │  resubmits the lines.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations must fail fast with a [`DeliveryError`] rather than hang:
//! the buffer imposes no timeouts of its own.

use async_trait::async_trait;
use barber_core::{NewVisit, ServiceLine};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Delivery Errors
// =============================================================================

/// A failure to persist data to the remote store.
///
/// Delivery errors never abort a synchronization pass; they are recorded per
/// item in the [`SyncReport`](crate::SyncReport).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryError {
    /// The request never reached the backend or the connection dropped.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The backend did not answer within the request timeout.
    #[error("Request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with something we could not interpret.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl DeliveryError {
    /// Creates a Network error.
    pub fn network(message: impl Into<String>) -> Self {
        DeliveryError::Network {
            message: message.into(),
        }
    }

    /// Creates an InvalidResponse error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        DeliveryError::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns true if trying again later may succeed.
    ///
    /// ## Retryable
    /// - Network failures and timeouts
    /// - 408, 429 and 5xx responses
    ///
    /// ## Non-Retryable
    /// - Other 4xx responses (the request itself is wrong)
    /// - Unreadable responses
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Network { .. } | DeliveryError::Timeout => true,
            DeliveryError::Rejected { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            DeliveryError::InvalidResponse { .. } => false,
        }
    }
}

// =============================================================================
// Remote Store Trait
// =============================================================================

/// Accepts visit rows and their line items.
#[async_trait]
pub trait RemoteVisitStore: Send + Sync {
    /// Creates the parent visit row and returns its backend id.
    async fn create_visit(&self, visit: &NewVisit) -> Result<String, DeliveryError>;

    /// Creates the line items of a committed visit in one batch.
    async fn create_visit_service_lines(&self, lines: &[ServiceLine]) -> Result<(), DeliveryError>;
}
