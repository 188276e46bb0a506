//! # Sync Error Types
//!
//! Error types for buffer, delivery and configuration operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SyncError                                      │
//! │                                                                         │
//! │  Storage (fatal to the operation, buffer unchanged)                    │
//! │  └── StorageFailure ◄── DbError                                        │
//! │                                                                         │
//! │  Caller errors (re-read list() and try again)                          │
//! │  ├── IndexOutOfRange                                                   │
//! │  └── UnknownVisit                                                      │
//! │                                                                         │
//! │  Delivery (only outside synchronize; inside it is per-item data)       │
//! │  └── Delivery ◄── DeliveryError                                        │
//! │                                                                         │
//! │  Input                                                                 │
//! │  └── Validation ◄── ValidationError                                    │
//! │                                                                         │
//! │  Configuration                                                         │
//! │  ├── InvalidConfig / InvalidUrl                                        │
//! │  └── ConfigLoadFailed / ConfigSaveFailed                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use barber_core::ValidationError;
use barber_db::DbError;
use thiserror::Error;

use crate::remote::DeliveryError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering buffer, delivery and configuration failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// The local durable medium is unavailable or corrupt.
    #[error("Buffer storage failed: {0}")]
    StorageFailure(#[from] DbError),

    // =========================================================================
    // Buffer Errors
    // =========================================================================
    /// A position that is not valid at call time.
    #[error("Buffer index {index} out of range (buffer holds {len} visits)")]
    IndexOutOfRange { index: usize, len: usize },

    /// No buffered visit has this local id.
    #[error("No buffered visit with local id {0}")]
    UnknownVisit(String),

    // =========================================================================
    // Delivery Errors
    // =========================================================================
    /// A remote request failed.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The visit failed validation before submission.
    #[error("Invalid visit: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if the same call may succeed later without changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Delivery(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this error came from the local durable medium.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, SyncError::StorageFailure(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_become_storage_failures() {
        let err: SyncError = DbError::Internal("disk I/O error".into()).into();
        assert!(err.is_storage_error());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("disk I/O error"));
    }

    #[test]
    fn test_retryable_follows_delivery_error() {
        assert!(SyncError::from(DeliveryError::Timeout).is_retryable());
        assert!(!SyncError::from(DeliveryError::Rejected {
            status: 400,
            message: "bad".into()
        })
        .is_retryable());
        assert!(!SyncError::IndexOutOfRange { index: 3, len: 2 }.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::IndexOutOfRange { index: 3, len: 2 };
        assert_eq!(err.to_string(), "Buffer index 3 out of range (buffer holds 2 visits)");

        assert!(SyncError::InvalidUrl("nope".into()).is_config_error());
        assert!(!SyncError::UnknownVisit("a9f3".into()).is_config_error());
    }
}
