//! # Validation Module
//!
//! Input validation for visits before they are submitted or buffered.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                    │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Rules that must hold before a visit enters the buffer             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend constraints                                          │
//! │  └── Rejections come back as DeliveryError, not ValidationError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use barber_core::validation::{normalize_phone, validate_phone};
//!
//! assert_eq!(normalize_phone(Some("  ")), None);
//! assert!(validate_phone("555-1234 ext 12").is_ok());
//! assert!(validate_phone(&"9".repeat(500)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_PHONE_LEN, MAX_SERVICES_PER_VISIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Phone
// =============================================================================

/// Trims a phone entry; blank input becomes `None`.
pub fn normalize_phone(phone: Option<&str>) -> Option<String> {
    phone
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Validates a contact phone.
///
/// The phone is free text ("ask for Ivan" is a valid entry); only its length
/// is bounded, at `MAX_PHONE_LEN` characters.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Services
// =============================================================================

/// Validates the service ids of a visit.
///
/// ## Rules
/// - Every id is non-blank
/// - At most `MAX_SERVICES_PER_VISIT` (50) entries
/// - Empty list is allowed (barber not yet picked services)
pub fn validate_service_ids(service_ids: &[String]) -> ValidationResult<()> {
    if service_ids.len() > MAX_SERVICES_PER_VISIT {
        return Err(ValidationError::TooMany {
            field: "services".to_string(),
            max: MAX_SERVICES_PER_VISIT,
        });
    }

    if service_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ValidationError::Required {
            field: "service id".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Amounts
// =============================================================================

/// Validates a visit total. Zero is allowed (free service).
pub fn validate_total(total: Money) -> ValidationResult<()> {
    if total.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "total".to_string(),
        });
    }

    Ok(())
}
