//! # Domain Types
//!
//! Core domain types used throughout the barbershop data layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Reference data (fetched once per session)                             │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │     Barber      │   │     Service     │                             │
//! │  │  id, name       │   │  id, name,      │                             │
//! │  │                 │   │  default_price  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  Visit lifecycle                                                        │
//! │  ┌─────────────┐  append  ┌───────────────┐  sync  ┌─────────────────┐ │
//! │  │ VisitDraft  │ ───────► │ BufferedVisit │ ─────► │ NewVisit +      │ │
//! │  │ (UI input)  │          │ (durable)     │        │ ServiceLine[]   │ │
//! │  └─────────────┘          └───────────────┘        └─────────────────┘ │
//! │                                                                         │
//! │  Reporting                                                              │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ RecordedVisit   │   │ DailyEarnings   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pricing
//! `BufferedVisit::total_cents` is computed from catalog prices when the visit
//! is drafted and never recomputed. Line items, on the other hand, are priced
//! when they are submitted. The two can drift if the catalog changes between
//! buffering and synchronization; that staleness is accepted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::pricing::PriceLookup;
use crate::validation::{self, ValidationResult};

// =============================================================================
// Reference Data
// =============================================================================

/// A barber who can be assigned to a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Barber {
    pub id: String,
    pub name: String,
}

/// A service offered by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Current list price in cents.
    pub default_price_cents: i64,
}

impl Service {
    /// Creates a service entry.
    pub fn new(id: impl Into<String>, name: impl Into<String>, default_price: Money) -> Self {
        Service {
            id: id.into(),
            name: name.into(),
            default_price_cents: default_price.cents(),
        }
    }

    /// Returns the list price as Money.
    #[inline]
    pub fn default_price(&self) -> Money {
        Money::from_cents(self.default_price_cents)
    }
}

// =============================================================================
// Visit Draft
// =============================================================================

/// A visit as captured by the point-of-sale screen, not yet buffered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VisitDraft {
    /// Assigned barber (nullable until assigned).
    pub barber: Option<String>,
    /// Service ids in the order picked. Duplicates allowed.
    pub services: Vec<String>,
    /// Optional contact phone.
    pub phone: Option<String>,
    /// Total snapshot in cents.
    pub total_cents: i64,
}

impl VisitDraft {
    /// Builds a draft and computes its total from current catalog prices.
    ///
    /// Unknown service ids contribute zero. Blank phone numbers become `None`.
    pub fn priced<P>(
        barber: Option<String>,
        services: Vec<String>,
        phone: Option<&str>,
        prices: &P,
    ) -> Self
    where
        P: PriceLookup + ?Sized,
    {
        let total: Money = services.iter().map(|id| prices.price_or_zero(id)).sum();

        VisitDraft {
            barber,
            services,
            phone: validation::normalize_phone(phone),
            total_cents: total.cents(),
        }
    }

    /// Returns the total snapshot as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Validates the draft before it is submitted or buffered.
    ///
    /// ## Rules
    /// - Phone, if present, fits [`validation::validate_phone`] (free text, length only)
    /// - Service ids pass [`validation::validate_service_ids`]
    /// - Total is not negative
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(phone) = &self.phone {
            validation::validate_phone(phone)?;
        }
        validation::validate_service_ids(&self.services)?;
        validation::validate_total(self.total())?;
        Ok(())
    }
}

// =============================================================================
// Buffered Visit
// =============================================================================

/// A visit held locally pending remote submission.
///
/// ## Identity
/// `local_id` is a UUID v4 assigned when the visit is buffered. It is the
/// stable handle for cancelling a specific entry; buffer positions are only
/// meaningful within a single read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BufferedVisit {
    pub local_id: String,
    pub barber: Option<String>,
    pub services: Vec<String>,
    pub phone: Option<String>,
    pub total_cents: i64,
    /// When the visit was buffered. Immutable.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Backend id of the parent visit row, once committed.
    ///
    /// Set only when the parent row succeeded but the line items did not, so
    /// the next attempt resubmits the lines without creating a second parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_visit_id: Option<String>,
}

impl BufferedVisit {
    /// Buffers a draft with a fresh local id.
    pub fn from_draft(draft: VisitDraft, created_at: DateTime<Utc>) -> Self {
        BufferedVisit {
            local_id: Uuid::new_v4().to_string(),
            barber: draft.barber,
            services: draft.services,
            phone: draft.phone,
            total_cents: draft.total_cents,
            created_at,
            remote_visit_id: None,
        }
    }

    /// Returns the total snapshot as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Builds the visit-creation request for this entry.
    ///
    /// `visit_time` is the time of submission, not `created_at`.
    pub fn new_visit_request(&self, visit_time: DateTime<Utc>) -> NewVisit {
        NewVisit {
            visit_time,
            total_cents: self.total_cents,
            phone: self.phone.clone(),
        }
    }

    /// Builds the line-item batch for a committed parent visit.
    ///
    /// Each service is priced through `prices`, falling back to zero.
    pub fn service_lines<P>(&self, visit_id: &str, prices: &P) -> Vec<ServiceLine>
    where
        P: PriceLookup + ?Sized,
    {
        self.services
            .iter()
            .map(|service_id| ServiceLine {
                visit_id: visit_id.to_string(),
                service_id: service_id.clone(),
                barber_id: self.barber.clone(),
                amount_cents: prices.price_or_zero(service_id).cents(),
            })
            .collect()
    }
}

// =============================================================================
// Remote Requests
// =============================================================================

/// Request to create a parent visit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewVisit {
    #[ts(as = "String")]
    pub visit_time: DateTime<Utc>,
    pub total_cents: i64,
    pub phone: Option<String>,
}

impl NewVisit {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One service rendered during a visit, linked to the parent visit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServiceLine {
    pub visit_id: String,
    pub service_id: String,
    pub barber_id: Option<String>,
    pub amount_cents: i64,
}

impl ServiceLine {
    /// Returns the line amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Reporting
// =============================================================================

/// A visit as stored by the backend, joined with its service lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecordedVisit {
    pub id: String,
    #[ts(as = "String")]
    pub visit_time: DateTime<Utc>,
    pub total_cents: i64,
    pub phone: Option<String>,
    /// Barber of the first service line, if any.
    pub barber_id: Option<String>,
    pub service_ids: Vec<String>,
}

/// One row of the shop's daily earnings report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyEarnings {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub total_revenue_cents: i64,
    pub total_visits: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ServiceCatalog;

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new(vec![
            Service::new("s1", "Haircut", Money::from_cents(2000)),
            Service::new("s2", "Beard trim", Money::from_cents(1500)),
        ])
    }

    #[test]
    fn test_priced_draft_snapshots_total() {
        let draft = VisitDraft::priced(
            Some("b1".into()),
            vec!["s1".into(), "s2".into(), "unknown".into()],
            Some("  555-1234 "),
            &catalog(),
        );

        assert_eq!(draft.total_cents, 3500);
        assert_eq!(draft.phone.as_deref(), Some("555-1234"));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_blank_phone_is_none() {
        let draft = VisitDraft::priced(None, vec![], Some("   "), &catalog());
        assert_eq!(draft.phone, None);
        assert_eq!(draft.total(), Money::zero());
    }

    #[test]
    fn test_from_draft_assigns_distinct_ids() {
        let draft = VisitDraft::priced(None, vec!["s1".into()], None, &catalog());
        let now = Utc::now();

        let a = BufferedVisit::from_draft(draft.clone(), now);
        let b = BufferedVisit::from_draft(draft, now);

        assert_ne!(a.local_id, b.local_id);
        assert_eq!(a.created_at, now);
        assert_eq!(a.remote_visit_id, None);
    }

    #[test]
    fn test_service_lines_keep_order_and_duplicates() {
        let draft = VisitDraft::priced(
            Some("b1".into()),
            vec!["s2".into(), "s1".into(), "s2".into(), "gone".into()],
            None,
            &catalog(),
        );
        let visit = BufferedVisit::from_draft(draft, Utc::now());

        let lines = visit.service_lines("v-9", &catalog());
        let ids: Vec<&str> = lines.iter().map(|l| l.service_id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1", "s2", "gone"]);

        let amounts: Vec<i64> = lines.iter().map(|l| l.amount_cents).collect();
        assert_eq!(amounts, vec![1500, 2000, 1500, 0]);

        assert!(lines.iter().all(|l| l.visit_id == "v-9"));
        assert!(lines.iter().all(|l| l.barber_id.as_deref() == Some("b1")));
    }

    #[test]
    fn test_new_visit_request_uses_submission_time() {
        let created = Utc::now() - chrono::Duration::hours(3);
        let draft = VisitDraft::priced(None, vec!["s1".into()], Some("555"), &catalog());
        let visit = BufferedVisit::from_draft(draft, created);

        let submitted_at = Utc::now();
        let request = visit.new_visit_request(submitted_at);
        assert_eq!(request.visit_time, submitted_at);
        assert_eq!(request.total(), Money::from_cents(2000));
        assert_eq!(request.phone.as_deref(), Some("555"));
    }

    #[test]
    fn test_remote_visit_id_omitted_when_absent() {
        let draft = VisitDraft::priced(None, vec![], None, &catalog());
        let visit = BufferedVisit::from_draft(draft, Utc::now());

        let json = serde_json::to_string(&visit).unwrap();
        assert!(!json.contains("remote_visit_id"));

        let back: BufferedVisit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, visit);
    }
}
