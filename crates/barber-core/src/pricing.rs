//! # Pricing
//!
//! Price resolution for service line items.
//!
//! ## Session Catalog
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session start                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Fetch services from backend (once)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceCatalog ──► PriceLookup::resolve_price("s1") → Some($20.00)    │
//! │                 └─► PriceLookup::resolve_price("??") → None → $0.00    │
//! │                                                                         │
//! │  A price change on the backend after the fetch is not picked up until  │
//! │  the next session. That staleness is accepted.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Service;

/// Resolves the current price of a service.
pub trait PriceLookup {
    /// Returns the price of `service_id`, or `None` when it is unknown.
    fn resolve_price(&self, service_id: &str) -> Option<Money>;

    /// Returns the price of `service_id`, falling back to zero.
    fn price_or_zero(&self, service_id: &str) -> Money {
        self.resolve_price(service_id).unwrap_or_default()
    }
}

impl PriceLookup for HashMap<String, Money> {
    fn resolve_price(&self, service_id: &str) -> Option<Money> {
        self.get(service_id).copied()
    }
}

// =============================================================================
// Service Catalog
// =============================================================================

/// The services catalog fetched once per session.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: Vec<Service>,
    by_id: HashMap<String, usize>,
}

impl ServiceCatalog {
    /// Builds a catalog. A later duplicate id wins.
    pub fn new(services: Vec<Service>) -> Self {
        let by_id = services
            .iter()
            .enumerate()
            .map(|(index, service)| (service.id.clone(), index))
            .collect();

        ServiceCatalog { services, by_id }
    }

    /// Returns the services in the order they were fetched.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Number of services in the catalog.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns true if the catalog has no services.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Looks up a service by id.
    pub fn get(&self, service_id: &str) -> Option<&Service> {
        self.by_id.get(service_id).map(|&index| &self.services[index])
    }

    /// Looks up a service by id, failing when it is not in the catalog.
    pub fn require(&self, service_id: &str) -> CoreResult<&Service> {
        self.get(service_id)
            .ok_or_else(|| CoreError::UnknownService(service_id.to_string()))
    }

    /// Returns the display name of a service, if known.
    pub fn name_of(&self, service_id: &str) -> Option<&str> {
        self.get(service_id).map(|s| s.name.as_str())
    }

    /// Sums current prices for a list of service ids. Unknown ids count as zero.
    pub fn calculate_total(&self, service_ids: &[String]) -> Money {
        service_ids.iter().map(|id| self.price_or_zero(id)).sum()
    }
}

impl PriceLookup for ServiceCatalog {
    fn resolve_price(&self, service_id: &str) -> Option<Money> {
        self.get(service_id).map(Service::default_price)
    }
}

impl From<Vec<Service>> for ServiceCatalog {
    fn from(services: Vec<Service>) -> Self {
        ServiceCatalog::new(services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new(vec![
            Service::new("s1", "Haircut", Money::from_cents(2000)),
            Service::new("s2", "Beard trim", Money::from_cents(1500)),
        ])
    }

    #[test]
    fn test_resolve_and_fallback() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_price("s1"), Some(Money::from_cents(2000)));
        assert_eq!(catalog.resolve_price("nope"), None);
        assert_eq!(catalog.price_or_zero("nope"), Money::zero());
    }

    #[test]
    fn test_calculate_total_counts_duplicates() {
        let total = catalog().calculate_total(&["s1".into(), "s1".into(), "s2".into(), "x".into()]);
        assert_eq!(total, Money::from_cents(5500));
    }

    #[test]
    fn test_require_unknown_service() {
        let catalog = catalog();
        assert_eq!(catalog.require("s2").unwrap().name, "Beard trim");
        assert!(matches!(
            catalog.require("zzz"),
            Err(CoreError::UnknownService(id)) if id == "zzz"
        ));
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let catalog = ServiceCatalog::new(vec![
            Service::new("s1", "Old", Money::from_cents(100)),
            Service::new("s1", "New", Money::from_cents(200)),
        ]);
        assert_eq!(catalog.name_of("s1"), Some("New"));
        assert_eq!(catalog.price_or_zero("s1"), Money::from_cents(200));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_hash_map_lookup() {
        let mut prices = HashMap::new();
        prices.insert("s1".to_string(), Money::from_cents(2000));
        assert_eq!(prices.price_or_zero("s1"), Money::from_cents(2000));
        assert_eq!(prices.price_or_zero("s2"), Money::zero());
    }
}
