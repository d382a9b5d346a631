//! Known-service catalog used by the line item extractor.
//!
//! The catalog maps recognised service names to a default unit price. It is
//! plain data so callers can swap or extend it without touching extraction
//! logic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recognised service and its default unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Service name as it appears on invoices.
    pub name: String,
    /// Price used when the matching line carries no number.
    pub default_price: Decimal,
}

impl ServiceEntry {
    pub fn new(name: impl Into<String>, default_price: Decimal) -> Self {
        Self {
            name: name.into(),
            default_price,
        }
    }
}

/// Ordered lookup of known services.
///
/// Order matters: when a line mentions several services, the first entry
/// wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    entries: Vec<ServiceEntry>,
}

impl ServiceCatalog {
    /// Create an empty catalog.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a catalog from entries, keeping their order.
    pub fn from_entries(entries: Vec<ServiceEntry>) -> Self {
        Self { entries }
    }

    /// Append a service.
    pub fn with_service(mut self, name: impl Into<String>, default_price: Decimal) -> Self {
        self.entries.push(ServiceEntry::new(name, default_price));
        self
    }

    pub fn entries(&self) -> &[ServiceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first service mentioned in `line` (case-insensitive).
    pub fn find_in(&self, line: &str) -> Option<&ServiceEntry> {
        let lower = line.to_lowercase();
        self.entries
            .iter()
            .find(|entry| lower.contains(&entry.name.to_lowercase()))
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::empty()
            .with_service("Web Design Service", Decimal::new(50000, 2))
            .with_service("Hosting", Decimal::new(10000, 2))
            .with_service("Domain Name", Decimal::new(2000, 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_in_is_case_insensitive() {
        let catalog = ServiceCatalog::default();

        let entry = catalog.find_in("monthly HOSTING plan").unwrap();
        assert_eq!(entry.name, "Hosting");
        assert_eq!(entry.default_price, Decimal::new(100, 0));
    }

    #[test]
    fn test_first_entry_wins() {
        let catalog = ServiceCatalog::default();

        let entry = catalog.find_in("Domain Name + Hosting bundle").unwrap();
        assert_eq!(entry.name, "Hosting");
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = ServiceCatalog::empty().with_service("SSL Certificate", Decimal::new(45, 0));

        assert!(catalog.find_in("Hosting").is_none());
        assert_eq!(catalog.find_in("ssl certificate x1").unwrap().default_price, Decimal::new(45, 0));
    }

    #[test]
    fn test_serializes_as_list() {
        let catalog = ServiceCatalog::empty().with_service("Hosting", Decimal::new(100, 0));
        let json = serde_json::to_value(&catalog).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["name"], "Hosting");
    }
}
