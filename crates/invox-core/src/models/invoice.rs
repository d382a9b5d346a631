//! Invoice record produced by the extraction pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer name used when nothing name-like is found.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// A fully populated invoice record.
///
/// Every field is always set: values that could not be recovered from the
/// text carry their documented default instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceExtractionResult {
    /// Invoice number, or a generated `INV-<timestamp>` identifier.
    pub invoice_number: String,

    /// Date the invoice was issued (current date when unrecoverable).
    pub invoice_date: NaiveDate,

    /// Customer name, or [`UNKNOWN_CUSTOMER`].
    pub customer_name: String,

    /// Total amount due.
    pub total_amount: Decimal,

    /// Subtotal before tax.
    pub subtotal_amount: Decimal,

    /// VAT amount, possibly derived or estimated.
    pub vat_amount: Decimal,

    /// Billed items in document order.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl InvoiceExtractionResult {
    /// Sum of all line totals.
    pub fn line_items_total(&self) -> Decimal {
        self.line_items.iter().map(|i| i.line_total).sum()
    }

    /// Whether the customer name is the unknown sentinel.
    pub fn has_unknown_customer(&self) -> bool {
        self.customer_name == UNKNOWN_CUSTOMER
    }
}

/// A single billable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service description.
    pub description: String,

    /// Quantity.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Decimal,

    /// Total for this line.
    pub line_total: Decimal,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
        line_total: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            line_total,
        }
    }

    /// A quantity-one item where unit price and total coincide.
    pub fn single(description: impl Into<String>, price: Decimal) -> Self {
        Self::new(description, 1, price, price)
    }
}

/// Format an amount with two decimal places (e.g. `1234.50`).
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_line_items_total() {
        let record = InvoiceExtractionResult {
            invoice_number: "482910".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            customer_name: UNKNOWN_CUSTOMER.to_string(),
            total_amount: dec("620.00"),
            subtotal_amount: dec("620.00"),
            vat_amount: Decimal::ZERO,
            line_items: vec![
                LineItem::single("Web Design Service", dec("500.00")),
                LineItem::new("Hosting", 1, dec("100.00"), dec("100.00")),
                LineItem::single("Domain Name", dec("20.00")),
            ],
        };

        assert_eq!(record.line_items_total(), dec("620.00"));
        assert!(record.has_unknown_customer());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("93")), "93.00");
        assert_eq!(format_amount(dec("14.999")), "15.00");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_serialize_field_names() {
        let item = LineItem::single("Hosting", dec("100.00"));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["description"], "Hosting");
        assert_eq!(json["quantity"], 1);
        assert!(json.get("unit_price").is_some());
        assert!(json.get("line_total").is_some());
    }
}
