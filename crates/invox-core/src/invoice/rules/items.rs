//! Line item extraction.
//!
//! Items are read from the table section that follows a column header and
//! ends at the first totals line. When the section yields nothing, the whole
//! document is searched for known services instead.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::catalog::ServiceCatalog;
use crate::models::invoice::LineItem;

use super::amounts::parse_amount;
use super::patterns::{ANY_AMOUNT, LINE_ITEM_PATTERNS};
use super::{ExtractionMatch, FieldExtractor};

const HEADER_MARKERS: [&str; 3] = ["description", "quantity", "unit price"];
const SECTION_END_MARKERS: [&str; 3] = ["subtotal", "vat", "total amount"];

/// Position of the scan relative to the item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// Looking for the column header.
    Scanning,
    /// Between the header and the totals.
    InSection,
    /// Past the end of the table.
    Done,
}

impl SectionState {
    /// Feed one line.
    ///
    /// Returns the next state and whether the line should be parsed as an
    /// item. Header lines are consumed in any state before `Done`, so a
    /// repeated header never ends the section.
    pub fn step(self, line: &str) -> (Self, bool) {
        match self {
            Self::Scanning if is_header_line(line) => (Self::InSection, false),
            Self::Scanning => (Self::Scanning, false),
            Self::InSection if is_header_line(line) => (Self::InSection, false),
            Self::InSection if is_section_end(line) => (Self::Done, false),
            Self::InSection => (Self::InSection, !line.trim().is_empty()),
            Self::Done => (Self::Done, false),
        }
    }
}

fn contains_marker(line: &str, markers: &[&str]) -> bool {
    let lower = line.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

/// Whether `line` looks like the item table header.
pub fn is_header_line(line: &str) -> bool {
    contains_marker(line, &HEADER_MARKERS)
}

/// Whether `line` closes the item table.
pub fn is_section_end(line: &str) -> bool {
    contains_marker(line, &SECTION_END_MARKERS)
}

/// First number on the line, with or without a `$`.
fn first_price(line: &str) -> Option<Decimal> {
    ANY_AMOUNT
        .captures_iter(line)
        .find_map(|caps| parse_amount(&caps[1]))
}

/// Line item extractor backed by a service catalog.
pub struct LineItemExtractor<'a> {
    catalog: &'a ServiceCatalog,
}

impl<'a> LineItemExtractor<'a> {
    pub fn new(catalog: &'a ServiceCatalog) -> Self {
        Self { catalog }
    }

    /// Parse one table row.
    ///
    /// Positional columns come first; a row whose numbers fail to parse
    /// falls back to a catalog lookup with the first number on the line.
    pub fn parse_line(&self, line: &str) -> Option<LineItem> {
        let line = line.trim();

        for pattern in LINE_ITEM_PATTERNS.iter() {
            let Some(caps) = pattern.regex.captures(line) else {
                continue;
            };

            let quantity = caps[2].parse::<u32>().ok();
            let unit_price = parse_amount(&caps[3]);
            let line_total = parse_amount(&caps[4]);

            match (quantity, unit_price, line_total) {
                (Some(quantity), Some(unit_price), Some(line_total)) => {
                    return Some(LineItem::new(caps[1].trim(), quantity, unit_price, line_total));
                }
                _ => trace!(pattern = pattern.name, line, "item columns did not parse"),
            }
        }

        let service = self.catalog.find_in(line)?;
        let price = first_price(line).unwrap_or(Decimal::ZERO);
        Some(LineItem::single(service.name.as_str(), price))
    }

    fn section_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<Vec<LineItem>>> {
        let mut state = SectionState::Scanning;
        let mut header = None;
        let mut items = Vec::new();

        for (idx, &line) in lines.iter().enumerate() {
            let (next, parse) = state.step(line);
            if state == SectionState::Scanning && next == SectionState::InSection {
                header = Some(idx);
            }
            state = next;

            if state == SectionState::Done {
                debug!(line = idx, items = items.len(), "item section closed");
                break;
            }

            if parse {
                if let Some(item) = self.parse_line(line) {
                    items.push(item);
                }
            }
        }

        match header {
            Some(idx) if !items.is_empty() => Some(ExtractionMatch::new(items, 1, idx, "item-section")),
            _ => None,
        }
    }

    fn catalog_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<Vec<LineItem>>> {
        let mut first_line = None;
        let mut items = Vec::new();

        for (idx, &line) in lines.iter().enumerate() {
            let Some(service) = self.catalog.find_in(line) else {
                continue;
            };

            let price = first_price(line).unwrap_or(service.default_price);
            items.push(LineItem::single(service.name.as_str(), price));
            first_line.get_or_insert(idx);
        }

        let idx = first_line?;
        debug!(items = items.len(), "items recovered from service catalog");
        Some(ExtractionMatch::new(items, 2, idx, "service-catalog"))
    }
}

impl FieldExtractor for LineItemExtractor<'_> {
    type Output = Vec<LineItem>;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<Vec<LineItem>>> {
        self.section_pass(lines).or_else(|| self.catalog_pass(lines))
    }
}

/// Extract line items in document order (empty when none are found).
pub fn extract_line_items(lines: &[&str], catalog: &ServiceCatalog) -> Vec<LineItem> {
    LineItemExtractor::new(catalog)
        .extract(lines)
        .map(|m| m.value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_section_state_transitions() {
        let (state, parse) = SectionState::Scanning.step("Hosting 1 $100.00 $100.00");
        assert_eq!((state, parse), (SectionState::Scanning, false));

        let (state, parse) = SectionState::Scanning.step("Description Qty Price");
        assert_eq!((state, parse), (SectionState::InSection, false));

        let (state, parse) = SectionState::InSection.step("Unit Price Total");
        assert_eq!((state, parse), (SectionState::InSection, false));

        let (state, parse) = SectionState::InSection.step("Hosting 1 $100.00 $100.00");
        assert_eq!((state, parse), (SectionState::InSection, true));

        let (state, parse) = SectionState::InSection.step("VAT (15%): $15.00");
        assert_eq!((state, parse), (SectionState::Done, false));

        assert_eq!(SectionState::Done.step("Description"), (SectionState::Done, false));
    }

    #[test]
    fn test_section_with_single_item() {
        let catalog = ServiceCatalog::default();
        let lines = [
            "Description Quantity UnitPrice LineTotal",
            "Hosting 1 $100.00 $100.00",
            "Subtotal: $100.00",
        ];

        let hit = LineItemExtractor::new(&catalog).extract(&lines).unwrap();
        assert_eq!(hit.value, vec![LineItem::new("Hosting", 1, dec("100.00"), dec("100.00"))]);
        assert_eq!(hit.pass, 1);
        assert_eq!(hit.line, 0);
    }

    #[test]
    fn test_section_stops_at_totals() {
        let catalog = ServiceCatalog::default();
        let lines = [
            "Description Qty Unit Price Total",
            "Web Design Service 1 $500.00 $500.00",
            "Logo pack 2 40.00 80.00",
            "Total Amount: $580.00",
            "Hosting 1 $100.00 $100.00",
        ];

        assert_eq!(
            extract_line_items(&lines, &catalog),
            vec![
                LineItem::new("Web Design Service", 1, dec("500.00"), dec("500.00")),
                LineItem::new("Logo pack", 2, dec("40.00"), dec("80.00")),
            ]
        );
    }

    #[test]
    fn test_catalog_row_inside_section() {
        let catalog = ServiceCatalog::default();
        let lines = ["Description", "domain name renewal $20", "Subtotal 20"];

        assert_eq!(
            extract_line_items(&lines, &catalog),
            vec![LineItem::single("Domain Name", dec("20"))]
        );
    }

    #[test]
    fn test_catalog_pass_uses_default_price() {
        let catalog = ServiceCatalog::default();
        let lines = ["Thanks for choosing us", "Hosting", "Web Design Service $450", "Hosting"];

        let hit = LineItemExtractor::new(&catalog).extract(&lines).unwrap();
        assert_eq!(hit.pass, 2);
        assert_eq!(hit.line, 1);
        assert_eq!(
            hit.value,
            vec![
                LineItem::single("Hosting", dec("100.00")),
                LineItem::single("Web Design Service", dec("450")),
                LineItem::single("Hosting", dec("100.00")),
            ]
        );
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = ServiceCatalog::empty().with_service("Maintenance", dec("75.00"));
        let lines = ["Monthly maintenance"];

        assert_eq!(
            extract_line_items(&lines, &catalog),
            vec![LineItem::single("Maintenance", dec("75.00"))]
        );
    }

    #[test]
    fn test_no_items() {
        let catalog = ServiceCatalog::default();
        assert!(extract_line_items(&["Invoice # 1001", "Total Amount: $50.00"], &catalog).is_empty());
    }
}
