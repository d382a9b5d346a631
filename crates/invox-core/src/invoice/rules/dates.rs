//! Invoice date extraction.

use chrono::NaiveDate;

use super::patterns::DATE_PATTERNS;
use super::{first_accepted, ExtractionMatch, FieldExtractor};

/// Formats that do not depend on day/month order.
///
/// `%B` also accepts the three-letter month abbreviation.
const UNAMBIGUOUS_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%B %d, %Y",
    "%B. %d, %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

const DAY_FIRST: [&str; 2] = ["%d/%m/%Y", "%m/%d/%Y"];
const MONTH_FIRST: [&str; 2] = ["%m/%d/%Y", "%d/%m/%Y"];

/// Date field extractor.
pub struct DateExtractor {
    day_first: bool,
}

impl DateExtractor {
    pub fn new(day_first: bool) -> Self {
        Self { day_first }
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FieldExtractor for DateExtractor {
    type Output = NaiveDate;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<NaiveDate>> {
        first_accepted(1, lines, &DATE_PATTERNS, |caps, _| parse_date(&caps[1], self.day_first))
    }
}

/// Parse a date as printed on an invoice.
///
/// Slash dates are ambiguous; `day_first` picks the order tried first and
/// the other order is used when the first gives no valid calendar date.
pub fn parse_date(s: &str, day_first: bool) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let slash_formats = if day_first { DAY_FIRST } else { MONTH_FIRST };

    UNAMBIGUOUS_FORMATS
        .iter()
        .chain(slash_formats.iter())
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Extract the invoice date, if any line carries a parsable one.
pub fn extract_invoice_date(lines: &[&str], day_first: bool) -> Option<NaiveDate> {
    DateExtractor::new(day_first).extract(lines).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_date("2025-03-14", true), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("Mar 14, 2025", true), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("March 14, 2025", true), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("14 March 2025", true), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("14.03.2025", true), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("not a date", true), None);
        assert_eq!(parse_date("31/02/2025", true), None);
    }

    #[test]
    fn test_slash_order() {
        assert_eq!(parse_date("01/02/2025", true), Some(ymd(2025, 2, 1)));
        assert_eq!(parse_date("01/02/2025", false), Some(ymd(2025, 1, 2)));
        // Only one order is a real date
        assert_eq!(parse_date("03/14/2025", true), Some(ymd(2025, 3, 14)));
    }

    #[test]
    fn test_labeled_date() {
        let lines = ["Invoice # 1001", "Invoice Date: 2025-03-14"];
        let hit = DateExtractor::default().extract(&lines).unwrap();
        assert_eq!(hit.value, ymd(2025, 3, 14));
        assert_eq!(hit.line, 1);
        assert_eq!(hit.source, "invoice-date");
    }

    #[test]
    fn test_arabic_label() {
        let lines = ["تاريخ الفاتورة: 2025-01-05"];
        assert_eq!(extract_invoice_date(&lines, true), Some(ymd(2025, 1, 5)));
    }

    #[test]
    fn test_unparsable_label_falls_through_to_shape() {
        // The label capture carries trailing text; the slash shape still matches
        let lines = ["Date: 14/03/2025 (due in 30 days)"];
        let hit = DateExtractor::default().extract(&lines).unwrap();
        assert_eq!(hit.value, ymd(2025, 3, 14));
        assert_eq!(hit.source, "slash-date");
    }

    #[test]
    fn test_unlabeled_month_name() {
        let lines = ["Issued March 14, 2025 in Cairo"];
        assert_eq!(extract_invoice_date(&lines, true), Some(ymd(2025, 3, 14)));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_invoice_date(&["Total Amount: $50.00"], true), None);
    }
}
