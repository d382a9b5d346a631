//! Total and subtotal extraction.

use regex::Captures;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{SUBTOTAL_PATTERNS, TOTAL_PATTERNS};
use super::{first_accepted, ExtractionMatch, FieldExtractor};

/// Which labeled amount to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    /// Grand total (`Total Amount`, `Balance Due`, `المجموع`, bare `$`).
    Total,
    /// Amount before tax (`Subtotal`, `Sub Total`, `المجموع الفرعي`).
    Subtotal,
}

/// Amount field extractor.
pub struct AmountExtractor {
    kind: AmountKind,
}

impl AmountExtractor {
    pub fn new(kind: AmountKind) -> Self {
        Self { kind }
    }

    pub fn total() -> Self {
        Self::new(AmountKind::Total)
    }

    pub fn subtotal() -> Self {
        Self::new(AmountKind::Subtotal)
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = Decimal;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<Decimal>> {
        // First line carrying any total pattern wins, labels before `$` within a line
        let patterns = match self.kind {
            AmountKind::Total => &*TOTAL_PATTERNS,
            AmountKind::Subtotal => &*SUBTOTAL_PATTERNS,
        };
        first_accepted(1, lines, patterns, amount_capture)
    }
}

fn amount_capture(caps: &Captures, _line: &str) -> Option<Decimal> {
    parse_amount(&caps[1])
}

/// Extract the total amount (0 when absent).
pub fn extract_total(lines: &[&str]) -> Decimal {
    AmountExtractor::total()
        .extract(lines)
        .map(|m| m.value)
        .unwrap_or_default()
}

/// Extract the subtotal (0 when absent).
pub fn extract_subtotal(lines: &[&str]) -> Decimal {
    AmountExtractor::subtotal()
        .extract(lines)
        .map(|m| m.value)
        .unwrap_or_default()
}

/// Parse an OCR amount such as `1,234.56`, `93.00` or `100.`.
///
/// Thousands separators are dropped and a dangling decimal point is ignored.
/// Returns `None` for anything that is not a plain non-negative number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.strip_suffix('.').unwrap_or(&cleaned);

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    Decimal::from_str(cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("93.00"), Some(dec("93.00")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("100."), Some(dec("100")));
        assert_eq!(parse_amount(" 42 "), Some(dec("42")));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("١٢٣"), None);
    }

    #[test]
    fn test_total_amount_label() {
        let lines = ["Total Amount: $115.00"];
        assert_eq!(extract_total(&lines), dec("115.00"));
    }

    #[test]
    fn test_total_earlier_dollar_line_wins() {
        let lines = ["Hosting 1 $100.00 $100.00", "Total Amount: $115.00"];

        let hit = AmountExtractor::total().extract(&lines).unwrap();
        assert_eq!(hit.value, dec("100.00"));
        assert_eq!(hit.source, "bare-currency");
        assert_eq!(hit.line, 0);
    }

    #[test]
    fn test_total_label_beats_dollar_on_same_line() {
        let hit = AmountExtractor::total()
            .extract(&["Paid $20.00, Total Amount: 115.00"])
            .unwrap();
        assert_eq!(hit.value, dec("115.00"));
        assert_eq!(hit.source, "total-amount");
    }

    #[test]
    fn test_total_balance_due_and_arabic() {
        assert_eq!(extract_total(&["Balance Due 2,450.50"]), dec("2450.50"));
        assert_eq!(extract_total(&["المجموع: 575.00"]), dec("575.00"));
    }

    #[test]
    fn test_total_bare_currency_fallback() {
        let hit = AmountExtractor::total().extract(&["Pay $89.99 now"]).unwrap();
        assert_eq!(hit.value, dec("89.99"));
        assert_eq!(hit.source, "bare-currency");
    }

    #[test]
    fn test_total_default_zero() {
        assert_eq!(extract_total(&["Thank you for your business"]), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(extract_subtotal(&["Subtotal: $100.00"]), dec("100.00"));
        assert_eq!(extract_subtotal(&["Sub Total 80"]), dec("80"));
        assert_eq!(extract_subtotal(&["المجموع الفرعي: 500.00"]), dec("500.00"));
        assert_eq!(extract_subtotal(&["Total Amount: $115.00"]), Decimal::ZERO);
    }
}
