//! Rule-based field extractors for OCR invoice text.
//!
//! Every extractor consumes the same normalized line sequence and runs an
//! ordered cascade of passes; the first candidate that survives the
//! plausibility filters wins.

pub mod amounts;
pub mod customer;
pub mod dates;
pub mod filters;
pub mod items;
pub mod number;
pub mod patterns;
pub mod vat;

pub use amounts::{extract_subtotal, extract_total, parse_amount, AmountExtractor, AmountKind};
pub use customer::{extract_customer_name, CustomerNameExtractor};
pub use dates::{extract_invoice_date, parse_date, DateExtractor};
pub use filters::{is_obviously_not_invoice_number, is_valid_invoice_number};
pub use items::{extract_line_items, LineItemExtractor, SectionState};
pub use number::{extract_invoice_number, InvoiceNumberExtractor};
pub use vat::{derive_vat, extract_vat, VatExtractor};

use regex::Captures;
use tracing::{debug, trace};

use patterns::NamedPattern;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from normalized lines.
    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<Self::Output>>;
}

/// A value together with where the cascade found it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Cascade pass that produced the value (1-based).
    pub pass: u8,
    /// Index of the source line in the normalized sequence.
    pub line: usize,
    /// Name of the pattern or heuristic that matched.
    pub source: &'static str,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pass: u8, line: usize, source: &'static str) -> Self {
        Self {
            value,
            pass,
            line,
            source,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            pass: self.pass,
            line: self.line,
            source: self.source,
        }
    }
}

/// Run a pattern table over `lines` and return the first accepted match.
///
/// Lines are visited in document order; on each line the patterns are tried
/// in table order. `accept` turns the captures into a value, or rejects them
/// by returning `None`, in which case the scan continues.
pub fn first_accepted<T, F>(
    pass: u8,
    lines: &[&str],
    patterns: &[NamedPattern],
    mut accept: F,
) -> Option<ExtractionMatch<T>>
where
    F: FnMut(&Captures, &str) -> Option<T>,
{
    for (idx, &line) in lines.iter().enumerate() {
        for pattern in patterns {
            let Some(caps) = pattern.regex.captures(line) else {
                continue;
            };

            match accept(&caps, line) {
                Some(value) => {
                    debug!(pass, line = idx, pattern = pattern.name, "candidate accepted");
                    return Some(ExtractionMatch::new(value, pass, idx, pattern.name));
                }
                None => {
                    trace!(pass, line = idx, pattern = pattern.name, matched = &caps[0], "candidate rejected");
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref DIGIT_TABLE: Vec<NamedPattern> = vec![
            NamedPattern {
                name: "long",
                regex: regex::Regex::new(r"(\d{4,})").unwrap(),
            },
            NamedPattern {
                name: "short",
                regex: regex::Regex::new(r"(\d+)").unwrap(),
            },
        ];
    }

    #[test]
    fn test_first_accepted_line_order_beats_pattern_order() {
        let lines = ["abc 12", "xyz 123456"];

        let hit = first_accepted(1, &lines, &DIGIT_TABLE, |caps, _| Some(caps[1].to_string())).unwrap();
        assert_eq!(hit, ExtractionMatch::new("12".to_string(), 1, 0, "short"));
    }

    #[test]
    fn test_first_accepted_continues_after_rejection() {
        let lines = ["abc 12", "xyz 123456"];

        let hit = first_accepted(2, &lines, &DIGIT_TABLE, |caps, _| {
            let value = &caps[1];
            (value != "12").then(|| value.to_string())
        })
        .unwrap();
        assert_eq!(hit.value, "123456");
        assert_eq!(hit.line, 1);
        assert_eq!(hit.source, "long");
    }

    #[test]
    fn test_first_accepted_no_match() {
        let lines = ["no digits here"];
        assert!(first_accepted(1, &lines, &DIGIT_TABLE, |_, _| Some(())).is_none());
    }

    #[test]
    fn test_match_map() {
        let hit = ExtractionMatch::new("42", 3, 7, "probe").map(|s| s.len());
        assert_eq!(hit, ExtractionMatch::new(2, 3, 7, "probe"));
    }
}
