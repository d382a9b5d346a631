//! Invoice number extraction.
//!
//! Five passes, from explicit keyword patterns down to magnitude guesses in
//! the document header. When all of them fail the caller synthesizes an
//! identifier from the clock.

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::{debug, trace};

use crate::models::config::InvoiceNumberRules;

use super::filters::{is_obviously_not_invoice_number, is_valid_invoice_number};
use super::patterns::{DIGITS_3_15, DIGITS_4_15, DIGITS_8_15, INVOICE_LIKE_WORD, INVOICE_NUMBER_PATTERNS};
use super::{first_accepted, ExtractionMatch, FieldExtractor};

/// Keywords for the membership pass; `inv` also catches truncated words.
const MEMBERSHIP_KEYWORDS: [&str; 6] = ["#", "invoice", "فاتورة", "bill", "receipt", "inv"];

/// Invoice number field extractor.
pub struct InvoiceNumberExtractor<'a> {
    rules: &'a InvoiceNumberRules,
}

impl<'a> InvoiceNumberExtractor<'a> {
    pub fn new(rules: &'a InvoiceNumberRules) -> Self {
        Self { rules }
    }

    /// Pass 1: keyword + number patterns.
    fn explicit_pattern_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        first_accepted(1, lines, &INVOICE_NUMBER_PATTERNS, |caps, line| {
            let number = &caps[1];
            is_valid_invoice_number(number, line, self.rules).then(|| number.to_string())
        })
    }

    /// Pass 2: any number on a line that says "invoice" (even garbled).
    fn invoice_line_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        self.token_pass(2, "invoice-line", lines, &DIGITS_3_15, |line| {
            INVOICE_LIKE_WORD.is_match(line) || line.contains("فاتورة")
        }, false)
    }

    /// Pass 3: any number on a line containing an invoice keyword.
    fn keyword_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        self.token_pass(3, "keyword-line", lines, &DIGITS_3_15, |line| {
            let lower = line.to_lowercase();
            MEMBERSHIP_KEYWORDS.iter().any(|k| lower.contains(k))
        }, false)
    }

    /// Pass 4: standalone numbers in the header area.
    fn header_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        let window = &lines[..lines.len().min(self.rules.header_lines)];
        self.token_pass(4, "header", window, &DIGITS_4_15, |_| true, true)
    }

    /// Pass 5: long numbers near the top of the document.
    fn fallback_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        let window = &lines[..lines.len().min(self.rules.fallback_lines)];
        self.token_pass(5, "magnitude", window, &DIGITS_8_15, |_| true, true)
    }

    fn token_pass(
        &self,
        pass: u8,
        source: &'static str,
        lines: &[&str],
        tokens: &Regex,
        line_filter: impl Fn(&str) -> bool,
        exclude_obvious: bool,
    ) -> Option<ExtractionMatch<String>> {
        for (idx, &line) in lines.iter().enumerate() {
            if !line_filter(line) {
                continue;
            }

            for caps in tokens.captures_iter(line) {
                let number = &caps[1];
                let accepted = is_valid_invoice_number(number, line, self.rules)
                    && !(exclude_obvious && is_obviously_not_invoice_number(number, line, self.rules));

                if accepted {
                    debug!(pass, line = idx, number, "invoice number accepted");
                    return Some(ExtractionMatch::new(number.to_string(), pass, idx, source));
                }
                trace!(pass, line = idx, number, "invoice number rejected");
            }
        }

        None
    }
}

impl FieldExtractor for InvoiceNumberExtractor<'_> {
    type Output = String;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        self.explicit_pattern_pass(lines)
            .or_else(|| self.invoice_line_pass(lines))
            .or_else(|| self.keyword_pass(lines))
            .or_else(|| self.header_pass(lines))
            .or_else(|| self.fallback_pass(lines))
    }
}

/// Identifier used when no invoice number is found: `INV-YYYYMMDDhhmmss`.
pub fn fallback_invoice_number(now: NaiveDateTime, rules: &InvoiceNumberRules) -> String {
    format!("{}{}", rules.fallback_prefix, now.format("%Y%m%d%H%M%S"))
}

/// Extract an invoice number, if any pass finds one.
pub fn extract_invoice_number(lines: &[&str], rules: &InvoiceNumberRules) -> Option<String> {
    InvoiceNumberExtractor::new(rules)
        .extract(lines)
        .map(|m| m.value)
}
