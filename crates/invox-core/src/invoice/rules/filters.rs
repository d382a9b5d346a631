//! Plausibility filters for extracted candidates.
//!
//! Each filter takes a candidate value and the line it came from, so the
//! same token can be accepted on one line and rejected on another.

use crate::models::config::{CustomerRules, InvoiceNumberRules};

/// Words that tie a number on the same line to the invoice itself.
pub const INVOICE_KEYWORDS: [&str; 5] = ["invoice", "فاتورة", "#", "bill", "receipt"];

/// Words that mark a line as carrying money amounts.
pub const PRICE_KEYWORDS: [&str; 8] = [
    "$", "total", "amount", "price", "cost", "subtotal", "balance", "due",
];

/// Invoice vocabulary that rules a line out as a person name.
pub const NAME_STOP_WORDS: [&str; 9] = [
    "invoice",
    "date",
    "total",
    "amount",
    "vat",
    "subtotal",
    "description",
    "quantity",
    "price",
];

/// Calendar years that OCR text often carries next to invoice numbers.
const YEAR_LITERALS: [&str; 3] = ["2024", "2025", "2026"];

fn contains_any(lower_line: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| lower_line.contains(needle))
}

/// Whether `line` mentions the invoice (case-insensitive).
pub fn has_invoice_keyword(line: &str) -> bool {
    contains_any(&line.to_lowercase(), &INVOICE_KEYWORDS)
}

/// Whether `line` mentions a price or amount (case-insensitive).
pub fn has_price_keyword(line: &str) -> bool {
    contains_any(&line.to_lowercase(), &PRICE_KEYWORDS)
}

/// Whether `number` could be an invoice number given its `line`.
pub fn is_valid_invoice_number(number: &str, line: &str, rules: &InvoiceNumberRules) -> bool {
    let len = number.chars().count();
    if len < rules.min_length || len > rules.max_length {
        return false;
    }

    // Years: 20xx and the literal recent years
    if len == 4 && number.starts_with("20") {
        return false;
    }
    if YEAR_LITERALS.contains(&number) {
        return false;
    }

    if has_invoice_keyword(line) {
        return true;
    }

    if has_price_keyword(line) {
        return false;
    }

    // Phone numbers
    len < rules.phone_min_length
}

/// Whether `number` is clearly something else (price, VAT, date, phone).
///
/// Lines carrying an invoice keyword are never excluded.
pub fn is_obviously_not_invoice_number(number: &str, line: &str, rules: &InvoiceNumberRules) -> bool {
    let lower = line.to_lowercase();

    if contains_any(&lower, &INVOICE_KEYWORDS) {
        return false;
    }

    if contains_any(&lower, &PRICE_KEYWORDS) {
        return true;
    }

    if lower.contains("vat") || lower.contains('%') {
        return true;
    }

    if (lower.contains('/') || lower.contains('-')) && line.chars().count() > 8 {
        return true;
    }

    number.chars().count() > rules.max_length
}

/// Whether `text` holds nothing but digits, punctuation, symbols and spaces.
///
/// Control characters disqualify the text. Combining marks that are not
/// alphabetic count as symbols.
pub fn is_numeric_or_symbol(text: &str) -> bool {
    text.chars().all(|c| {
        c.is_numeric() || c.is_whitespace() || (!c.is_alphanumeric() && !c.is_control())
    })
}

/// Structural check for a line that reads like a person name.
pub fn is_likely_person_name(text: &str, rules: &CustomerRules) -> bool {
    let len = text.chars().count();
    if text.trim().is_empty() || len < rules.min_name_length || len > rules.max_name_length {
        return false;
    }

    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    if (letters as f32) < len as f32 * rules.min_letter_ratio {
        return false;
    }

    let lower = text.to_lowercase();
    if contains_any(&lower, &NAME_STOP_WORDS) {
        return false;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    (rules.min_words..=rules.max_words).contains(&words.len())
        && words
            .iter()
            .all(|word| word.chars().next().is_some_and(char::is_alphabetic))
}
