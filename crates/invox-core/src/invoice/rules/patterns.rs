//! Regex tables for invoice field extraction.
//!
//! Each table is ordered by priority. Extractors walk lines in document order
//! and try every pattern of a table on a line before moving to the next line.

use lazy_static::lazy_static;
use regex::Regex;

/// A regex with a short name used in trace events.
#[derive(Debug)]
pub struct NamedPattern {
    pub name: &'static str,
    pub regex: Regex,
}

impl NamedPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).unwrap(),
        }
    }
}

fn table<S: AsRef<str>>(entries: &[(&'static str, S)]) -> Vec<NamedPattern> {
    entries
        .iter()
        .map(|(name, pattern)| NamedPattern::new(name, pattern.as_ref()))
        .collect()
}

/// Unsigned amount: `1,234.56`, `93.00`, `100.` or `42`.
pub const AMOUNT: &str = r"(?:\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+\.?\d*)";

lazy_static! {
    // Invoice number: keyword + digits, highest priority first
    pub static ref INVOICE_NUMBER_PATTERNS: Vec<NamedPattern> = table(&[
        ("hash", r"(?i)#\s*(\d+)"),
        ("ocr-neer-hash", r"(?i)neer\s*#\s*(\d+)"),
        ("ocr-eer-hash", r"(?i)eer\s*#\s*(\d+)"),
        ("word-hash", r"(?i)[a-z]*\s*#\s*(\d+)"),
        ("garbled-invoice", r"(?i)[a-z]*nvoice\s*#?\s*(\d+)"),
        ("invoice-hash", r"(?i)Invoice\s*#\s*(\d+)"),
        ("arabic-invoice-number", r"فاتورة\s*رقم\s*(\d+)"),
        ("invoice-digits", r"(?i)Invoice\s*(\d+)"),
        ("invoice-number-label", r"(?i)Invoice\s*Number\s*:?\s*(\d+)"),
        ("arabic-number-label", r"رقم\s*الفاتورة\s*:?\s*(\d+)"),
        ("inv-prefix", r"(?i)INV\s*[-#]?\s*(\d+)"),
        ("no-prefix", r"(?i)No\.?\s*(\d+)"),
        ("invoice-colon", r"(?i)Invoice\s*:?\s*(\d+)"),
        ("inv-abbrev", r"(?i)Inv\.?\s*:?\s*(\d+)"),
        ("bill-hash", r"(?i)Bill\s*#\s*(\d+)"),
        ("receipt-hash", r"(?i)Receipt\s*#\s*(\d+)"),
        ("trailing-invoice", r"(?i)(\d+)\s*Invoice"),
    ]);

    // "invoice" including OCR remnants such as "nvoice" or "lnvoice"
    pub static ref INVOICE_LIKE_WORD: Regex = Regex::new(r"(?i)[a-z]*nvoice").unwrap();

    // Standalone digit runs by magnitude
    pub static ref DIGITS_3_15: Regex = Regex::new(r"\b(\d{3,15})\b").unwrap();
    pub static ref DIGITS_4_15: Regex = Regex::new(r"\b(\d{4,15})\b").unwrap();
    pub static ref DIGITS_8_15: Regex = Regex::new(r"\b(\d{8,15})\b").unwrap();

    // Customer name labels; group 1 is the rest of the line
    pub static ref CUSTOMER_PATTERNS: Vec<NamedPattern> = table(&[
        ("customer-name", r"(?i)Customer\s*Name\s*:?\s*(.+)"),
        ("arabic-customer-name", r"اسم\s*العميل\s*:?\s*(.+)"),
        ("customer", r"(?i)Customer:\s*(.+)"),
        ("name", r"(?i)Name:\s*(.+)"),
        ("bill-to", r"(?i)Bill\s*To:\s*(.+)"),
        ("client", r"(?i)Client:\s*(.+)"),
    ]);

    // Labeled and date-shaped substrings
    pub static ref DATE_PATTERNS: Vec<NamedPattern> = table(&[
        ("invoice-date", r"(?i)Invoice\s*Date\s*:?\s*(.+)"),
        ("date", r"(?i)Date\s*:?\s*(.+)"),
        ("arabic-invoice-date", r"تاريخ\s*الفاتورة\s*:?\s*(.+)"),
        ("month-day-year", r"\b([A-Za-z]{3,9}\.?\s+\d{1,2},\s+\d{4})"),
        ("slash-date", r"(\d{1,2}/\d{1,2}/\d{4})"),
        ("iso-date", r"(\d{4}-\d{1,2}-\d{1,2})"),
    ]);

    // Total amount labels, then any dollar amount on the same line
    pub static ref TOTAL_PATTERNS: Vec<NamedPattern> = table(&[
        ("total-amount", format!(r"(?i)Total\s*Amount\s*:?\s*\$?({AMOUNT})")),
        ("balance-due", format!(r"(?i)Balance\s*Due\s*:?\s*\$?({AMOUNT})")),
        ("arabic-total", format!(r"المجموع\s*:?\s*\$?({AMOUNT})")),
        ("bare-currency", format!(r"\$({AMOUNT})")),
    ]);

    // Subtotal labels
    pub static ref SUBTOTAL_PATTERNS: Vec<NamedPattern> = table(&[
        ("subtotal", format!(r"(?i)Subtotal\s*:?\s*\$?({AMOUNT})")),
        ("sub-total", format!(r"(?i)Sub\s*Total\s*:?\s*\$?({AMOUNT})")),
        ("arabic-subtotal", format!(r"المجموع\s*الفرعي\s*:?\s*\$?({AMOUNT})")),
    ]);

    // VAT amounts; with two groups the last one is the amount
    pub static ref VAT_PATTERNS: Vec<NamedPattern> = table(&[
        ("vat-percent-paren", format!(r"(?i)(?:VAT|Tax|ضريبة)\s*\((\d+(?:\.\d+)?)%\)\s*:?\s*\$?({AMOUNT})")),
        ("vat-percent", format!(r"(?i)(?:VAT|Tax|ضريبة)\s*(\d+(?:\.\d+)?)%\s*:?\s*\$?({AMOUNT})")),
        ("vat-currency", format!(r"(?i)VAT.*?\$({AMOUNT})")),
        ("vat-label", format!(r"(?i)VAT\s*:?\s*\$?({AMOUNT})")),
        ("arabic-tax", format!(r"ضريبة.*?\$?({AMOUNT})")),
        ("tax", format!(r"(?i)Tax.*?\$?({AMOUNT})")),
    ]);

    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(&format!(r"\$({AMOUNT})")).unwrap();
    pub static ref ANY_AMOUNT: Regex = Regex::new(&format!(r"\$?({AMOUNT})")).unwrap();

    // Line item columns: description, quantity, unit price, line total
    pub static ref LINE_ITEM_PATTERNS: Vec<NamedPattern> = table(&[
        ("currency-columns", format!(r"^(.+?)\s+(\d+)\s+\$?({AMOUNT})\s+\$?({AMOUNT})$")),
        ("plain-columns", format!(r"^(.+?)\s+(\d+)\s+({AMOUNT})\s+({AMOUNT})$")),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_capture<'t>(patterns: &[NamedPattern], text: &'t str) -> Option<(&'static str, &'t str)> {
        patterns.iter().find_map(|p| {
            p.regex
                .captures(text)
                .map(|c| (p.name, c.get(c.len() - 1).unwrap().as_str()))
        })
    }

    #[test]
    fn test_all_tables_compile() {
        for patterns in [
            &*INVOICE_NUMBER_PATTERNS,
            &*CUSTOMER_PATTERNS,
            &*DATE_PATTERNS,
            &*TOTAL_PATTERNS,
            &*SUBTOTAL_PATTERNS,
            &*VAT_PATTERNS,
            &*LINE_ITEM_PATTERNS,
        ] {
            assert!(!patterns.is_empty());
        }
    }

    #[test]
    fn test_amount_fragment() {
        let re = Regex::new(&format!("^{AMOUNT}$")).unwrap();
        for ok in ["1,234.56", "93.00", "100.", "42", "12345"] {
            assert!(re.is_match(ok), "{ok}");
        }
        assert!(!re.is_match("12,34"));
    }

    #[test]
    fn test_invoice_number_priority() {
        assert_eq!(
            first_capture(&INVOICE_NUMBER_PATTERNS, "Invoice # 482910"),
            Some(("hash", "482910"))
        );
        assert_eq!(
            first_capture(&INVOICE_NUMBER_PATTERNS, "INV-00731"),
            Some(("inv-prefix", "00731"))
        );
        assert_eq!(
            first_capture(&INVOICE_NUMBER_PATTERNS, "فاتورة رقم 5521"),
            Some(("arabic-invoice-number", "5521"))
        );
    }

    #[test]
    fn test_vat_percent_keeps_amount_last() {
        let caps = VAT_PATTERNS[0].regex.captures("VAT (15%): $93.00").unwrap();
        assert_eq!(caps.len(), 3);
        assert_eq!(&caps[1], "15");
        assert_eq!(&caps[2], "93.00");
    }

    #[test]
    fn test_line_item_columns() {
        let caps = LINE_ITEM_PATTERNS[0]
            .regex
            .captures("Web Design Service 1 $500.00 $500.00")
            .unwrap();
        assert_eq!(&caps[1], "Web Design Service");
        assert_eq!(&caps[2], "1");
        assert_eq!(&caps[3], "500.00");
        assert_eq!(&caps[4], "500.00");
    }
}
