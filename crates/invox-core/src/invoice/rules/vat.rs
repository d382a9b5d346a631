//! VAT amount extraction and the fallback derived from totals.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::config::VatRules;

use super::amounts::parse_amount;
use super::patterns::{ANY_AMOUNT, CURRENCY_AMOUNT, VAT_PATTERNS};
use super::{ExtractionMatch, FieldExtractor};

/// Line markers for the VAT scan.
const VAT_MARKERS: [&str; 3] = ["vat", "tax", "ضريبة"];

/// VAT amount extractor.
///
/// Only lines mentioning VAT or tax are scanned. On each line the pattern
/// table is tried first, then any `$` amount, then any number large enough
/// not to be a rate.
pub struct VatExtractor<'a> {
    rules: &'a VatRules,
}

impl<'a> VatExtractor<'a> {
    pub fn new(rules: &'a VatRules) -> Self {
        Self { rules }
    }

    fn scan_line(&self, idx: usize, line: &str) -> Option<ExtractionMatch<Decimal>> {
        for pattern in VAT_PATTERNS.iter() {
            let Some(caps) = pattern.regex.captures(line) else {
                continue;
            };

            // Percentage patterns: the rate is discarded, the amount is last
            if caps.len() > 2 {
                if let Some(value) = caps.get(caps.len() - 1).and_then(|m| parse_amount(m.as_str())) {
                    debug!(line = idx, pattern = pattern.name, %value, "VAT accepted");
                    return Some(ExtractionMatch::new(value, 1, idx, pattern.name));
                }
                continue;
            }

            let Some(value) = parse_amount(&caps[1]) else {
                continue;
            };
            if value > self.rules.single_capture_min || line.contains('$') {
                debug!(line = idx, pattern = pattern.name, %value, "VAT accepted");
                return Some(ExtractionMatch::new(value, 1, idx, pattern.name));
            }
            trace!(line = idx, pattern = pattern.name, %value, "VAT candidate too small");
        }

        if let Some(value) = CURRENCY_AMOUNT
            .captures(line)
            .and_then(|caps| parse_amount(&caps[1]))
        {
            debug!(line = idx, %value, "VAT taken from currency amount");
            return Some(ExtractionMatch::new(value, 2, idx, "currency-on-line"));
        }

        ANY_AMOUNT
            .captures_iter(line)
            .filter_map(|caps| parse_amount(&caps[1]))
            .find(|value| *value > self.rules.bare_number_min)
            .map(|value| {
                debug!(line = idx, %value, "VAT taken from bare number");
                ExtractionMatch::new(value, 3, idx, "number-on-line")
            })
    }
}

impl FieldExtractor for VatExtractor<'_> {
    type Output = Decimal;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<Decimal>> {
        lines.iter().enumerate().find_map(|(idx, &line)| {
            let lower = line.to_lowercase();
            if !VAT_MARKERS.iter().any(|m| lower.contains(m)) {
                return None;
            }
            self.scan_line(idx, line)
        })
    }
}

/// Extract an explicit VAT amount, if any line states one.
pub fn extract_vat(lines: &[&str], rules: &VatRules) -> Option<Decimal> {
    VatExtractor::new(rules).extract(lines).map(|m| m.value)
}

/// VAT computed from the totals when no line states it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VatFallback {
    /// `total - subtotal`.
    Difference(Decimal),
    /// Share of a gross total at the default rate.
    Estimate(Decimal),
    /// Nothing to derive from.
    Zero,
}

impl VatFallback {
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Difference(v) | Self::Estimate(v) => *v,
            Self::Zero => Decimal::ZERO,
        }
    }
}

/// Derive VAT from the total and subtotal.
pub fn derive_vat(total: Decimal, subtotal: Decimal, rules: &VatRules) -> VatFallback {
    if total > Decimal::ZERO && subtotal > Decimal::ZERO && total > subtotal {
        return VatFallback::Difference(total - subtotal);
    }

    if total > Decimal::ZERO {
        let rate = rules.default_rate;
        return VatFallback::Estimate((total * rate / (Decimal::ONE + rate)).round_dp(2));
    }

    VatFallback::Zero
}
