//! Customer name extraction.

use tracing::debug;

use crate::models::config::CustomerRules;

use super::filters::{is_likely_person_name, is_numeric_or_symbol};
use super::patterns::CUSTOMER_PATTERNS;
use super::{first_accepted, ExtractionMatch, FieldExtractor};

/// Label fragments whose value often sits on the following line.
const LABEL_LINE_MARKERS: [&str; 4] = ["customer name", "customer:", "bill to", "اسم العميل"];

/// Customer name field extractor.
pub struct CustomerNameExtractor<'a> {
    rules: &'a CustomerRules,
}

impl<'a> CustomerNameExtractor<'a> {
    pub fn new(rules: &'a CustomerRules) -> Self {
        Self { rules }
    }

    /// Pass 1: `Customer Name: X` and friends on one line.
    fn label_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        first_accepted(1, lines, &CUSTOMER_PATTERNS, |caps, _| {
            let name = caps[1].trim();
            (!name.is_empty() && !is_numeric_or_symbol(name)).then(|| name.to_string())
        })
    }

    /// Pass 2: a bare label with the name on the next line.
    fn next_line_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        lines.windows(2).enumerate().find_map(|(idx, pair)| {
            let lower = pair[0].to_lowercase();
            if !LABEL_LINE_MARKERS.iter().any(|m| lower.contains(m)) {
                return None;
            }

            let candidate = pair[1].trim();
            if candidate.is_empty() || is_numeric_or_symbol(candidate) {
                return None;
            }

            debug!(line = idx + 1, "customer name found below label");
            Some(ExtractionMatch::new(candidate.to_string(), 2, idx + 1, "label-next-line"))
        })
    }

    /// Pass 3: the first line mentioning any configured name.
    fn known_name_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        let needles: Vec<String> = self.rules.known_names.iter().map(|n| n.to_lowercase()).collect();

        lines.iter().enumerate().find_map(|(idx, line)| {
            let lower = line.to_lowercase();
            let pos = needles.iter().position(|needle| lower.contains(needle))?;
            let name = &self.rules.known_names[pos];

            debug!(line = idx, name = name.as_str(), "known customer found");
            Some(ExtractionMatch::new(name.clone(), 3, idx, "known-name"))
        })
    }

    /// Pass 4: the first line shaped like a person name.
    fn structural_pass(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        lines.iter().enumerate().find_map(|(idx, line)| {
            let candidate = line.trim();
            is_likely_person_name(candidate, self.rules)
                .then(|| ExtractionMatch::new(candidate.to_string(), 4, idx, "person-name"))
        })
    }
}

impl FieldExtractor for CustomerNameExtractor<'_> {
    type Output = String;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        self.label_pass(lines)
            .or_else(|| self.next_line_pass(lines))
            .or_else(|| self.known_name_pass(lines))
            .or_else(|| self.structural_pass(lines))
    }
}

/// Extract the customer name, or the configured unknown sentinel.
pub fn extract_customer_name(lines: &[&str], rules: &CustomerRules) -> String {
    CustomerNameExtractor::new(rules)
        .extract(lines)
        .map(|m| m.value)
        .unwrap_or_else(|| rules.unknown_name.clone())
}
