//! Heuristic invoice parser assembling the rule-based field extractors.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::catalog::ServiceCatalog;
use crate::models::config::{ExtractionConfig, InvoxConfig};
use crate::models::invoice::InvoiceExtractionResult;

use super::clock::{Clock, SystemClock};
use super::lines::{normalize_lines, truncate_chars};
use super::rules::number::fallback_invoice_number;
use super::rules::vat::VatFallback;
use super::rules::{
    derive_vat, AmountExtractor, CustomerNameExtractor, DateExtractor, ExtractionMatch, FieldExtractor,
    InvoiceNumberExtractor, LineItemExtractor, VatExtractor,
};

/// Fields of the extracted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceField {
    InvoiceNumber,
    InvoiceDate,
    CustomerName,
    TotalAmount,
    SubtotalAmount,
    VatAmount,
    LineItems,
}

impl fmt::Display for InvoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvoiceNumber => "invoice_number",
            Self::InvoiceDate => "invoice_date",
            Self::CustomerName => "customer_name",
            Self::TotalAmount => "total_amount",
            Self::SubtotalAmount => "subtotal_amount",
            Self::VatAmount => "vat_amount",
            Self::LineItems => "line_items",
        };
        f.write_str(name)
    }
}

/// How a field value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldOrigin {
    /// Read from the text by a cascade pass.
    Matched {
        pass: u8,
        line: usize,
        pattern: &'static str,
    },
    /// VAT computed as total minus subtotal.
    Derived,
    /// VAT estimated from the total at the default rate.
    Estimated,
    /// Documented default (generated number, today, sentinel, zero).
    Default,
}

impl fmt::Display for FieldOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched { pass, line, pattern } => {
                write!(f, "pass {pass}, line {} ({pattern})", line + 1)
            }
            Self::Derived => f.write_str("derived"),
            Self::Estimated => f.write_str("estimated"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// Provenance of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSource {
    pub field: InvoiceField,
    pub origin: FieldOrigin,
}

/// Result of invoice extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Extracted invoice data.
    pub invoice: InvoiceExtractionResult,
    /// Fields that fell back to defaults or were computed.
    pub warnings: Vec<String>,
    /// Where each field came from, in record order.
    pub sources: Vec<FieldSource>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionReport {
    /// Provenance of `field`.
    pub fn source_of(&self, field: InvoiceField) -> Option<FieldOrigin> {
        self.sources.iter().find(|s| s.field == field).map(|s| s.origin)
    }
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice from OCR text. Never fails; missing fields get defaults.
    fn parse(&self, text: &str) -> ExtractionReport;
}

/// Collects sources and warnings while the record is assembled.
#[derive(Default)]
struct Provenance {
    sources: Vec<FieldSource>,
    warnings: Vec<String>,
}

impl Provenance {
    fn matched<T>(&mut self, field: InvoiceField, hit: Option<ExtractionMatch<T>>) -> Option<T> {
        let hit = hit?;
        self.sources.push(FieldSource {
            field,
            origin: FieldOrigin::Matched {
                pass: hit.pass,
                line: hit.line,
                pattern: hit.source,
            },
        });
        Some(hit.value)
    }

    fn fallback(&mut self, field: InvoiceField, origin: FieldOrigin, warning: Option<String>) {
        if let Some(message) = warning {
            warn!(%field, "{}", message);
            self.warnings.push(message);
        }
        self.sources.push(FieldSource { field, origin });
    }
}

/// Rule-based parser for OCR invoice text.
///
/// Holds only immutable settings, so one instance can serve many threads.
#[derive(Clone)]
pub struct HeuristicInvoiceParser {
    config: ExtractionConfig,
    catalog: ServiceCatalog,
    clock: Arc<dyn Clock>,
}

impl HeuristicInvoiceParser {
    /// Create a parser with default settings and the system clock.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            catalog: ServiceCatalog::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a parser from a loaded configuration.
    pub fn from_config(config: InvoxConfig) -> Self {
        Self::new()
            .with_config(config.extraction)
            .with_catalog(config.catalog)
    }

    /// Set extraction thresholds.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the known-service catalog.
    pub fn with_catalog(mut self, catalog: ServiceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the time source for default dates and generated numbers.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    fn resolve_vat(
        &self,
        lines: &[&str],
        total: Decimal,
        subtotal: Decimal,
        provenance: &mut Provenance,
    ) -> Decimal {
        let hit = VatExtractor::new(&self.config.vat).extract(lines);
        if let Some(vat) = provenance.matched(InvoiceField::VatAmount, hit) {
            return vat;
        }

        let fallback = derive_vat(total, subtotal, &self.config.vat);
        match fallback {
            VatFallback::Difference(v) => provenance.fallback(
                InvoiceField::VatAmount,
                FieldOrigin::Derived,
                Some(format!("VAT derived from total minus subtotal: {v}")),
            ),
            VatFallback::Estimate(v) => provenance.fallback(
                InvoiceField::VatAmount,
                FieldOrigin::Estimated,
                Some(format!(
                    "VAT estimated at {}% of gross total: {v}",
                    self.config.vat.default_rate * Decimal::ONE_HUNDRED
                )),
            ),
            VatFallback::Zero => provenance.fallback(InvoiceField::VatAmount, FieldOrigin::Default, None),
        }
        fallback.amount()
    }
}

impl Default for HeuristicInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for HeuristicInvoiceParser {
    fn parse(&self, text: &str) -> ExtractionReport {
        let start = Instant::now();
        let mut provenance = Provenance::default();

        let (text, truncated) = truncate_chars(text, self.config.max_input_chars);
        if truncated {
            let message = format!("Input truncated to {} characters", self.config.max_input_chars);
            warn!("{}", message);
            provenance.warnings.push(message);
        }

        let lines = normalize_lines(text);
        info!("Parsing invoice from {} lines of text", lines.len());

        // Invoice number
        let hit = InvoiceNumberExtractor::new(&self.config.invoice_number).extract(&lines);
        let invoice_number = match provenance.matched(InvoiceField::InvoiceNumber, hit) {
            Some(number) => number,
            None => {
                let generated = fallback_invoice_number(self.clock.now(), &self.config.invoice_number);
                provenance.fallback(
                    InvoiceField::InvoiceNumber,
                    FieldOrigin::Default,
                    Some(format!("Could not extract invoice number, generated {generated}")),
                );
                generated
            }
        };

        // Date
        let hit = DateExtractor::new(self.config.dates.day_first).extract(&lines);
        let invoice_date = match provenance.matched(InvoiceField::InvoiceDate, hit) {
            Some(date) => date,
            None => {
                let today = self.clock.today();
                provenance.fallback(
                    InvoiceField::InvoiceDate,
                    FieldOrigin::Default,
                    Some(format!("Could not extract invoice date, using {today}")),
                );
                today
            }
        };

        // Customer
        let hit = CustomerNameExtractor::new(&self.config.customer).extract(&lines);
        let customer_name = match provenance.matched(InvoiceField::CustomerName, hit) {
            Some(name) => name,
            None => {
                provenance.fallback(
                    InvoiceField::CustomerName,
                    FieldOrigin::Default,
                    Some("Could not extract customer name".to_string()),
                );
                self.config.customer.unknown_name.clone()
            }
        };

        // Amounts; VAT depends on both
        let hit = AmountExtractor::total().extract(&lines);
        let total_amount = match provenance.matched(InvoiceField::TotalAmount, hit) {
            Some(total) => total,
            None => {
                provenance.fallback(
                    InvoiceField::TotalAmount,
                    FieldOrigin::Default,
                    Some("Could not extract total amount".to_string()),
                );
                Decimal::ZERO
            }
        };

        let hit = AmountExtractor::subtotal().extract(&lines);
        let subtotal_amount = provenance
            .matched(InvoiceField::SubtotalAmount, hit)
            .unwrap_or_else(|| {
                provenance.fallback(InvoiceField::SubtotalAmount, FieldOrigin::Default, None);
                Decimal::ZERO
            });

        let vat_amount = self.resolve_vat(&lines, total_amount, subtotal_amount, &mut provenance);

        // Line items
        let hit = LineItemExtractor::new(&self.catalog).extract(&lines);
        let line_items = match provenance.matched(InvoiceField::LineItems, hit) {
            Some(items) => items,
            None => {
                provenance.fallback(
                    InvoiceField::LineItems,
                    FieldOrigin::Default,
                    Some("Could not extract line items".to_string()),
                );
                Vec::new()
            }
        };

        let invoice = InvoiceExtractionResult {
            invoice_number,
            invoice_date,
            customer_name,
            total_amount,
            subtotal_amount,
            vat_amount,
            line_items,
        };

        debug!(
            "Extracted invoice {} for {} with {} items",
            invoice.invoice_number,
            invoice.customer_name,
            invoice.line_items.len()
        );
        info!(total = %invoice.total_amount, vat = %invoice.vat_amount, "Invoice assembled");

        ExtractionReport {
            invoice,
            warnings: provenance.warnings,
            sources: provenance.sources,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Extract an invoice record with default settings.
pub fn extract_invoice(text: &str) -> InvoiceExtractionResult {
    HeuristicInvoiceParser::new().parse(text).invoice
}
