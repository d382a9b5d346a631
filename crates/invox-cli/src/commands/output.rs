//! Rendering of extraction results.

use std::fmt::Write as _;

use invox_core::models::invoice::format_amount;
use invox_core::{ExtractionReport, InvoiceExtractionResult};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used for per-file outputs.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub fn format_invoice(invoice: &InvoiceExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(invoice)?),
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
    }
}

fn format_csv(invoice: &InvoiceExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "invoice_date",
        "customer_name",
        "subtotal_amount",
        "vat_amount",
        "total_amount",
        "item_count",
    ])?;

    wtr.write_record([
        &invoice.invoice_number,
        &invoice.invoice_date.to_string(),
        &invoice.customer_name,
        &format_amount(invoice.subtotal_amount),
        &format_amount(invoice.vat_amount),
        &format_amount(invoice.total_amount),
        &invoice.line_items.len().to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoice: &InvoiceExtractionResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Invoice: {}", invoice.invoice_number);
    let _ = writeln!(output, "Date: {}", invoice.invoice_date);
    let _ = writeln!(output, "Customer: {}", invoice.customer_name);
    output.push('\n');

    if !invoice.line_items.is_empty() {
        output.push_str("Items:\n");
        for item in &invoice.line_items {
            let _ = writeln!(
                output,
                "  {} x{} @ {} = {}",
                item.description,
                item.quantity,
                format_amount(item.unit_price),
                format_amount(item.line_total)
            );
        }
        output.push('\n');
    }

    output.push_str("Summary:\n");
    let _ = writeln!(output, "  Subtotal: {}", format_amount(invoice.subtotal_amount));
    let _ = writeln!(output, "  VAT:      {}", format_amount(invoice.vat_amount));
    let _ = writeln!(output, "  Total:    {}", format_amount(invoice.total_amount));

    output
}

/// Field provenance and warnings, one per line.
pub fn format_explanation(report: &ExtractionReport) -> String {
    let mut output = String::new();

    output.push_str("Sources:\n");
    for source in &report.sources {
        let _ = writeln!(output, "  {:<16} {}", source.field.to_string(), source.origin);
    }

    if !report.warnings.is_empty() {
        output.push_str("Warnings:\n");
        for warning in &report.warnings {
            let _ = writeln!(output, "  - {warning}");
        }
    }

    let _ = writeln!(output, "Processing time: {}ms", report.processing_time_ms);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use invox_core::{FixedClock, HeuristicInvoiceParser, InvoiceParser};

    fn report() -> ExtractionReport {
        let now = chrono::NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        HeuristicInvoiceParser::new()
            .with_clock(FixedClock(now))
            .parse("Invoice # 482910\nDescription Qty Price Total\nHosting 1 100.00 100.00\nTotal Amount: $115.00")
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let csv = format_invoice(&report().invoice, OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("invoice_number,invoice_date"));
        assert!(lines[1].starts_with("482910,2025-03-14,Unknown Customer,0.00,15.00,115.00,1"));
    }

    #[test]
    fn test_text_summary() {
        let text = format_invoice(&report().invoice, OutputFormat::Text).unwrap();

        assert!(text.contains("Invoice: 482910"));
        assert!(text.contains("Hosting x1 @ 100.00 = 100.00"));
        assert!(text.contains("VAT:      15.00"));
    }

    #[test]
    fn test_explanation_lists_every_field() {
        let explanation = format_explanation(&report());

        assert!(explanation.contains("invoice_number"));
        assert!(explanation.contains("pass 1, line 1 (hash)"));
        assert!(explanation.contains("vat_amount"));
        assert!(explanation.contains("estimated"));
        assert!(explanation.contains("Warnings:"));
    }
}
