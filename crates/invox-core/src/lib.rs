//! Core library for structured invoice extraction from OCR text.
//!
//! This crate provides:
//! - Line normalization for noisy OCR output
//! - Rule-based extractors for invoice number, date, customer, amounts, VAT and line items
//! - An assembling parser with per-field provenance
//! - Invoice data models and JSON configuration

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{ConfigError, InvoxError, Result};
pub use invoice::{
    extract_invoice, Clock, ExtractionReport, FieldOrigin, FieldSource, FixedClock, HeuristicInvoiceParser,
    InvoiceField, InvoiceParser, SystemClock,
};
pub use models::{
    ExtractionConfig, InvoiceExtractionResult, InvoxConfig, LineItem, ServiceCatalog, ServiceEntry,
};
