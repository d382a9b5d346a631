//! Invoice field extraction module.

pub mod clock;
pub mod lines;
mod parser;
pub mod rules;

pub use clock::{Clock, FixedClock, SystemClock};
pub use lines::normalize_lines;
pub use parser::{
    extract_invoice, ExtractionReport, FieldOrigin, FieldSource, HeuristicInvoiceParser, InvoiceField,
    InvoiceParser,
};
