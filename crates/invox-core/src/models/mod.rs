//! Data models: the extracted record, the service catalog and configuration.

pub mod catalog;
pub mod config;
pub mod invoice;

pub use catalog::{ServiceCatalog, ServiceEntry};
pub use config::{ExtractionConfig, InvoxConfig};
pub use invoice::{InvoiceExtractionResult, LineItem};
