//! Configuration structures for the extraction pipeline.
//!
//! The thresholds below are empirical heuristics tuned on sample invoices.
//! They are kept as named settings so deployments can override them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::models::catalog::ServiceCatalog;
use crate::models::invoice::UNKNOWN_CUSTOMER;

/// Main configuration for the invox pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoxConfig {
    /// Field extraction settings.
    pub extraction: ExtractionConfig,

    /// Known services for line item recovery.
    pub catalog: ServiceCatalog,
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Input longer than this many characters is truncated before scanning.
    pub max_input_chars: usize,

    /// Invoice number cascade settings.
    pub invoice_number: InvoiceNumberRules,

    /// Customer name settings.
    pub customer: CustomerRules,

    /// VAT extraction settings.
    pub vat: VatRules,

    /// Date parsing settings.
    pub dates: DateRules,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 1_000_000,
            invoice_number: InvoiceNumberRules::default(),
            customer: CustomerRules::default(),
            vat: VatRules::default(),
            dates: DateRules::default(),
        }
    }
}

/// Invoice number plausibility settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceNumberRules {
    /// Shortest accepted invoice number.
    pub min_length: usize,

    /// Longest accepted invoice number.
    pub max_length: usize,

    /// Numbers this long without an invoice keyword look like phone numbers.
    pub phone_min_length: usize,

    /// Lines scanned by the header-position pass.
    pub header_lines: usize,

    /// Lines scanned by the fallback magnitude pass.
    pub fallback_lines: usize,

    /// Prefix of the generated identifier.
    pub fallback_prefix: String,
}

impl Default for InvoiceNumberRules {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 10,
            phone_min_length: 10,
            header_lines: 5,
            fallback_lines: 10,
            fallback_prefix: "INV-".to_string(),
        }
    }
}

/// Customer name heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerRules {
    /// Name returned when nothing is found.
    pub unknown_name: String,

    /// Names recognised anywhere in the text.
    pub known_names: Vec<String>,

    /// Shortest line considered a person name.
    pub min_name_length: usize,

    /// Longest line considered a person name.
    pub max_name_length: usize,

    /// Minimum share of letters in a person name line.
    pub min_letter_ratio: f32,

    /// Fewest words in a person name.
    pub min_words: usize,

    /// Most words in a person name.
    pub max_words: usize,
}

impl Default for CustomerRules {
    fn default() -> Self {
        Self {
            unknown_name: UNKNOWN_CUSTOMER.to_string(),
            known_names: vec![
                "Ali Mohamed".to_string(),
                "محمد علي".to_string(),
                "Mahmoud Nour".to_string(),
                "محمود نور".to_string(),
            ],
            min_name_length: 3,
            max_name_length: 50,
            min_letter_ratio: 0.7,
            min_words: 2,
            max_words: 4,
        }
    }
}

/// VAT amount heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VatRules {
    /// Single-capture values must exceed this unless the line has a `$`.
    pub single_capture_min: Decimal,

    /// Bare numbers on a VAT line must exceed this.
    pub bare_number_min: Decimal,

    /// Tax rate used to estimate VAT from a gross total.
    pub default_rate: Decimal,
}

impl Default for VatRules {
    fn default() -> Self {
        Self {
            single_capture_min: Decimal::new(50, 0),
            bare_number_min: Decimal::new(30, 0),
            default_rate: Decimal::new(15, 2),
        }
    }
}

/// Date parsing preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRules {
    /// Read `01/02/2025` as 1 February rather than 2 January.
    pub day_first: bool,
}

impl Default for DateRules {
    fn default() -> Self {
        Self { day_first: true }
    }
}

impl InvoxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            _ => Ok(Self::default()),
        }
    }

    /// Check that settings are mutually consistent.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.extraction.validate()?;
        for entry in self.catalog.entries() {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::Empty("catalog.name"));
            }
            if entry.default_price.is_sign_negative() {
                return Err(ConfigError::Negative {
                    field: "catalog.default_price",
                    value: entry.default_price.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl ExtractionConfig {
    /// Check that settings are mutually consistent.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let number = &self.invoice_number;
        if number.min_length > number.max_length {
            return Err(ConfigError::InvalidRange {
                field: "invoice_number.length",
                min: number.min_length,
                max: number.max_length,
            });
        }
        if number.fallback_prefix.is_empty() {
            return Err(ConfigError::Empty("invoice_number.fallback_prefix"));
        }

        let customer = &self.customer;
        if customer.unknown_name.trim().is_empty() {
            return Err(ConfigError::Empty("customer.unknown_name"));
        }
        if customer.min_name_length > customer.max_name_length {
            return Err(ConfigError::InvalidRange {
                field: "customer.name_length",
                min: customer.min_name_length,
                max: customer.max_name_length,
            });
        }
        if customer.min_words > customer.max_words {
            return Err(ConfigError::InvalidRange {
                field: "customer.words",
                min: customer.min_words,
                max: customer.max_words,
            });
        }
        if !(0.0..=1.0).contains(&customer.min_letter_ratio) {
            return Err(ConfigError::InvalidRatio {
                field: "customer.min_letter_ratio",
                value: customer.min_letter_ratio,
            });
        }

        let vat = &self.vat;
        for (field, value) in [
            ("vat.single_capture_min", vat.single_capture_min),
            ("vat.bare_number_min", vat.bare_number_min),
            ("vat.default_rate", vat.default_rate),
        ] {
            if value.is_sign_negative() {
                return Err(ConfigError::Negative {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(InvoxConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "extraction": { "vat": { "default_rate": "0.05" } } }"#;
        let config: InvoxConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.extraction.vat.default_rate, Decimal::new(5, 2));
        assert_eq!(config.extraction.vat.bare_number_min, Decimal::new(30, 0));
        assert_eq!(config.extraction.invoice_number, InvoiceNumberRules::default());
        assert_eq!(config.catalog, ServiceCatalog::default());
    }

    #[test]
    fn test_invalid_length_range() {
        let mut config = ExtractionConfig::default();
        config.invoice_number.min_length = 12;

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "invoice_number.length",
                min: 12,
                max: 10,
            })
        );
    }

    #[test]
    fn test_invalid_ratio() {
        let mut config = ExtractionConfig::default();
        config.customer.min_letter_ratio = 1.5;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRatio { .. })
        ));
    }

    #[test]
    fn test_negative_rate() {
        let mut config = ExtractionConfig::default();
        config.vat.default_rate = Decimal::new(-1, 1);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { field: "vat.default_rate", .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = InvoxConfig::default();
        config.extraction.dates.day_first = false;
        config.save(&path).unwrap();

        let loaded = InvoxConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "extraction": { "customer": { "unknown_name": " " } } }"#)
            .unwrap();

        let err = InvoxConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("customer.unknown_name"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let config = InvoxConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config, InvoxConfig::default());
    }
}
