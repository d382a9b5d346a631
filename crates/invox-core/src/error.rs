//! Error types for the invox-core library.
//!
//! Field extraction itself never fails: every extractor has a default. The
//! errors below only arise at the edges, when configuration is loaded, saved
//! or validated.

use thiserror::Error;

/// Main error type for the invox library.
#[derive(Error, Debug)]
pub enum InvoxError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when extraction settings are inconsistent.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// A lower bound is greater than its upper bound.
    #[error("invalid range for {field}: {min} > {max}")]
    InvalidRange {
        field: &'static str,
        min: usize,
        max: usize,
    },

    /// A ratio is outside of 0.0 - 1.0.
    #[error("{field} must be between 0 and 1, got {value}")]
    InvalidRatio { field: &'static str, value: f32 },

    /// A threshold or rate is negative.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: String },

    /// A required text setting is empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Result type for the invox library.
pub type Result<T> = std::result::Result<T, InvoxError>;
