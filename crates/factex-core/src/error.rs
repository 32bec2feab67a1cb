//! Error types for the factex-core library.

use thiserror::Error;

/// Main error type for the factex library.
#[derive(Error, Debug)]
pub enum FactexError {
    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Malformed locale-formatted numeric or date text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert {value:?} to {target}")]
pub struct ConversionError {
    /// What the value was supposed to become.
    pub target: &'static str,
    /// The offending source text.
    pub value: String,
}

impl ConversionError {
    pub fn new(target: &'static str, value: impl Into<String>) -> Self {
        Self {
            target,
            value: value.into(),
        }
    }
}

/// Errors related to invoice field extraction.
///
/// Every variant here is recoverable: it is converted into a warning on the
/// record it concerns and never aborts the batch.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Malformed numeric or date text.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A pattern cascade was exhausted with no match; the field defaults.
    #[error("missing field: {0}")]
    MissingField(String),

    /// The page segmenter could not determine whether a page continues the
    /// current invoice; resolved by the greedy continuation policy.
    #[error("ambiguous page continuation: {0}")]
    AmbiguousSegment(String),

    /// Two independently obtained totals disagree beyond epsilon; the
    /// extracted value wins.
    #[error("reconciliation conflict on {field}: extracted {extracted} vs derived {derived}")]
    ReconciliationConflict {
        field: &'static str,
        extracted: rust_decimal::Decimal,
        derived: rust_decimal::Decimal,
    },
}

/// Result type for the factex library.
pub type Result<T> = std::result::Result<T, FactexError>;
