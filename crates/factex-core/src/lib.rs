//! Core library for French invoice text extraction.
//!
//! This crate provides:
//! - Page segmentation of multi-page PDF text into invoice units
//! - Layout classification (retail, online order, deposit invoice)
//! - Rule-based field and line-item extraction with pattern cascades
//! - Totals reconciliation (net + tax = gross) with conflict reporting
//! - A batch pipeline emitting schema-complete records keyed by
//!   `{source}_{invoice number}`

pub mod error;
pub mod invoice;
pub mod models;
pub mod pipeline;

pub use error::{ExtractionError, FactexError, Result};
pub use invoice::{classify, segment, FieldExtractor, FieldSet, LineItemParser};
pub use models::{
    DepositInstallment, DocumentVariant, ExtractionConfig, InvoiceRecord, InvoiceUnit, LineItem,
    RawPage, ShippingFees, SourceDocument, Totals,
};
pub use pipeline::Pipeline;
