//! Data models for invoice units and canonical records.

pub mod config;
pub mod invoice;
pub mod unit;

pub use config::ExtractionConfig;
pub use invoice::{
    DepositInstallment, DocumentVariant, InvoiceRecord, LineItem, ShippingFees, Totals,
};
pub use unit::{InvoiceUnit, RawPage, SourceDocument};
