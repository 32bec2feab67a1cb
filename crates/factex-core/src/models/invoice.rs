//! Canonical invoice record emitted to the tabular export collaborator.
//!
//! Every field is always present: absent extractions default to an empty
//! string, zero, or an empty sequence. Downstream consumers never branch on
//! field absence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The closed set of invoice layouts the engine understands.
///
/// `Unknown` is never produced by classification; it tags the minimal
/// record emitted when a unit fails catastrophically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentVariant {
    /// Legacy retail invoice from the management software ("meg").
    #[serde(rename = "meg")]
    #[default]
    StandardRetail,

    /// Web-shop order invoice ("internet").
    #[serde(rename = "internet")]
    OnlineOrder,

    /// Deposit invoice ("acompte").
    #[serde(rename = "acompte")]
    Deposit,

    /// Catastrophic-failure marker, never returned by classification.
    #[serde(rename = "unknown")]
    Unknown,
}

impl DocumentVariant {
    /// Short tag used in keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentVariant::StandardRetail => "meg",
            DocumentVariant::OnlineOrder => "internet",
            DocumentVariant::Deposit => "acompte",
            DocumentVariant::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DocumentVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single article line on the invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    /// Article reference (structured code, SKU, or empty).
    pub reference: String,

    /// Free-text description.
    pub description: String,

    /// Quantity; rational, not necessarily integer. Positive when present.
    pub quantity: Decimal,

    /// Tax-exclusive unit price.
    pub unit_price: Decimal,

    /// Tax-inclusive unit price when the source carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price_gross: Option<Decimal>,

    /// Line-level discount rate (decimal fraction, e.g. 0.10 for 10%).
    pub discount_rate: Decimal,

    /// Tax-exclusive line amount.
    pub net_amount: Decimal,

    /// Tax rate as a percentage (e.g. 20.0).
    pub tax_rate: Decimal,
}

/// Reconciled document-level totals.
///
/// Target invariant once reconciliation completes: gross = net + tax within
/// the configured epsilon. The discount magnitude is always non-negative
/// regardless of the sign convention in the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Tax-exclusive total (HT).
    pub net: Decimal,

    /// Tax amount (TVA).
    pub tax: Decimal,

    /// Tax-inclusive total (TTC).
    pub gross: Decimal,

    /// Document-level discount magnitude, never distributed across items.
    pub discount: Decimal,
}

/// Shipping fee sub-amount for online orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingFees {
    /// Tax-inclusive fee amount; zero for free shipping or pickup.
    pub amount: Decimal,

    /// Carrier or delivery description ("Colissimo", "Livraison gratuite").
    pub description: String,
}

/// A scheduled deposit installment ("Echéance(s) Acompte de X € au date").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositInstallment {
    /// Installment amount.
    pub amount: Decimal,

    /// Due date in ISO form.
    pub due_date: String,
}

/// The canonical output record, one per logical invoice.
///
/// The schema shape is a hard contract: all fields are populated, with
/// type-appropriate defaults where extraction found nothing. Dates are ISO
/// `YYYY-MM-DD` strings, or the unmodified source text when the date shape
/// was unrecognized (reported as a warning), or empty when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Layout variant this invoice was classified as.
    pub variant: DocumentVariant,

    /// Invoice identifier (online orders fall back to the order number).
    pub invoice_number: String,

    /// Customer account number ("CLTnnnn"), retail layouts only.
    pub customer_number: String,

    /// Customer name, with the vendor's own letterhead rejected.
    pub customer_name: String,

    /// Invoice date.
    pub invoice_date: String,

    /// Order date, online orders only.
    pub order_date: String,

    /// Free-text comment.
    pub comment: String,

    /// Two-level sale-channel code ("20.02").
    pub sale_type: String,

    /// Fully-qualified three-level sale-channel code ("20.02.01").
    pub sale_channel: String,

    /// Payment status ("Payé" for online orders).
    pub payment_status: String,

    /// Payment method ("carte bancaire", "cheque", ...).
    pub payment_method: String,

    /// Reconciled totals.
    pub totals: Totals,

    /// Article lines in document order.
    pub line_items: Vec<LineItem>,

    /// Shipping fee sub-amount.
    pub shipping: ShippingFees,

    /// Scheduled deposit installment, when the document announces one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_installment: Option<DepositInstallment>,

    /// Sum of line-item quantities.
    pub item_count: Decimal,

    /// Non-fatal issues encountered while extracting this invoice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Error marker set only on the minimal record for a failed unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvoiceRecord {
    /// A schema-complete record with all defaults for the given variant.
    pub fn empty(variant: DocumentVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }
}

/// Compare two amounts within the given tolerance (the configured
/// `amount_epsilon`, 0.01 by default).
pub fn amounts_close(a: Decimal, b: Decimal, epsilon: Decimal) -> bool {
    (a - b).abs() <= epsilon
}
