//! Record assembly: folding extracted fields, items and totals into the
//! schema-complete output record.

use rust_decimal::Decimal;
use tracing::warn;

use super::fields::FieldSet;
use crate::models::invoice::{DocumentVariant, InvoiceRecord, LineItem, Totals};
use crate::models::unit::InvoiceUnit;

/// Assemble the canonical record for one invoice unit.
///
/// Absent fields settle to their type-appropriate defaults here; the
/// record never exposes an `Option` where the schema promises a value.
pub fn assemble(
    unit: &InvoiceUnit,
    variant: DocumentVariant,
    fields: FieldSet,
    items: Vec<LineItem>,
    totals: Totals,
    warnings: Vec<String>,
) -> InvoiceRecord {
    let item_count = items.iter().map(|i| i.quantity).sum::<Decimal>();

    InvoiceRecord {
        variant,
        invoice_number: fields
            .invoice_number
            .or_else(|| unit.invoice_number.clone())
            .unwrap_or_default(),
        customer_number: fields.customer_number.unwrap_or_default(),
        customer_name: fields.customer_name.unwrap_or_default(),
        invoice_date: fields.invoice_date.unwrap_or_default(),
        order_date: fields.order_date.unwrap_or_default(),
        comment: fields.comment.unwrap_or_default(),
        sale_type: fields.sale_type.unwrap_or_default(),
        sale_channel: fields.sale_channel.unwrap_or_default(),
        payment_status: fields.payment_status.unwrap_or_default(),
        payment_method: fields.payment_method.unwrap_or_default(),
        totals,
        line_items: items,
        shipping: fields.shipping.unwrap_or_default(),
        deposit_installment: fields.deposit_installment,
        item_count,
        warnings,
        error: None,
    }
}

/// Minimal record for a unit that failed catastrophically: everything
/// defaults except the identifier recovered during segmentation and the
/// failure message.
pub fn error_record(unit: &InvoiceUnit, message: impl Into<String>) -> InvoiceRecord {
    let message = message.into();
    warn!(source = %unit.source, %message, "emitting error record for failed unit");

    InvoiceRecord {
        invoice_number: unit.invoice_number.clone().unwrap_or_default(),
        error: Some(message),
        ..InvoiceRecord::empty(DocumentVariant::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn unit() -> InvoiceUnit {
        InvoiceUnit {
            source: "lot.pdf".to_string(),
            invoice_number: Some("FAC001".to_string()),
            text: String::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let record = assemble(
            &unit(),
            DocumentVariant::StandardRetail,
            FieldSet::default(),
            Vec::new(),
            Totals::default(),
            Vec::new(),
        );

        assert_eq!(record.invoice_number, "FAC001");
        assert_eq!(record.customer_name, "");
        assert_eq!(record.item_count, Decimal::ZERO);
        assert_eq!(record.error, None);
    }

    #[test]
    fn test_extracted_number_beats_segment_number() {
        let fields = FieldSet {
            invoice_number: Some("FAC002".to_string()),
            ..FieldSet::default()
        };
        let record = assemble(
            &unit(),
            DocumentVariant::StandardRetail,
            fields,
            Vec::new(),
            Totals::default(),
            Vec::new(),
        );

        assert_eq!(record.invoice_number, "FAC002");
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let items = vec![
            LineItem {
                quantity: Decimal::from_str("2.00").unwrap(),
                ..LineItem::default()
            },
            LineItem {
                quantity: Decimal::from_str("1.50").unwrap(),
                ..LineItem::default()
            },
        ];
        let record = assemble(
            &unit(),
            DocumentVariant::StandardRetail,
            FieldSet::default(),
            items,
            Totals::default(),
            Vec::new(),
        );

        assert_eq!(record.item_count, Decimal::from_str("3.50").unwrap());
    }

    #[test]
    fn test_error_record_shape() {
        let record = error_record(&unit(), "boom");

        assert_eq!(record.variant, DocumentVariant::Unknown);
        assert_eq!(record.invoice_number, "FAC001");
        assert_eq!(record.error.as_deref(), Some("boom"));
        assert!(record.line_items.is_empty());
    }
}
