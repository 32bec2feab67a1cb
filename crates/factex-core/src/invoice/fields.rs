//! Variant-aware scalar field extraction.
//!
//! Each variant owns one extractor capability, selected once after
//! classification. Every field is resolved through an ordered cascade of
//! patterns; the first match wins and an exhausted cascade surfaces as a
//! `MissingField` warning, never an error.

use tracing::debug;

use super::rules::locale::normalize_date;
use super::rules::patterns::*;
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{DepositInstallment, DocumentVariant, ShippingFees};
use crate::models::unit::InvoiceUnit;

/// Scalar fields pulled out of an invoice unit. `None` means the cascade
/// was exhausted; the assembler substitutes the type-appropriate default.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub order_date: Option<String>,
    pub customer_number: Option<String>,
    pub customer_name: Option<String>,
    pub comment: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub sale_type: Option<String>,
    pub sale_channel: Option<String>,
    pub shipping: Option<ShippingFees>,
    pub deposit_installment: Option<DepositInstallment>,
}

/// Per-variant scalar field extraction capability.
pub trait FieldExtractor: Send + Sync {
    /// Extract all scalar fields from the unit, collecting warnings for
    /// exhausted cascades and unnormalizable dates.
    fn extract(&self, unit: &InvoiceUnit) -> (FieldSet, Vec<String>);
}

/// Select the extractor for a classified variant.
pub fn field_extractor_for(
    variant: DocumentVariant,
    config: &ExtractionConfig,
) -> Box<dyn FieldExtractor> {
    match variant {
        DocumentVariant::OnlineOrder => Box::new(OnlineFieldExtractor {
            config: config.clone(),
        }),
        DocumentVariant::Deposit => Box::new(DepositFieldExtractor {
            config: config.clone(),
        }),
        _ => Box::new(RetailFieldExtractor {
            config: config.clone(),
        }),
    }
}

/// Extractor for the legacy retail layout.
pub struct RetailFieldExtractor {
    config: ExtractionConfig,
}

impl FieldExtractor for RetailFieldExtractor {
    fn extract(&self, unit: &InvoiceUnit) -> (FieldSet, Vec<String>) {
        let text = &unit.text;
        let mut fields = FieldSet::default();
        let mut warnings = Vec::new();

        fields.invoice_number = capture_trimmed(&INVOICE_NUMBER_RETAIL, text);
        if fields.invoice_number.is_none() {
            warnings.push(missing("invoice number"));
        }

        fields.invoice_date = captured_date(&INVOICE_DATE_RETAIL, text, &mut warnings);
        if fields.invoice_date.is_none() {
            warnings.push(missing("invoice date"));
        }

        fields.customer_number = capture_trimmed(&CUSTOMER_NUMBER, text);
        fields.customer_name =
            retail_customer_name(text, &self.config.vendor_name, &mut warnings);

        fields.payment_method = capture_trimmed(&PAYMENT_METHOD, text).map(normalize_payment);

        extract_common(text, &mut fields);
        (fields, warnings)
    }
}

/// Extractor for web-shop order invoices.
pub struct OnlineFieldExtractor {
    config: ExtractionConfig,
}

impl FieldExtractor for OnlineFieldExtractor {
    fn extract(&self, unit: &InvoiceUnit) -> (FieldSet, Vec<String>) {
        let text = &unit.text;
        let mut fields = FieldSet::default();
        let mut warnings = Vec::new();

        // The invoice number cascade falls back to the order number; some
        // web invoices only carry the latter.
        fields.invoice_number = capture_trimmed(&INVOICE_NUMBER_ONLINE, text)
            .or_else(|| capture_trimmed(&ORDER_NUMBER, text));
        if fields.invoice_number.is_none() {
            warnings.push(missing("invoice number"));
        }

        fields.invoice_date = captured_date(&INVOICE_DATE_ONLINE, text, &mut warnings);
        fields.order_date = captured_date(&ORDER_DATE_ONLINE, text, &mut warnings);
        if fields.invoice_date.is_none() && fields.order_date.is_none() {
            warnings.push(missing("invoice date"));
        }

        fields.customer_name =
            online_customer_name(text, &self.config.vendor_name, &mut warnings);

        // Web-shop orders are paid by card at checkout; the document states
        // neither, so both default here and explicit labels override.
        fields.payment_status =
            capture_trimmed(&PAYMENT_STATUS, text).or_else(|| Some("Payé".to_string()));
        fields.payment_method = Some("carte bancaire".to_string());

        fields.shipping = extract_shipping(text);

        extract_common(text, &mut fields);
        (fields, warnings)
    }
}

/// Extractor for deposit invoices; identity fields share the retail shapes.
pub struct DepositFieldExtractor {
    config: ExtractionConfig,
}

impl FieldExtractor for DepositFieldExtractor {
    fn extract(&self, unit: &InvoiceUnit) -> (FieldSet, Vec<String>) {
        let text = &unit.text;
        let mut fields = FieldSet::default();
        let mut warnings = Vec::new();

        fields.invoice_number = capture_trimmed(&INVOICE_NUMBER_RETAIL, text);
        if fields.invoice_number.is_none() {
            warnings.push(missing("invoice number"));
        }

        fields.invoice_date = captured_date(&INVOICE_DATE_RETAIL, text, &mut warnings);
        fields.customer_number = capture_trimmed(&CUSTOMER_NUMBER, text);
        fields.customer_name =
            retail_customer_name(text, &self.config.vendor_name, &mut warnings);

        extract_common(text, &mut fields);
        (fields, warnings)
    }
}

/// Fields shared by every layout: sale-channel codes, free-text comment,
/// payment status and an announced deposit installment.
fn extract_common(text: &str, fields: &mut FieldSet) {
    if let Some(m) = SALE_CHANNEL_CODE.find(text) {
        let code = m.as_str();
        let parts: Vec<&str> = code.split('.').collect();
        // Two-level prefix is always retained; the fully-qualified code
        // only when the third level is present.
        if parts.len() >= 2 {
            fields.sale_type = Some(format!("{}.{}", parts[0], parts[1]));
        }
        if parts.len() >= 3 {
            fields.sale_channel = Some(code.to_string());
        }
        debug!(code, "sale-channel code found");
    }

    if fields.comment.is_none() {
        fields.comment = capture_trimmed(&COMMENT, text);
    }
    if fields.payment_status.is_none() {
        fields.payment_status = capture_trimmed(&PAYMENT_STATUS, text);
    }

    if let Some(caps) = DEPOSIT_INSTALLMENT.captures(text) {
        if let Ok(amount) = super::rules::locale::parse_amount(&caps[1]) {
            let (due_date, _) = normalize_date(&caps[2]);
            fields.deposit_installment = Some(DepositInstallment { amount, due_date });
        }
    }
}

/// Retail customer name: the line following the account number, with the
/// vendor's own letterhead rejected as a false positive.
fn retail_customer_name(
    text: &str,
    vendor_name: &str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let caps = CUSTOMER_LINE_RETAIL.captures(text)?;
    accept_customer_name(caps[2].trim(), vendor_name, warnings)
}

/// Online customer name: the line under the "FACTURE" title, cleaned of
/// inline number/date labels the PDF extraction glues onto it.
fn online_customer_name(
    text: &str,
    vendor_name: &str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let caps = CUSTOMER_LINE_ONLINE.captures(text)?;
    let raw = caps[1].trim();

    let cleaned = CUSTOMER_TRAILING_LABEL.replace(raw, "");
    let cleaned = CUSTOMER_TRAILING_DATE.replace(&cleaned, "");
    accept_customer_name(cleaned.trim(), vendor_name, warnings)
}

fn accept_customer_name(
    candidate: &str,
    vendor_name: &str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    if candidate.is_empty() {
        return None;
    }
    if candidate.to_uppercase().contains(&vendor_name.to_uppercase()) {
        warnings.push(format!(
            "customer-name candidate {candidate:?} matches the vendor letterhead; rejected"
        ));
        return None;
    }
    Some(candidate.to_string())
}

/// Shipping fee: labelled amount with optional carrier, else a free
/// shipping or in-store pickup phrase at zero.
fn extract_shipping(text: &str) -> Option<ShippingFees> {
    if let Some(caps) = SHIPPING_FEE.captures(text) {
        if let Ok(amount) = super::rules::locale::parse_amount(&caps[1]) {
            let description = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| "Transport".to_string());
            return Some(ShippingFees {
                amount,
                description,
            });
        }
    }
    SHIPPING_FREE.find(text).map(|m| ShippingFees {
        amount: rust_decimal::Decimal::ZERO,
        description: m.as_str().trim().to_string(),
    })
}

fn capture_trimmed(pattern: &regex::Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|caps| caps[1].trim().to_string())
}

/// Capture a date and normalize it to ISO; an unrecognized shape passes
/// through unchanged with a warning.
fn captured_date(
    pattern: &regex::Regex,
    text: &str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let raw = capture_trimmed(pattern, text)?;
    let (normalized, recognized) = normalize_date(&raw);
    if !recognized {
        warnings.push(format!("date {raw:?} not normalized; kept as written"));
    }
    Some(normalized)
}

fn missing(field: &str) -> String {
    ExtractionError::MissingField(field.to_string()).to_string()
}

/// Normalize payment-method spellings the accounting export expects.
fn normalize_payment(value: String) -> String {
    let lower = value.to_lowercase();
    if lower.contains("chèque") || lower.contains("cheque") {
        "cheque".to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unit(text: &str) -> InvoiceUnit {
        InvoiceUnit {
            source: "test.pdf".to_string(),
            invoice_number: None,
            text: text.to_string(),
            warnings: Vec::new(),
        }
    }

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_retail_fields() {
        let text = "N° : FAC00000990\nDate : 19/02/2025\nN° client : CLT0042\nDupont Marie\nRèglement : Chèque bancaire\nCommentaire : livraison différée\n20.02.01";
        let extractor = field_extractor_for(DocumentVariant::StandardRetail, &config());
        let (fields, warnings) = extractor.extract(&unit(text));

        assert_eq!(fields.invoice_number.as_deref(), Some("FAC00000990"));
        assert_eq!(fields.invoice_date.as_deref(), Some("2025-02-19"));
        assert_eq!(fields.customer_number.as_deref(), Some("CLT0042"));
        assert_eq!(fields.customer_name.as_deref(), Some("Dupont Marie"));
        assert_eq!(fields.payment_method.as_deref(), Some("cheque"));
        assert_eq!(fields.comment.as_deref(), Some("livraison différée"));
        assert_eq!(fields.sale_type.as_deref(), Some("20.02"));
        assert_eq!(fields.sale_channel.as_deref(), Some("20.02.01"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_retail_rejects_vendor_letterhead() {
        let text = "N° : FAC001\nN° client : CLT0001\nNOMADS SARL";
        let extractor = field_extractor_for(DocumentVariant::StandardRetail, &config());
        let (fields, warnings) = extractor.extract(&unit(text));

        assert_eq!(fields.customer_name, None);
        assert!(warnings.iter().any(|w| w.contains("letterhead")));
    }

    #[test]
    fn test_online_fields_with_label_cleanup() {
        let text = "FACTURE\nTimon Mathieu N° de facture : 2025-02160\nN° de facture : 2025-02160\nDate de facture : 19 février 2025\nDate de commande : 12 février 2025";
        let extractor = field_extractor_for(DocumentVariant::OnlineOrder, &config());
        let (fields, _) = extractor.extract(&unit(text));

        assert_eq!(fields.invoice_number.as_deref(), Some("2025-02160"));
        assert_eq!(fields.customer_name.as_deref(), Some("Timon Mathieu"));
        assert_eq!(fields.invoice_date.as_deref(), Some("2025-02-19"));
        assert_eq!(fields.order_date.as_deref(), Some("2025-02-12"));
        assert_eq!(fields.payment_status.as_deref(), Some("Payé"));
        assert_eq!(fields.payment_method.as_deref(), Some("carte bancaire"));
    }

    #[test]
    fn test_online_falls_back_to_order_number() {
        let text = "FACTURE\nClient Un\nN° de commande : 4821";
        let extractor = field_extractor_for(DocumentVariant::OnlineOrder, &config());
        let (fields, _) = extractor.extract(&unit(text));

        assert_eq!(fields.invoice_number.as_deref(), Some("4821"));
    }

    #[test]
    fn test_online_shipping_fee() {
        let text = "FACTURE\nClient\nExpédition 6,90 € via Colissimo";
        let extractor = field_extractor_for(DocumentVariant::OnlineOrder, &config());
        let (fields, _) = extractor.extract(&unit(text));

        let shipping = fields.shipping.unwrap();
        assert_eq!(shipping.amount, rust_decimal::Decimal::new(690, 2));
        assert_eq!(shipping.description, "Colissimo");
    }

    #[test]
    fn test_online_free_shipping() {
        let text = "FACTURE\nClient\nLivraison gratuite";
        let extractor = field_extractor_for(DocumentVariant::OnlineOrder, &config());
        let (fields, _) = extractor.extract(&unit(text));

        let shipping = fields.shipping.unwrap();
        assert_eq!(shipping.amount, rust_decimal::Decimal::ZERO);
        assert_eq!(shipping.description, "Livraison gratuite");
    }

    #[test]
    fn test_deposit_installment_schedule() {
        let text = "N° : FAC010\nEchéance(s) Acompte de 1 500,00 € au 15/03/2025";
        let extractor = field_extractor_for(DocumentVariant::StandardRetail, &config());
        let (fields, _) = extractor.extract(&unit(text));

        let installment = fields.deposit_installment.unwrap();
        assert_eq!(installment.amount, rust_decimal::Decimal::new(150000, 2));
        assert_eq!(installment.due_date, "2025-03-15");
    }

    #[test]
    fn test_missing_fields_warn_and_default() {
        let extractor = field_extractor_for(DocumentVariant::StandardRetail, &config());
        let (fields, warnings) = extractor.extract(&unit("texte sans étiquettes"));

        assert_eq!(fields.invoice_number, None);
        assert!(warnings.iter().any(|w| w.contains("invoice number")));
        assert!(warnings.iter().any(|w| w.contains("invoice date")));
    }

    #[test]
    fn test_unrecognized_date_passes_through_with_warning() {
        let text = "FACTURE\nClient\nDate de facture : 19 fevrier2 2025";
        let extractor = field_extractor_for(DocumentVariant::OnlineOrder, &config());
        let (fields, warnings) = extractor.extract(&unit(text));

        assert_eq!(fields.invoice_date.as_deref(), Some("19 fevrier2 2025"));
        assert!(warnings.iter().any(|w| w.contains("not normalized")));
    }
}
