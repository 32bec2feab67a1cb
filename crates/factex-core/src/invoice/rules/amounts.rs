//! Document-level totals and discount extraction, per layout variant.

use rust_decimal::Decimal;
use tracing::debug;

use super::locale::parse_amount;
use super::patterns::*;
use crate::models::invoice::DocumentVariant;

/// A discount as it appeared in the source text, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountField {
    /// Euro amount, sign as written.
    Amount(Decimal),
    /// Percentage of the net total, sign as written.
    Percent(Decimal),
}

/// Totals as extracted from the text; `None` means the cascade for that
/// field was exhausted and reconciliation must derive it.
#[derive(Debug, Clone, Default)]
pub struct ExtractedTotals {
    pub net: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub gross: Option<Decimal>,
    pub discount: Option<DiscountField>,
}

/// Extract whatever totals the variant's labelled lines carry.
pub fn extract_totals(text: &str, variant: DocumentVariant) -> ExtractedTotals {
    let mut totals = match variant {
        DocumentVariant::OnlineOrder => extract_online_totals(text),
        DocumentVariant::Deposit => extract_deposit_totals(text),
        _ => extract_retail_totals(text),
    };

    totals.discount = extract_discount(text);
    totals
}

/// Online layout: one combined line, "Total 61,20 € (dont 10,20 € TVA)",
/// with a wrapped alternative when the PDF splits the labels out. Net is
/// always derived from the pair.
fn extract_online_totals(text: &str) -> ExtractedTotals {
    let mut totals = ExtractedTotals::default();

    let caps = TOTAL_PAIR_ONLINE
        .captures(text)
        .or_else(|| TOTAL_PAIR_ONLINE_WRAPPED.captures(text));

    if let Some(caps) = caps {
        if let (Ok(gross), Ok(tax)) = (parse_amount(&caps[1]), parse_amount(&caps[2])) {
            totals.gross = Some(gross);
            totals.tax = Some(tax);
            totals.net = Some(gross - tax);
            debug!(%gross, %tax, "online totals extracted from combined line");
        }
    }

    totals
}

/// Retail layout: one labelled line per total. Multi-page invoices repeat
/// partial tables, so the "Détail de la TVA" summary section is preferred
/// when present; loose label variants fill anything still missing.
fn extract_retail_totals(text: &str) -> ExtractedTotals {
    let mut totals = ExtractedTotals::default();

    // The summary section holds the authoritative figures.
    let section = text
        .split_once("Détail de la TVA")
        .map(|(_, after)| after);

    for scope in [section, Some(text)].into_iter().flatten() {
        if totals.net.is_none() {
            totals.net = capture_amount(&TOTAL_NET_RETAIL, scope);
        }
        if totals.tax.is_none() {
            totals.tax = capture_amount(&TOTAL_TAX_RETAIL, scope);
        }
        if totals.gross.is_none() {
            totals.gross = capture_amount(&TOTAL_GROSS_RETAIL, scope);
        }
        if totals.net.is_some() && totals.tax.is_some() && totals.gross.is_some() {
            break;
        }
    }

    if totals.net.is_none() {
        totals.net = capture_amount(&TOTAL_NET_LOOSE, text);
    }
    if totals.tax.is_none() {
        totals.tax = capture_amount(&TOTAL_TAX_LOOSE, text);
    }
    if totals.gross.is_none() {
        totals.gross = capture_amount(&TOTAL_GROSS_LOOSE, text);
    }

    totals
}

/// Deposit layout: several competing label families per total, cascaded.
fn extract_deposit_totals(text: &str) -> ExtractedTotals {
    let mut totals = ExtractedTotals::default();

    for pattern in DEPOSIT_GROSS_CASCADE.iter() {
        if let Some(amount) = capture_amount(pattern, text) {
            totals.gross = Some(amount);
            break;
        }
    }
    for pattern in DEPOSIT_TAX_CASCADE.iter() {
        if let Some(amount) = capture_amount(pattern, text) {
            totals.tax = Some(amount);
            break;
        }
    }
    for pattern in DEPOSIT_NET_CASCADE.iter() {
        if let Some(amount) = capture_amount(pattern, text) {
            totals.net = Some(amount);
            break;
        }
    }

    totals
}

/// Document-level discount: euro form, percentage form, then a bare number
/// treated as euros. Sign is preserved here; reconciliation stores the
/// magnitude.
fn extract_discount(text: &str) -> Option<DiscountField> {
    if let Some(caps) = DISCOUNT_AMOUNT.captures(text) {
        return parse_amount(&caps[1]).ok().map(DiscountField::Amount);
    }
    if let Some(caps) = DISCOUNT_PERCENT.captures(text) {
        return parse_amount(&caps[1]).ok().map(DiscountField::Percent);
    }
    if let Some(caps) = DISCOUNT_BARE.captures(text) {
        return parse_amount(&caps[1]).ok().map(DiscountField::Amount);
    }
    None
}

fn capture_amount(pattern: &regex::Regex, text: &str) -> Option<Decimal> {
    pattern
        .captures(text)
        .and_then(|caps| parse_amount(&caps[1]).ok())
}
