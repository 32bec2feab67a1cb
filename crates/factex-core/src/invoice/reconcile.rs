//! Totals reconciliation: completing and cross-checking the three-way
//! net/tax/gross relationship.
//!
//! Extracted figures always win over derived ones; a derivation only fills
//! holes, and a disagreement beyond epsilon is reported as a warning, never
//! silently overwritten.

use rust_decimal::Decimal;
use tracing::debug;

use super::rules::amounts::{DiscountField, ExtractedTotals};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{amounts_close, DocumentVariant, LineItem, Totals};

/// Reconcile extracted totals against each other and the article lines.
///
/// Resolution order: labelled figures, then the third member of the
/// net + tax = gross identity, then the line-item sum, then the assumed
/// tax rate. Whatever is still unknown after that settles to zero.
pub fn reconcile(
    extracted: &ExtractedTotals,
    items: &[LineItem],
    variant: DocumentVariant,
    config: &ExtractionConfig,
) -> (Totals, Vec<String>) {
    let mut warnings = Vec::new();

    let mut net = extracted.net;
    let mut tax = extracted.tax;
    let mut gross = extracted.gross;

    // Identity completion: two known members determine the third.
    if let (Some(g), Some(t), None) = (gross, tax, net) {
        net = Some(g - t);
    }
    if let (Some(g), None, Some(n)) = (gross, tax, net) {
        tax = Some(g - n);
    }
    if let (None, Some(t), Some(n)) = (gross, tax, net) {
        gross = Some(n + t);
    }

    // Line-item aggregation fills remaining holes: the net is the sum of
    // line nets, the tax the sum of each line's net at its own rate, so
    // reduced rates (5.5%, 10%) survive the derivation.
    let items_net = (!items.is_empty())
        .then(|| items.iter().map(|i| i.net_amount).sum::<Decimal>());
    let items_tax = (!items.is_empty()).then(|| {
        items
            .iter()
            .map(|i| i.net_amount * i.tax_rate / Decimal::ONE_HUNDRED)
            .sum::<Decimal>()
            .round_dp(2)
    });
    if net.is_none() {
        net = items_net;
    }
    if tax.is_none() && gross.is_none() {
        tax = items_tax;
    }

    // Assumed-rate completion when only one member is known.
    match (gross, tax, net) {
        (Some(g), None, None) => {
            let n = (g / config.gross_factor()).round_dp(2);
            net = Some(n);
            tax = Some(g - n);
        }
        (None, None, Some(n)) => {
            let t = (n * config.default_tax_rate).round_dp(2);
            tax = Some(t);
            gross = Some(n + t);
        }
        (None, Some(t), None) => {
            let n = (t / config.default_tax_rate).round_dp(2);
            net = Some(n);
            gross = Some(n + t);
        }
        _ => {}
    }

    // A remaining single hole closes through the identity.
    if let (Some(g), Some(t), None) = (gross, tax, net) {
        net = Some(g - t);
    }
    if let (Some(g), None, Some(n)) = (gross, tax, net) {
        tax = Some(g - n);
    }
    if let (None, Some(t), Some(n)) = (gross, tax, net) {
        gross = Some(n + t);
    }

    let net = net.unwrap_or(Decimal::ZERO);
    let tax = tax.unwrap_or(Decimal::ZERO);
    let gross = gross.unwrap_or(Decimal::ZERO);

    // Cross-checks. The extracted figure stands; the disagreement is
    // surfaced for review.
    if let (Some(extracted_net), Some(derived)) = (extracted.net, items_net) {
        if !amounts_close(extracted_net, derived, config.amount_epsilon) {
            warnings.push(
                ExtractionError::ReconciliationConflict {
                    field: "net",
                    extracted: extracted_net,
                    derived,
                }
                .to_string(),
            );
        }
    }
    if !amounts_close(gross, net + tax, config.amount_epsilon) {
        warnings.push(
            ExtractionError::ReconciliationConflict {
                field: "gross",
                extracted: gross,
                derived: net + tax,
            }
            .to_string(),
        );
    }

    let discount = normalize_discount(extracted.discount, net);

    debug!(%variant, %net, %tax, %gross, %discount, "totals reconciled");
    (
        Totals {
            net,
            tax,
            gross,
            discount,
        },
        warnings,
    )
}

/// Discount normalization: the record stores a non-negative euro magnitude
/// regardless of the sign convention or unit in the source text.
fn normalize_discount(discount: Option<DiscountField>, net: Decimal) -> Decimal {
    match discount {
        Some(DiscountField::Amount(amount)) => amount.abs(),
        Some(DiscountField::Percent(percent)) => {
            (percent.abs() / Decimal::ONE_HUNDRED * net).round_dp(2)
        }
        None => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(net: &str) -> LineItem {
        item_at_rate(net, "20")
    }

    fn item_at_rate(net: &str, rate: &str) -> LineItem {
        LineItem {
            net_amount: dec(net),
            tax_rate: dec(rate),
            ..LineItem::default()
        }
    }

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_complete_extraction_passes_through() {
        let extracted = ExtractedTotals {
            net: Some(dec("100.00")),
            tax: Some(dec("20.00")),
            gross: Some(dec("120.00")),
            discount: None,
        };
        let (totals, warnings) =
            reconcile(&extracted, &[], DocumentVariant::StandardRetail, &config());

        assert_eq!(totals.net, dec("100.00"));
        assert_eq!(totals.tax, dec("20.00"));
        assert_eq!(totals.gross, dec("120.00"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_net_derived_from_identity() {
        let extracted = ExtractedTotals {
            net: None,
            tax: Some(dec("10.20")),
            gross: Some(dec("61.20")),
            discount: None,
        };
        let (totals, warnings) =
            reconcile(&extracted, &[], DocumentVariant::OnlineOrder, &config());

        assert_eq!(totals.net, dec("51.00"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_gross_derived_from_identity() {
        let extracted = ExtractedTotals {
            net: Some(dec("100.00")),
            tax: Some(dec("20.00")),
            gross: None,
            discount: None,
        };
        let (totals, warnings) =
            reconcile(&extracted, &[], DocumentVariant::StandardRetail, &config());

        assert_eq!(totals.gross, dec("120.00"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_gross_only_uses_assumed_rate() {
        let extracted = ExtractedTotals {
            gross: Some(dec("120.00")),
            ..ExtractedTotals::default()
        };
        let (totals, _) = reconcile(&extracted, &[], DocumentVariant::Deposit, &config());

        assert_eq!(totals.net, dec("100.00"));
        assert_eq!(totals.tax, dec("20.00"));
    }

    #[test]
    fn test_net_filled_from_line_items() {
        let extracted = ExtractedTotals::default();
        let items = [item("30.00"), item("21.00")];
        let (totals, _) = reconcile(&extracted, &items, DocumentVariant::OnlineOrder, &config());

        assert_eq!(totals.net, dec("51.00"));
        assert_eq!(totals.tax, dec("10.20"));
        assert_eq!(totals.gross, dec("61.20"));
    }

    #[test]
    fn test_tax_synthesized_at_each_item_rate() {
        // Reduced-rate articles must not be taxed at the assumed 20%.
        let items = [item_at_rate("60.00", "5.5"), item_at_rate("40.00", "5.5")];
        let (totals, warnings) = reconcile(
            &ExtractedTotals::default(),
            &items,
            DocumentVariant::StandardRetail,
            &config(),
        );

        assert_eq!(totals.net, dec("100.00"));
        assert_eq!(totals.tax, dec("5.50"));
        assert_eq!(totals.gross, dec("105.50"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_mixed_item_rates_sum_per_line() {
        let items = [item_at_rate("100.00", "20"), item_at_rate("100.00", "5.5")];
        let (totals, _) = reconcile(
            &ExtractedTotals::default(),
            &items,
            DocumentVariant::StandardRetail,
            &config(),
        );

        assert_eq!(totals.tax, dec("25.50"));
        assert_eq!(totals.gross, dec("225.50"));
    }

    #[test]
    fn test_nothing_extracted_settles_to_zero() {
        let (totals, warnings) = reconcile(
            &ExtractedTotals::default(),
            &[],
            DocumentVariant::StandardRetail,
            &config(),
        );

        assert_eq!(totals, Totals::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_item_sum_conflict_warns_and_extracted_wins() {
        let extracted = ExtractedTotals {
            net: Some(dec("100.00")),
            tax: Some(dec("20.00")),
            gross: Some(dec("120.00")),
            discount: None,
        };
        let items = [item("90.00")];
        let (totals, warnings) =
            reconcile(&extracted, &items, DocumentVariant::StandardRetail, &config());

        assert_eq!(totals.net, dec("100.00"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("reconciliation conflict on net"));
    }

    #[test]
    fn test_identity_violation_warns() {
        let extracted = ExtractedTotals {
            net: Some(dec("100.00")),
            tax: Some(dec("20.00")),
            gross: Some(dec("125.00")),
            discount: None,
        };
        let (totals, warnings) =
            reconcile(&extracted, &[], DocumentVariant::StandardRetail, &config());

        assert_eq!(totals.gross, dec("125.00"));
        assert!(warnings
            .iter()
            .any(|w| w.contains("reconciliation conflict on gross")));
    }

    #[test]
    fn test_sub_epsilon_rounding_accepted() {
        let extracted = ExtractedTotals {
            net: Some(dec("51.00")),
            tax: Some(dec("10.20")),
            gross: Some(dec("61.21")),
            discount: None,
        };
        let (_, warnings) = reconcile(&extracted, &[], DocumentVariant::OnlineOrder, &config());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_configured_epsilon_widens_tolerance() {
        let extracted = ExtractedTotals {
            net: Some(dec("100.00")),
            tax: Some(dec("20.00")),
            gross: Some(dec("120.04")),
            discount: None,
        };
        let config = ExtractionConfig::default().with_amount_epsilon(dec("0.05"));
        let (_, warnings) =
            reconcile(&extracted, &[], DocumentVariant::StandardRetail, &config);
        assert!(warnings.is_empty());

        let (_, warnings) = reconcile(
            &extracted,
            &[],
            DocumentVariant::StandardRetail,
            &ExtractionConfig::default(),
        );
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_discount_amount_stored_as_magnitude() {
        let extracted = ExtractedTotals {
            net: Some(dec("100.00")),
            tax: Some(dec("20.00")),
            gross: Some(dec("120.00")),
            discount: Some(DiscountField::Amount(dec("-10.00"))),
        };
        let (totals, _) = reconcile(&extracted, &[], DocumentVariant::OnlineOrder, &config());
        assert_eq!(totals.discount, dec("10.00"));
    }

    #[test]
    fn test_discount_percent_of_net() {
        let extracted = ExtractedTotals {
            net: Some(dec("200.00")),
            tax: Some(dec("40.00")),
            gross: Some(dec("240.00")),
            discount: Some(DiscountField::Percent(dec("5"))),
        };
        let (totals, _) = reconcile(&extracted, &[], DocumentVariant::StandardRetail, &config());
        assert_eq!(totals.discount, dec("10.00"));
    }
}
