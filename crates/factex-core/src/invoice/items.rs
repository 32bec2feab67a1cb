//! Variant-aware line-item parsing.
//!
//! Retail layouts carry a full article table and parse in one pass. Online
//! layouts only guarantee the description and SKU; quantity and price fall
//! through a three-tier degradation, each tier logged, the last warned.
//! Deposit invoices carry no article table at all and synthesize a single
//! line from the labelled prose.

use rust_decimal::Decimal;
use tracing::debug;

use super::rules::first_capture_text;
use super::rules::locale::parse_amount;
use super::rules::patterns::*;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{DocumentVariant, LineItem};
use crate::models::unit::InvoiceUnit;

/// Per-variant article-line parsing capability.
pub trait LineItemParser: Send + Sync {
    /// Parse the unit's article lines, collecting warnings for degraded
    /// fallbacks.
    fn parse(&self, unit: &InvoiceUnit) -> (Vec<LineItem>, Vec<String>);
}

/// Select the parser for a classified variant.
pub fn line_item_parser_for(
    variant: DocumentVariant,
    config: &ExtractionConfig,
) -> Box<dyn LineItemParser> {
    match variant {
        DocumentVariant::OnlineOrder => Box::new(OnlineLineItemParser {
            config: config.clone(),
        }),
        DocumentVariant::Deposit => Box::new(DepositLineItemParser {
            config: config.clone(),
        }),
        _ => Box::new(RetailLineItemParser),
    }
}

/// Retail article table: one structured row per article, with both the
/// current reference shape and the legacy "ARTnnnn" shape.
pub struct RetailLineItemParser;

impl LineItemParser for RetailLineItemParser {
    fn parse(&self, unit: &InvoiceUnit) -> (Vec<LineItem>, Vec<String>) {
        let text = &unit.text;
        let mut items = Vec::new();
        let mut warnings = Vec::new();

        for caps in ITEM_RETAIL.captures_iter(text) {
            match retail_row(&caps, caps[1].to_string()) {
                Some(item) => items.push(item),
                None => warnings.push(skipped_row(&caps[1])),
            }
        }
        for caps in ITEM_RETAIL_LEGACY.captures_iter(text) {
            let reference = format!("ART{}", &caps[1]);
            match retail_row(&caps, reference.clone()) {
                Some(item) => items.push(item),
                None => warnings.push(skipped_row(&reference)),
            }
        }

        debug!(source = %unit.source, count = items.len(), "retail article rows parsed");
        (items, warnings)
    }
}

fn skipped_row(reference: &str) -> String {
    format!("article row {reference} had unparsable numeric columns; skipped")
}

/// Build a line item from a retail table row; columns after the reference
/// are identical across both reference shapes.
fn retail_row(caps: &regex::Captures<'_>, reference: String) -> Option<LineItem> {
    let quantity = parse_amount(&caps[3]).ok()?;
    let unit_price = parse_amount(&caps[4]).ok()?;
    let discount_percent = parse_amount(&caps[5]).ok()?;
    let net_amount = parse_amount(&caps[6]).ok()?;
    let tax_rate = parse_amount(&caps[7]).ok()?;

    Some(LineItem {
        reference,
        description: caps[2].trim().to_string(),
        quantity,
        unit_price,
        unit_price_gross: None,
        discount_rate: discount_percent / Decimal::ONE_HUNDRED,
        net_amount,
        tax_rate,
    })
}

/// Online article blocks: each article is a description line followed by
/// its SKU label. Quantity and price degrade through three tiers:
///
/// 1. an inline "description qty price €" line inside the block window,
/// 2. labelled quantity/price cascades scanned over the block window,
///    falling back to the document-level article count,
/// 3. an even split of the document gross across the blocks (warned).
pub struct OnlineLineItemParser {
    config: ExtractionConfig,
}

impl LineItemParser for OnlineLineItemParser {
    fn parse(&self, unit: &InvoiceUnit) -> (Vec<LineItem>, Vec<String>) {
        let text = &unit.text;
        let mut warnings = Vec::new();

        // Block boundaries: from each match start to the next match start.
        let blocks: Vec<(usize, String, String)> = ITEM_ONLINE_BLOCK
            .captures_iter(text)
            .filter_map(|caps| {
                let start = caps.get(0)?.start();
                Some((
                    start,
                    caps[2].trim().to_string(),
                    caps[1].trim().to_string(),
                ))
            })
            .collect();

        if blocks.is_empty() {
            return (Vec::new(), warnings);
        }

        // The totals line bounds the last block's window; a bare amount
        // found past it would be the document total, not an item price.
        let totals_start = TOTAL_PAIR_ONLINE
            .find(text)
            .or_else(|| TOTAL_PAIR_ONLINE_WRAPPED.find(text))
            .map(|m| m.start());

        let mut items = Vec::new();
        for (i, (start, sku, description)) in blocks.iter().enumerate() {
            let mut end = blocks
                .get(i + 1)
                .map(|(next, _, _)| *next)
                .unwrap_or(text.len());
            if let Some(ts) = totals_start {
                if ts > *start && ts < end {
                    end = ts;
                }
            }
            let window = &text[*start..end];

            let (quantity, gross_price, tier) =
                self.resolve_block(window, text, blocks.len() == 1);
            match tier {
                3 => warnings.push(format!(
                    "article {sku}: no quantity or price found; document total split evenly"
                )),
                t => debug!(sku = %sku, tier = t, "online article resolved"),
            }

            let gross_price = match tier {
                3 => even_split_price(text, blocks.len()),
                _ => gross_price,
            };

            let unit_price = (gross_price / self.config.gross_factor()).round_dp(2);
            items.push(LineItem {
                reference: sku.clone(),
                description: description.clone(),
                quantity,
                unit_price,
                unit_price_gross: Some(gross_price),
                discount_rate: Decimal::ZERO,
                net_amount: (unit_price * quantity).round_dp(2),
                tax_rate: self.config.default_tax_percent(),
            });
        }

        (items, warnings)
    }
}

impl OnlineLineItemParser {
    /// Resolve an article block's quantity and tax-inclusive price,
    /// returning the degradation tier used. The document-level article
    /// count is only trustworthy when the document has a single article.
    fn resolve_block(&self, window: &str, document: &str, sole_item: bool) -> (Decimal, Decimal, u8) {
        // Tier 1: inline "description qty price" within the block.
        if let Some(caps) = ITEM_ONLINE_INLINE.captures(window) {
            if let (Ok(qty), Ok(price)) = (parse_amount(&caps[2]), parse_amount(&caps[3])) {
                if qty > Decimal::ZERO && price > Decimal::ZERO {
                    return (qty, price, 1);
                }
            }
        }

        // Tier 2: labelled cascades over the window, with the document-level
        // article count covering a missing per-item quantity.
        let quantity = first_capture_text(&QUANTITY_CASCADE, window)
            .or_else(|| {
                sole_item
                    .then(|| first_capture_text(&GLOBAL_QUANTITY_CASCADE, document))
                    .flatten()
            })
            .and_then(|hit| parse_amount(&hit.value).ok());

        let price = first_capture_text(&ITEM_PRICE_CASCADE, window)
            .and_then(|hit| parse_amount(&hit.value).ok())
            .or_else(|| bare_price(window));

        match (quantity, price) {
            (Some(qty), Some(price)) => (qty, price, 2),
            (None, Some(price)) => (Decimal::ONE, price, 2),
            _ => (Decimal::ONE, Decimal::ZERO, 3),
        }
    }
}

/// A bare euro amount inside the block window, ignoring the SKU line.
fn bare_price(window: &str) -> Option<Decimal> {
    ITEM_ONLINE_CONTEXT_PAIR
        .captures(window)
        .and_then(|caps| parse_amount(&caps[2]).ok())
        .or_else(|| {
            PRICE_SIMPLE
                .captures(window)
                .and_then(|caps| parse_amount(&caps[1]).ok())
        })
}

/// Last-resort price: the document gross split evenly across the blocks.
fn even_split_price(text: &str, block_count: usize) -> Decimal {
    let gross = TOTAL_PAIR_ONLINE
        .captures(text)
        .or_else(|| TOTAL_PAIR_ONLINE_WRAPPED.captures(text))
        .and_then(|caps| parse_amount(&caps[1]).ok())
        .unwrap_or(Decimal::ZERO);

    if block_count == 0 {
        return Decimal::ZERO;
    }
    (gross / Decimal::from(block_count as u64)).round_dp(2)
}

/// Deposit invoices have no article table; a single line is synthesized
/// from the labelled prose.
pub struct DepositLineItemParser {
    config: ExtractionConfig,
}

impl LineItemParser for DepositLineItemParser {
    fn parse(&self, unit: &InvoiceUnit) -> (Vec<LineItem>, Vec<String>) {
        let text = &unit.text;
        let mut warnings = Vec::new();

        let description = first_capture_text(&DEPOSIT_DESCRIPTION_CASCADE, text)
            .map(|hit| hit.value.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| {
                warnings.push("deposit description not found; generic label used".to_string());
                "Acompte sur commande".to_string()
            });

        let reference = DEPOSIT_REFERENCE
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_else(|| "ACOMPTE".to_string());

        // Net amount: labelled HT line first, else derived from the gross.
        let net = DEPOSIT_NET
            .captures(text)
            .and_then(|caps| parse_amount(&caps[1]).ok())
            .or_else(|| {
                first_capture_text(&DEPOSIT_GROSS_CASCADE, text)
                    .and_then(|hit| parse_amount(&hit.value).ok())
                    .map(|gross| (gross / self.config.gross_factor()).round_dp(2))
            })
            .unwrap_or(Decimal::ZERO);

        let item = LineItem {
            reference,
            description,
            quantity: Decimal::ONE,
            unit_price: net,
            unit_price_gross: None,
            discount_rate: Decimal::ZERO,
            net_amount: net,
            tax_rate: self.config.default_tax_percent(),
        };

        (vec![item], warnings)
    }
}
