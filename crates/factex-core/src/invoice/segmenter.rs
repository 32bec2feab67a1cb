//! Page segmentation: grouping per-page texts into logical invoice units.

use tracing::{debug, warn};

use super::rules::patterns::{INVOICE_NUMBER_ONLINE, INVOICE_NUMBER_RETAIL};
use crate::error::ExtractionError;
use crate::models::unit::{InvoiceUnit, RawPage};

/// Separator preserving page breaks in the merged text.
const PAGE_SEPARATOR: &str = "\n\n";

/// Group a source document's pages into invoice units by continuity of the
/// invoice identifier.
///
/// Greedy forward scan: a page whose identifier equals the open unit's
/// identifier continues it; a different identifier closes the unit and
/// opens a new one; a page with no identifier continues the open unit (or
/// opens an identifier-less one). Empty pages are valid input and are
/// skipped. Interleaved invoices within one file cannot be resolved by
/// this policy; that is a documented limitation of the identifier-equality
/// join key, not an error.
///
/// An ambiguous continuation is flagged as a warning on the unit the page
/// was merged into.
pub fn segment(source: &str, pages: &[RawPage]) -> Vec<InvoiceUnit> {
    let mut units = Vec::new();
    let mut current_pages: Vec<&str> = Vec::new();
    let mut current_number: Option<String> = None;
    let mut current_warnings: Vec<String> = Vec::new();

    for page in pages {
        if page.text.trim().is_empty() {
            continue;
        }

        let page_number = page_invoice_number(&page.text);

        let continues = match (&current_number, &page_number) {
            (Some(open), Some(found)) => open == found,
            (_, None) => {
                if !current_pages.is_empty() {
                    warn!(
                        source,
                        page = page.index,
                        "page carries no invoice identifier; treating as continuation"
                    );
                    current_warnings.push(
                        ExtractionError::AmbiguousSegment(format!(
                            "page {} of {} has no invoice identifier; merged into {}",
                            page.index,
                            source,
                            current_number.as_deref().unwrap_or("(no identifier)")
                        ))
                        .to_string(),
                    );
                }
                !current_pages.is_empty()
            }
            (None, Some(_)) => false,
        };

        if continues {
            current_pages.push(&page.text);
        } else {
            if !current_pages.is_empty() {
                units.push(close_unit(
                    source,
                    current_number.take(),
                    &current_pages,
                    std::mem::take(&mut current_warnings),
                ));
                current_pages.clear();
            }
            current_number = page_number;
            current_pages.push(&page.text);
        }
    }

    if !current_pages.is_empty() {
        units.push(close_unit(
            source,
            current_number,
            &current_pages,
            current_warnings,
        ));
    }

    debug!(source, count = units.len(), "segmented pages into invoice units");
    units
}

/// Best-effort identifier extraction from a single page, variant-agnostic:
/// the retail shape is tried first, then the online shape.
fn page_invoice_number(text: &str) -> Option<String> {
    if let Some(caps) = INVOICE_NUMBER_RETAIL.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    if let Some(caps) = INVOICE_NUMBER_ONLINE.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    None
}

fn close_unit(
    source: &str,
    invoice_number: Option<String>,
    pages: &[&str],
    warnings: Vec<String>,
) -> InvoiceUnit {
    InvoiceUnit {
        source: source.to_string(),
        invoice_number,
        text: pages.join(PAGE_SEPARATOR),
        warnings,
    }
}
