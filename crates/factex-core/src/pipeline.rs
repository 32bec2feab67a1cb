//! Batch extraction pipeline: documents in, keyed records out.
//!
//! Documents are independent and process in parallel; units within a
//! document stay sequential because segmentation is a forward scan over
//! pages. A unit that panics is contained and reported as an error record,
//! never aborting the batch.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::invoice::rules::extract_totals;
use crate::invoice::{
    assemble, classify, error_record, field_extractor_for, line_item_parser_for, segment,
};
use crate::models::config::ExtractionConfig;
use crate::models::invoice::InvoiceRecord;
use crate::models::unit::{InvoiceUnit, SourceDocument};

/// The extraction pipeline, cheap to clone and safe to share across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: ExtractionConfig,
}

impl Pipeline {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Process one document: segment its pages, extract every unit, and
    /// key the records by `{source}_{invoice number}`.
    pub fn process_document(&self, document: &SourceDocument) -> BTreeMap<String, InvoiceRecord> {
        let units = segment(&document.name, &document.pages);

        let mut records = BTreeMap::new();
        for unit in units {
            let record = self.process_unit(&unit);

            let key = unit.key();
            if records.insert(key.clone(), record).is_some() {
                warn!(%key, "duplicate invoice key within document; later unit kept");
            }
        }

        debug!(
            source = %document.name,
            count = records.len(),
            "document processed"
        );
        records
    }

    /// Process a batch of documents in parallel and merge the per-document
    /// maps. Keys collide only if two files share a name.
    pub fn process_batch(&self, documents: &[SourceDocument]) -> BTreeMap<String, InvoiceRecord> {
        let merged = documents
            .par_iter()
            .map(|doc| self.process_document(doc))
            .reduce(BTreeMap::new, |mut acc, map| {
                for (key, record) in map {
                    if acc.insert(key.clone(), record).is_some() {
                        warn!(%key, "duplicate invoice key across documents; one record kept");
                    }
                }
                acc
            });

        info!(
            documents = documents.len(),
            records = merged.len(),
            "batch processed"
        );
        merged
    }

    /// Extract one unit, containing any panic as an error record.
    pub fn process_unit(&self, unit: &InvoiceUnit) -> InvoiceRecord {
        match catch_unwind(AssertUnwindSafe(|| self.extract_unit(unit))) {
            Ok(record) => record,
            Err(payload) => error_record(unit, panic_message(payload.as_ref())),
        }
    }

    fn extract_unit(&self, unit: &InvoiceUnit) -> InvoiceRecord {
        let variant = classify(&unit.text);

        // Segmentation notices travel with the unit they concern.
        let mut warnings = unit.warnings.clone();

        let (fields, field_warnings) = field_extractor_for(variant, &self.config).extract(unit);
        warnings.extend(field_warnings);

        let (items, item_warnings) = line_item_parser_for(variant, &self.config).parse(unit);
        warnings.extend(item_warnings);

        let extracted = extract_totals(&unit.text, variant);
        let (totals, totals_warnings) =
            crate::invoice::reconcile(&extracted, &items, variant, &self.config);
        warnings.extend(totals_warnings);

        assemble(unit, variant, fields, items, totals, warnings)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "extraction panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::DocumentVariant;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const RETAIL_PAGE: &str = "\
N° : FAC00000990
Date : 19/02/2025
N° client : CLT0042
Dupont Marie
LEPF-JONC00-5000 -Jonc de mer naturel
 2,00 125,00 € 0,00% 250,00 € 20,00%
Détail de la TVA
Total HT 250,00 €
TVA 50,00 €
Total TTC 300,00 €";

    const ONLINE_PAGE: &str = "\
FACTURE
Timon Mathieu
N° de facture : 2025-02160
Date de facture : 19 février 2025
Date de commande : 12 février 2025
Tapis jonc de mer
UGS : LEPF-JONC00
Tapis jonc de mer 2 30,00 €
Livraison gratuite
Total 61,20 € (dont 10,20 € TVA)";

    #[test]
    fn test_retail_end_to_end() {
        let doc = SourceDocument::from_texts("factures.pdf", [RETAIL_PAGE]);
        let records = Pipeline::default().process_document(&doc);

        let record = &records["factures.pdf_FAC00000990"];
        assert_eq!(record.variant, DocumentVariant::StandardRetail);
        assert_eq!(record.customer_name, "Dupont Marie");
        assert_eq!(record.invoice_date, "2025-02-19");
        assert_eq!(record.totals.net, dec("250.00"));
        assert_eq!(record.totals.gross, dec("300.00"));
        assert_eq!(record.line_items.len(), 1);
        assert_eq!(record.item_count, dec("2.00"));
        assert_eq!(record.error, None);
    }

    #[test]
    fn test_online_end_to_end() {
        let doc = SourceDocument::from_texts("web.pdf", [ONLINE_PAGE]);
        let records = Pipeline::default().process_document(&doc);

        let record = &records["web.pdf_2025-02160"];
        assert_eq!(record.variant, DocumentVariant::OnlineOrder);
        assert_eq!(record.customer_name, "Timon Mathieu");
        assert_eq!(record.payment_status, "Payé");
        assert_eq!(record.payment_method, "carte bancaire");
        assert_eq!(record.shipping.amount, Decimal::ZERO);
        assert_eq!(record.totals.gross, dec("61.20"));
        assert_eq!(record.totals.net, dec("51.00"));
        assert_eq!(record.line_items.len(), 1);
        assert_eq!(record.line_items[0].unit_price, dec("25.00"));
    }

    #[test]
    fn test_multipage_document_yields_two_records() {
        let doc = SourceDocument::from_texts(
            "lot.pdf",
            [
                "N° : FAC001\nDate : 01/02/2025\nTotal TTC 120,00 €",
                "N° : FAC001\nsuite",
                "N° : FAC002\nDate : 02/02/2025\nTotal TTC 240,00 €",
            ],
        );
        let records = Pipeline::default().process_document(&doc);

        assert_eq!(records.len(), 2);
        assert!(records.contains_key("lot.pdf_FAC001"));
        assert!(records.contains_key("lot.pdf_FAC002"));
        assert_eq!(records["lot.pdf_FAC002"].totals.gross, dec("240.00"));
    }

    #[test]
    fn test_batch_merges_documents() {
        let docs = vec![
            SourceDocument::from_texts("a.pdf", [RETAIL_PAGE]),
            SourceDocument::from_texts("b.pdf", [ONLINE_PAGE]),
        ];
        let records = Pipeline::default().process_batch(&docs);

        assert_eq!(records.len(), 2);
        assert!(records.contains_key("a.pdf_FAC00000990"));
        assert!(records.contains_key("b.pdf_2025-02160"));
    }

    #[test]
    fn test_deposit_end_to_end() {
        let text = "\
Facture d'acompte
N° : FAC010
Date : 05/03/2025
N° client : CLT0007
Martin Paul
Prestation : Pose parquet salon
TOTAL ACOMPTE 600,00 €
dont TVA 100,00 €";
        let doc = SourceDocument::from_texts("acompte.pdf", [text]);
        let records = Pipeline::default().process_document(&doc);

        let record = &records["acompte.pdf_FAC010"];
        assert_eq!(record.variant, DocumentVariant::Deposit);
        assert_eq!(record.totals.gross, dec("600.00"));
        assert_eq!(record.totals.tax, dec("100.00"));
        assert_eq!(record.totals.net, dec("500.00"));
        assert_eq!(record.line_items[0].description, "Pose parquet salon");
    }

    #[test]
    fn test_segmentation_warning_only_on_merged_record() {
        let doc = SourceDocument::from_texts(
            "lot.pdf",
            [
                "N° : FAC001\nDate : 01/02/2025\nTotal TTC 120,00 €",
                "suite sans numéro",
                "N° : FAC002\nDate : 02/02/2025\nTotal TTC 240,00 €",
            ],
        );
        let records = Pipeline::default().process_document(&doc);

        assert!(records["lot.pdf_FAC001"]
            .warnings
            .iter()
            .any(|w| w.contains("ambiguous page continuation")));
        assert!(!records["lot.pdf_FAC002"]
            .warnings
            .iter()
            .any(|w| w.contains("ambiguous page continuation")));
    }

    #[test]
    fn test_empty_document_yields_no_records() {
        let doc = SourceDocument::from_texts("vide.pdf", ["", "   "]);
        let records = Pipeline::default().process_document(&doc);
        assert!(records.is_empty());
    }
}
