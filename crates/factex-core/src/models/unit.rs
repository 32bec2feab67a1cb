//! Raw pages, source documents and segmented invoice units.

use serde::{Deserialize, Serialize};

/// A single page of text handed over by the PDF-text collaborator.
///
/// Ephemeral: produced at the input boundary and consumed once by the page
/// segmenter. Empty-text pages are valid and are skipped during segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    /// Zero-based page index within the source document.
    pub index: usize,

    /// Raw extracted text of the page.
    pub text: String,
}

impl RawPage {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// A source document: one file name plus its extracted pages, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Source file name, used to build the stable invoice key.
    pub name: String,

    /// Per-page extracted text in page order.
    pub pages: Vec<RawPage>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, pages: Vec<RawPage>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }

    /// Build a document from plain page texts, indexing them in order.
    pub fn from_texts<I, S>(name: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, t)| RawPage::new(i, t))
            .collect();
        Self::new(name, pages)
    }
}

/// A contiguous run of pages sharing one invoice identifier.
///
/// Created by the page segmenter and consumed exactly once downstream;
/// never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceUnit {
    /// Name of the source file this unit came from.
    pub source: String,

    /// Invoice identifier found on the pages, if any.
    pub invoice_number: Option<String>,

    /// Merged text of all pages, joined with a page-break separator.
    pub text: String,

    /// Segmentation notices concerning this unit, carried onto its record.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl InvoiceUnit {
    /// Stable key for the output map: source name plus identifier when one
    /// was found, source name alone otherwise.
    pub fn key(&self) -> String {
        match &self.invoice_number {
            Some(num) => format!("{}_{}", self.source, num),
            None => self.source.clone(),
        }
    }
}
