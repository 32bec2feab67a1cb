//! Rule-based extraction machinery: pattern cascades and locale parsing.

pub mod amounts;
pub mod locale;
pub mod patterns;

pub use amounts::{extract_totals, DiscountField, ExtractedTotals};
pub use locale::{normalize_date, parse_amount, parse_localized_date};

use regex::{Captures, Regex};

/// A value produced by a pattern cascade.
#[derive(Debug, Clone)]
pub struct CascadeHit<T> {
    /// Extracted value.
    pub value: T,

    /// Zero-based index of the pattern that matched. Lower is more
    /// specific; useful for observability of which surface form fired.
    pub tier: usize,

    /// Source text that was matched.
    pub source: String,
}

impl<T> CascadeHit<T> {
    pub fn new(value: T, tier: usize, source: impl Into<String>) -> Self {
        Self {
            value,
            tier,
            source: source.into(),
        }
    }
}

/// Run an ordered cascade against `text` and return the captures of the
/// first pattern that matches, with its tier. Patterns are ordered from
/// most specific to most permissive; first match wins.
pub fn first_captures<'t>(cascade: &[Regex], text: &'t str) -> Option<(usize, Captures<'t>)> {
    cascade
        .iter()
        .enumerate()
        .find_map(|(tier, pattern)| pattern.captures(text).map(|caps| (tier, caps)))
}

/// Run a cascade and return the first capture group of the first matching
/// pattern, trimmed.
pub fn first_capture_text(cascade: &[Regex], text: &str) -> Option<CascadeHit<String>> {
    first_captures(cascade, text).map(|(tier, caps)| {
        let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        CascadeHit::new(caps[1].trim().to_string(), tier, matched)
    })
}
