//! French locale conversion: amounts and dates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ConversionError;

/// Parse a French-formatted amount ("1 234,56 €") into a decimal.
///
/// Strips the currency symbol, regular and non-breaking spaces, and turns
/// the decimal comma into a point. Non-numeric residue is a
/// `ConversionError`, never a panic.
pub fn parse_amount(text: &str) -> Result<Decimal, ConversionError> {
    let cleaned = text
        .replace('€', "")
        .replace([' ', '\u{00a0}'], "")
        .trim()
        .replace(',', ".");

    if cleaned.is_empty() {
        return Err(ConversionError::new("amount", text));
    }

    Decimal::from_str(&cleaned).map_err(|_| ConversionError::new("amount", text))
}

/// Parse one of the three supported date shapes into a `NaiveDate`.
///
/// Supported: `DD/MM/YYYY`, `DD <French month> YYYY`, and ISO
/// `YYYY-MM-DD`. Anything else yields `None`.
pub fn parse_localized_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    // DD/MM/YYYY
    if let Some((day, rest)) = text.split_once('/') {
        if let Some((month, year)) = rest.split_once('/') {
            return NaiveDate::from_ymd_opt(
                year.parse().ok()?,
                month.parse().ok()?,
                day.parse().ok()?,
            );
        }
    }

    // ISO pass-through
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    // "19 février 2025"
    let mut parts = text.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month = french_month_to_number(parts.next()?)?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize a date string to ISO `YYYY-MM-DD`.
///
/// Returns the ISO form and `true` when the shape was recognized, or the
/// original string unchanged and `false` otherwise so the caller can report
/// a warning without corrupting the data.
pub fn normalize_date(text: &str) -> (String, bool) {
    match parse_localized_date(text) {
        Some(date) => (date.format("%Y-%m-%d").to_string(), true),
        None => (text.to_string(), false),
    }
}

fn french_month_to_number(month: &str) -> Option<u32> {
    match month.to_lowercase().as_str() {
        "janvier" => Some(1),
        "février" | "fevrier" => Some(2),
        "mars" => Some(3),
        "avril" => Some(4),
        "mai" => Some(5),
        "juin" => Some(6),
        "juillet" => Some(7),
        "août" | "aout" => Some(8),
        "septembre" => Some(9),
        "octobre" => Some(10),
        "novembre" => Some(11),
        "décembre" | "decembre" => Some(12),
        _ => None,
    }
}
