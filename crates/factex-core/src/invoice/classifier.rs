//! Document variant classification.

use tracing::debug;

use crate::models::invoice::DocumentVariant;

/// Online-order markers. Highly specific to the web-shop layout, so they
/// are checked before the deposit marker: deposit language can co-occur
/// with either layout, but these phrases appear only on online orders.
const ONLINE_ORDER_MARKERS: [&str; 4] = [
    "UGS",
    "N° de commande",
    "Date de commande",
    "Livraison gratuite",
];

/// Deposit invoice marker phrase.
const DEPOSIT_MARKER: &str = "Facture d'acompte";

/// Classify a merged invoice text into its layout variant.
///
/// Pure function of the text: identical input always yields the same
/// variant. Legacy retail invoices carry no unique marker and are the
/// default. Never returns [`DocumentVariant::Unknown`].
pub fn classify(text: &str) -> DocumentVariant {
    let variant = if ONLINE_ORDER_MARKERS.iter().any(|m| text.contains(m)) {
        DocumentVariant::OnlineOrder
    } else if text.contains(DEPOSIT_MARKER) {
        DocumentVariant::Deposit
    } else {
        DocumentVariant::StandardRetail
    };

    debug!(%variant, "classified invoice text");
    variant
}
