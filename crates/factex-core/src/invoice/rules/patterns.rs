//! Regex pattern tables for French invoice extraction.
//!
//! Cascaded fields keep their patterns in slice constants ordered from most
//! specific to most permissive; extraction stops at the first match. A new
//! pattern must be inserted at the position matching its specificity, not
//! appended blindly.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice identifiers. The retail form is a bare alphanumeric code
    // after "N° :"; the online form is a full labelled line.
    pub static ref INVOICE_NUMBER_RETAIL: Regex =
        Regex::new(r"N°\s*:\s*([A-Z0-9]+)").unwrap();

    pub static ref INVOICE_NUMBER_ONLINE: Regex =
        Regex::new(r"N° de facture\s*:\s*([^\n]+)").unwrap();

    pub static ref ORDER_NUMBER: Regex =
        Regex::new(r"N°\s*(?:de\s*)?commande\s*:\s*(\d+)").unwrap();

    // Dates. Retail invoices use DD/MM/YYYY; online invoices spell the
    // month out ("19 février 2025").
    pub static ref INVOICE_DATE_RETAIL: Regex =
        Regex::new(r"Date\s*:\s*(\d{2}/\d{2}/\d{4})").unwrap();

    pub static ref INVOICE_DATE_ONLINE: Regex =
        Regex::new(r"Date de facture\s*:\s*(\d{1,2}\s+\w+\s+\d{4})").unwrap();

    pub static ref ORDER_DATE_ONLINE: Regex =
        Regex::new(r"Date de commande\s*:\s*(\d{1,2}\s+\w+\s+\d{4})").unwrap();

    // Customer identification. On retail layouts the customer name is the
    // line following the account number; on online layouts it is the line
    // following the "FACTURE" title, polluted by inline labels.
    pub static ref CUSTOMER_NUMBER: Regex =
        Regex::new(r"N°\s*client\s*:\s*(CLT\d+)").unwrap();

    pub static ref CUSTOMER_LINE_RETAIL: Regex =
        Regex::new(r"N° client\s*:\s*([A-Za-z0-9]+)\s*\n([^\n]+)").unwrap();

    pub static ref CUSTOMER_LINE_ONLINE: Regex =
        Regex::new(r"FACTURE\s*\n([^\n]+)").unwrap();

    pub static ref CUSTOMER_TRAILING_LABEL: Regex =
        Regex::new(r"N°\s*(?:de)?\s*(?:facture|commande)\s*:.*$").unwrap();

    pub static ref CUSTOMER_TRAILING_DATE: Regex =
        Regex::new(r"\s*Date\s.*$").unwrap();

    // Sale-channel code family: two mandatory levels "20.XX" plus an
    // optional third level "20.XX.YY".
    pub static ref SALE_CHANNEL_CODE: Regex =
        Regex::new(r"20\.(?:0[1-9]|10)(?:\.\d{2})?").unwrap();

    // Free-text attributes.
    pub static ref COMMENT: Regex =
        Regex::new(r"Commentaire\s*:\s*([^\n]+)").unwrap();

    pub static ref PAYMENT_STATUS: Regex =
        Regex::new(r"Statut paiement\s*:\s*([^\n]+)").unwrap();

    pub static ref PAYMENT_METHOD: Regex =
        Regex::new(r"Règlement\s*:?\s*([^\n]+)").unwrap();

    // Online totals: "Total 61,20 € (dont 10,20 € TVA)", with an alternate
    // shape where PDF wrapping pushes the labels onto their own lines.
    pub static ref TOTAL_PAIR_ONLINE: Regex =
        Regex::new(r"Total\s+([\d\s]+[.,]\d{2})\s*€\s*\(dont\s+([\d\s]+[.,]\d{2})\s*€\s*TVA\)")
            .unwrap();

    pub static ref TOTAL_PAIR_ONLINE_WRAPPED: Regex =
        Regex::new(r"([\d\s]+[.,]\d{2})\s*€\s*\(dont\s+([\d\s]+[.,]\d{2})\s*€\s*\nTotal\s*\nTVA\)")
            .unwrap();

    // Retail totals, one labelled line each.
    pub static ref TOTAL_NET_RETAIL: Regex =
        Regex::new(r"Total HT\s+([\d\s]+[.,]\d{2})\s*€").unwrap();

    pub static ref TOTAL_TAX_RETAIL: Regex =
        Regex::new(r"TVA\s+([\d\s]+[.,]\d{2})\s*€").unwrap();

    pub static ref TOTAL_GROSS_RETAIL: Regex =
        Regex::new(r"Total TTC\s+([\d\s]+[.,]\d{2})\s*€").unwrap();

    // Permissive retail fallbacks tolerating abbreviations and wrapped
    // labels ("Montant H.T. ... 100,00 €").
    pub static ref TOTAL_NET_LOOSE: Regex =
        Regex::new(r"(?i)(?:Total|Montant)\s+(?:HT|H\.T\.)\D*([\d\s]+[.,]\d{2})\s*€").unwrap();

    pub static ref TOTAL_TAX_LOOSE: Regex =
        Regex::new(r"(?i)(?:TVA|T\.V\.A\.)\D*([\d\s]+[.,]\d{2})\s*€").unwrap();

    pub static ref TOTAL_GROSS_LOOSE: Regex =
        Regex::new(r"(?i)(?:Total|Montant)\s+(?:TTC|T\.T\.C\.)\D*([\d\s]+[.,]\d{2})\s*€").unwrap();

    // Document-level discounts: euro amount, percentage, or a bare number.
    pub static ref DISCOUNT_AMOUNT: Regex =
        Regex::new(r"(?i)Remise\s+(?:totale|globale)?\s*:?\s*(-?[\d\s]+[.,]\d{2})\s*€").unwrap();

    pub static ref DISCOUNT_PERCENT: Regex =
        Regex::new(r"(?i)Remise\s+(-?\d+(?:[.,]\d+)?)\s*%").unwrap();

    pub static ref DISCOUNT_BARE: Regex =
        Regex::new(r"(?i)Remise\s+(-?\d+)").unwrap();

    // Shipping fees (online orders): labelled amount with an optional
    // carrier after "via", else a free-shipping phrase.
    pub static ref SHIPPING_FEE: Regex = Regex::new(
        r"(?i)(?:Expédition|Livraison|Frais\s+d[e']\s?expédition)\s+([\d\s]+[.,]\d{2})\s*€\s*(?:\(TTC\))?\s*(?:via\s+([^\n]+))?"
    )
    .unwrap();

    pub static ref SHIPPING_FREE: Regex =
        Regex::new(r"(?i)Livraison\s+gratuite|Retrait\s+en\s+magasin").unwrap();

    // Deposit installment schedule (appears on retail invoices announcing
    // a deposit): "Echéance(s) Acompte de 500,00 € au 15/03/2025".
    pub static ref DEPOSIT_INSTALLMENT: Regex = Regex::new(
        r"Echéance\(s\)\s*Acompte\s*de\s*(\d+[\s\d]*,\d+)\s*€\s*au\s*(\d{2}/\d{2}/\d{4})"
    )
    .unwrap();

    // Retail article line, spanning PDF line wraps: reference, description,
    // quantity, unit price, discount %, net amount, tax %. Two reference
    // shapes exist: structured "XXXX-XXXXXX-XXXX" and legacy "ARTnnnn".
    pub static ref ITEM_RETAIL: Regex = Regex::new(
        r"(?s)([A-Z0-9]+-[A-Z0-9]+-[A-Z0-9]+)\s*-([^\n]+?)\s+(\d+,\d+)\s+(\d+[\s\d]*,\d+)\s*€\s+(\d+,\d+)%\s+(\d+[\s\d]*,\d+)\s*€\s+(\d+,\d+)%"
    )
    .unwrap();

    pub static ref ITEM_RETAIL_LEGACY: Regex = Regex::new(
        r"(?s)ART(\d+)\s*-\s*([^\n]+?)\s*(\d+,\d+)\s*(\d+[\s\d]*,\d+)\s*€\s*(\d+,\d+)%\s*(\d+[\s\d]*,\d+)\s*€\s*(\d+,\d+)%"
    )
    .unwrap();

    // Online article block: a description line followed by its SKU label.
    pub static ref ITEM_ONLINE_BLOCK: Regex =
        Regex::new(r"([A-Za-z0-9-]+(?:[^\n]+)?)\nUGS\s*:\s*([^\n]+)\n").unwrap();

    // Tier-1 online fallback: "description qty price €" on one line.
    pub static ref ITEM_ONLINE_INLINE: Regex =
        Regex::new(r"([^\d]+)\s+(\d+)\s+([\d\s]+[,.]\d+)\s*€").unwrap();

    // Tier-2 online fallback: a bare "qty price €" pair in the window
    // around the item block.
    pub static ref ITEM_ONLINE_CONTEXT_PAIR: Regex =
        Regex::new(r"(\d+)\s+([\d\s]+[,.]\d+)\s*€").unwrap();

    // Simple euro amount, last resort for an item's price.
    pub static ref PRICE_SIMPLE: Regex =
        Regex::new(r"([\d\s]+[,.]\d+)\s*€").unwrap();

    // Deposit reference.
    pub static ref DEPOSIT_REFERENCE: Regex =
        Regex::new(r"(?i)R[ée]f[ée]rence\s*:\s*([^\n]+)").unwrap();

    // Deposit net amount.
    pub static ref DEPOSIT_NET: Regex =
        Regex::new(r"(?i)TOTAL\s+HT\s+(?:ACOMPTE\s+)?(\d+[\s\d]*[.,]\d{2})\s*€").unwrap();
}

lazy_static! {
    // Deposit total cascades, tried in order.
    pub static ref DEPOSIT_GROSS_CASCADE: Vec<Regex> = vec![
        Regex::new(r"(?i)TOTAL\s+(?:ACOMPTE|TTC)\s+(\d+[\s\d]*[,.]\d{2})\s*€").unwrap(),
        Regex::new(r"(?i)Total\s+TTC\s+(\d+[\s\d]*[,.]\d{2})\s*€").unwrap(),
        Regex::new(r"(?i)MONTANT\s+(?:A\s+PAYER|ACOMPTE)\s+(?:TTC)?\s*(?::\s*)?(\d+[\s\d]*[,.]\d{2})\s*€")
            .unwrap(),
    ];

    pub static ref DEPOSIT_TAX_CASCADE: Vec<Regex> = vec![
        Regex::new(r"(?i)dont\s+TVA\s+(\d+[\s\d]*[,.]\d{2})\s*€").unwrap(),
        Regex::new(r"(?i)TVA\s+\d+[,.]\d+%\s+(\d+[\s\d]*[,.]\d{2})\s*€").unwrap(),
        Regex::new(r"(?i)T\.?V\.?A\.?\s+(\d+[\s\d]*[,.]\d{2})\s*€").unwrap(),
        Regex::new(r"(?i)Montant\s+TVA\s+(\d+[\s\d]*[,.]\d{2})\s*€").unwrap(),
    ];

    pub static ref DEPOSIT_NET_CASCADE: Vec<Regex> = vec![
        Regex::new(r"(?i)Total\s+HT\s+(?:ACOMPTE\s+)?(\d+[\s\d]*[,.]\d{2})\s*€").unwrap(),
        Regex::new(r"(?i)Montant\s+HT\s+(\d+[\s\d]*[,.]\d{2})\s*€").unwrap(),
    ];

    // Deposit description labels, most specific first; the generic default
    // "Acompte sur commande" applies when none match.
    pub static ref DEPOSIT_DESCRIPTION_CASCADE: Vec<Regex> = vec![
        Regex::new(r"(?i)Prestation\s*:\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)Désignation\s*:\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)Libellé\s*:\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)Descriptif\s*:\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)Description\s*:\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)Matériel\s*:\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)([^\.\n]+?)\s*Règlement\s*:").unwrap(),
        Regex::new(r"(?i)ACOMPTE\s*(sur\s*[^\n]+)").unwrap(),
    ];

    // Per-item quantity labels for online articles.
    pub static ref QUANTITY_CASCADE: Vec<Regex> = vec![
        Regex::new(r"(?i)Quantité\s*:\s*(\d+)").unwrap(),
        Regex::new(r"(?i)Quantité\s*[×x]\s*(\d+)").unwrap(),
        Regex::new(r"(?i)(\d+)\s*article\(s\)").unwrap(),
        Regex::new(r"(?i)(\d+)\s*×").unwrap(),
        Regex::new(r"(?i)Qté\s*:?\s*(\d+)").unwrap(),
    ];

    // Document-level article counts, used when a single online item has no
    // quantity of its own.
    pub static ref GLOBAL_QUANTITY_CASCADE: Vec<Regex> = vec![
        Regex::new(r"(?i)Nombre d'articles\s*:\s*(\d+)").unwrap(),
        Regex::new(r"(?i)Total\s*:\s*(\d+)\s*article").unwrap(),
        Regex::new(r"(?i)Articles\s*:\s*(\d+)").unwrap(),
        Regex::new(r"(?i)(\d+)\s*articles?\s").unwrap(),
    ];

    // Per-item price labels for online articles.
    pub static ref ITEM_PRICE_CASCADE: Vec<Regex> = vec![
        Regex::new(r"(?i)Prix\s*TTC\s*:\s*([\d\s]+[,.]\d{2})\s*€").unwrap(),
        Regex::new(r"(?i)Prix\s*unitaire\s*:\s*([\d\s]+[,.]\d{2})\s*€").unwrap(),
        Regex::new(r"(?i)Prix\s*:\s*([\d\s]+[,.]\d{2})\s*€").unwrap(),
    ];
}
