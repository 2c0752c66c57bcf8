//! Weighted signature tables for format and subtype classification.
//!
//! Read-only process-wide data. Weights: ~40 for marketplace anchors,
//! 20-25 for currency symbols and layout keywords, 15 for month names.
//! Scoring is case-insensitive substring presence; each distinct token
//! contributes its weight once, not per occurrence.

use lazy_static::lazy_static;
use regex::Regex;

/// Signatures for the US-domestic layout family.
pub const DOMESTIC_SIGNATURES: &[(&str, u32)] = &[
    ("amazon.com", 40),
    ("order placed", 25),
    ("grand total", 20),
    ("order total", 20),
    ("ship to", 20),
    ("items ordered", 20),
    ("$", 20),
    ("january", 15),
    ("february", 15),
    ("march", 15),
    ("april", 15),
    ("may", 15),
    ("june", 15),
    ("july", 15),
    ("august", 15),
    ("september", 15),
    ("october", 15),
    ("november", 15),
    ("december", 15),
];

/// Signatures for the internationally-formatted layout family.
pub const INTERNATIONAL_SIGNATURES: &[(&str, u32)] = &[
    ("amazon.de", 40),
    ("rechnung", 25),
    ("bestellung", 20),
    ("zwischensumme", 20),
    ("summe", 20),
    ("versand", 20),
    ("€", 20),
    ("eur", 20),
    ("januar", 15),
    ("februar", 15),
    ("märz", 15),
    ("mai", 15),
    ("juni", 15),
    ("juli", 15),
    ("oktober", 15),
    ("dezember", 15),
    ("janvier", 15),
    ("février", 15),
    ("décembre", 15),
    ("enero", 15),
    ("diciembre", 15),
    ("gennaio", 15),
    ("dicembre", 15),
];

/// Business-customer indicators (international format).
pub const BUSINESS_SIGNATURES: &[(&str, u32)] = &[
    ("amazon business", 40),
    ("rechnungsnummer", 20),
    ("bestellnummer", 15),
    ("netto", 15),
    ("business", 15),
];

/// Consumer indicators (international format).
pub const CONSUMER_SIGNATURES: &[(&str, u32)] = &[
    ("bestellbestätigung", 25),
    ("vielen dank für ihre bestellung", 20),
    ("geschenk", 15),
    ("prime", 15),
];

/// Decisive locale terms that boost one subtype outright.
pub const BUSINESS_BOOSTS: &[(&str, u32)] = &[("ust-idnr", 30), ("geschäftskunde", 30)];
pub const CONSUMER_BOOSTS: &[(&str, u32)] = &[("privatkunde", 30)];

lazy_static! {
    /// Header line of a tabular item listing ("Pos. Artikel Menge Preis").
    pub static ref ITEM_TABLE_HEADER: Regex =
        Regex::new(r"(?im)^.*pos\.?\s+.*(artikel|menge|stückpreis|preis).*$").unwrap();
}

/// Sum the weights of all table tokens present in the (lowercased) text.
pub fn score_signatures(lower_text: &str, table: &[(&str, u32)]) -> u32 {
    table
        .iter()
        .filter(|(token, _)| lower_text.contains(token))
        .map(|(_, weight)| *weight)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_tokens_count_once() {
        let text = "summe summe summe";
        assert_eq!(score_signatures(text, INTERNATIONAL_SIGNATURES), 20);
    }

    #[test]
    fn test_anchor_weight() {
        assert_eq!(score_signatures("amazon.de", INTERNATIONAL_SIGNATURES), 40);
        assert_eq!(score_signatures("amazon.com", DOMESTIC_SIGNATURES), 40);
    }

    #[test]
    fn test_table_header_regex() {
        assert!(ITEM_TABLE_HEADER.is_match("Pos. Artikel Menge Stückpreis Summe"));
        assert!(!ITEM_TABLE_HEADER.is_match("Lieferadresse: Musterweg 1"));
    }
}
