//! Shared regex patterns for marketplace invoice extraction.
//!
//! Locale-specific label patterns live in the locale rule tables; this
//! module holds the patterns whose structure is the same everywhere.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Marketplace order number: three digit groups of fixed lengths 3-7-7.
    pub static ref ORDER_NUMBER: Regex = Regex::new(
        r"\b(\d{3})-(\d{7})-(\d{7})\b"
    ).unwrap();

    // Looser candidate used behind labels; every hit still has to pass
    // shape validation before it is accepted.
    pub static ref ORDER_NUMBER_CANDIDATE: Regex = Regex::new(
        r"([0-9][0-9\-]{8,24}[0-9])"
    ).unwrap();

    // Platform catalog identifier.
    pub static ref CATALOG_ID: Regex = Regex::new(
        r"\b(B0[A-Z0-9]{8})\b"
    ).unwrap();

    // US-style amount: $1,234.56 / USD 1234.56 / 129.99
    pub static ref AMOUNT_US: Regex = Regex::new(
        r"(?:(?:\$|USD)\s?)?(\d{1,3}(?:,\d{3})+|\d+)\.(\d{2})\b"
    ).unwrap();

    // EU-style amount: 1.234,56 € / € 1234,56 / EUR 176,46 / 176,46
    pub static ref AMOUNT_EU: Regex = Regex::new(
        r"(?:(?:€|EUR)\s?)?(\d{1,3}(?:[. ]\d{3})+|\d+),(\d{2})(?:\s?(?:€|EUR))?"
    ).unwrap();

    // Date orderings. Month names resolve against a per-language table,
    // so a candidate that matches here can still be rejected later.
    pub static ref DATE_MONTH_FIRST: Regex = Regex::new(
        r"(?i)\b(\p{L}+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b"
    ).unwrap();

    pub static ref DATE_DAY_FIRST: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\.?\s+(\p{L}+)\.?\s+(\d{4})\b"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[./](\d{1,2})[./](\d{4})\b"
    ).unwrap();

    // Quantity prefix in domestic item listings: "2 of: Echo Dot"
    pub static ref QUANTITY_OF: Regex = Regex::new(
        r"(?i)^\s*(\d{1,4})\s+of:?\s*(.*)$"
    ).unwrap();

    // Quantity markers in international listings: "Menge: 2", "2 x", "Qté : 2"
    pub static ref QUANTITY_MARKER: Regex = Regex::new(
        r"(?i)(?:menge|qty|qté|cantidad|quantità)\s*[:.]?\s*(\d{1,4})|\b(\d{1,4})\s*[x×]\b"
    ).unwrap();

    // Currency symbol or code anywhere in a monetary string.
    pub static ref CURRENCY_TOKEN: Regex = Regex::new(
        r"(?i)(\$|€|£|USD|EUR|GBP)"
    ).unwrap();
}
