//! Monetary amount extraction.
//!
//! Amounts keep their original formatting all the way to the output; the
//! parsed [`Decimal`] travels alongside for validation only.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::extract::locale::LocaleRules;

use super::patterns::{AMOUNT_EU, AMOUNT_US, CURRENCY_TOKEN};

/// One monetary value: original text plus parsed value.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyMatch {
    /// The amount exactly as printed, currency included.
    pub raw: String,
    /// Parsed value.
    pub value: Decimal,
    /// Currency symbol or code seen in the raw text.
    pub currency: Option<String>,
}

impl MoneyMatch {
    fn from_parts(raw: &str, integer: &str, cents: &str) -> Option<Self> {
        let integer: String = integer
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        let value = Decimal::from_str(&format!("{}.{}", integer, cents)).ok()?;
        Some(Self {
            raw: raw.trim().to_string(),
            value,
            currency: detect_currency(raw),
        })
    }
}

/// Currency token inside a monetary string, if any.
pub fn detect_currency(raw: &str) -> Option<String> {
    CURRENCY_TOKEN
        .find(raw)
        .map(|m| m.as_str().to_uppercase())
        .map(|c| match c.as_str() {
            "$" => "$".to_string(),
            "€" => "€".to_string(),
            other => other.to_string(),
        })
}

fn amount_regex(rules: &LocaleRules) -> &'static Regex {
    if rules.decimal_comma {
        &*AMOUNT_EU
    } else {
        &*AMOUNT_US
    }
}

/// First amount in a fragment, using the locale's number style.
pub fn find_amount(text: &str, rules: &LocaleRules) -> Option<MoneyMatch> {
    let caps = amount_regex(rules).captures(text)?;
    let full = caps.get(0)?;
    MoneyMatch::from_parts(full.as_str(), &caps[1], &caps[2])
}

/// All amounts in a fragment, in order of appearance.
pub fn find_amounts(text: &str, rules: &LocaleRules) -> Vec<MoneyMatch> {
    amount_regex(rules)
        .captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            MoneyMatch::from_parts(full.as_str(), &caps[1], &caps[2])
        })
        .collect()
}

/// The labeled monetary totals of an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceTotals {
    pub subtotal: Option<MoneyMatch>,
    pub shipping: Option<MoneyMatch>,
    pub tax: Option<MoneyMatch>,
    pub total: Option<MoneyMatch>,
    pub discount: Option<MoneyMatch>,

    /// How many subtotal markers the text carries. Two or more hints at a
    /// multi-shipment order.
    pub subtotal_markers: usize,
}

/// Extract the labeled totals from invoice text.
pub fn extract_totals(text: &str, rules: &LocaleRules) -> InvoiceTotals {
    let labeled = |label: &Regex| {
        label
            .captures(text)
            .and_then(|caps| find_amount(&caps[1], rules))
    };

    InvoiceTotals {
        subtotal: labeled(&rules.subtotal_label),
        shipping: labeled(&rules.shipping_label),
        tax: labeled(&rules.tax_label),
        total: labeled(&rules.total_label),
        discount: labeled(&rules.discount_label),
        subtotal_markers: rules.subtotal_label.find_iter(text).count(),
    }
}

/// Parse an amount string without knowing its locale, for validation.
///
/// Separator roles are inferred from their positions: the rightmost of
/// `.`/`,` followed by exactly two digits is the decimal separator.
pub fn parse_amount_str(s: &str) -> Option<MoneyMatch> {
    let currency = detect_currency(s);
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let comma = cleaned.rfind(',');
    let dot = cleaned.rfind('.');
    let normalized = match (comma, dot) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => {
            if cleaned.len() - c == 3 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(d)) => {
            if cleaned.len() - d == 3 {
                cleaned
            } else {
                cleaned.replace('.', "")
            }
        }
        (None, None) => cleaned,
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(MoneyMatch {
        raw: s.trim().to_string(),
        value,
        currency,
    })
}

/// Format a derived amount in the locale's style.
pub fn format_amount(value: Decimal, rules: &LocaleRules) -> String {
    let s = format!("{:.2}", value);
    let (integer, cents) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer.chars().collect();
    let mut grouped = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(if rules.decimal_comma { '.' } else { ',' });
        }
        grouped.push(*c);
    }

    if rules.decimal_comma {
        format!("{},{} {}", grouped, cents, rules.currency_symbol)
    } else {
        format!("{}{}.{}", rules.currency_symbol, grouped, cents)
    }
}
