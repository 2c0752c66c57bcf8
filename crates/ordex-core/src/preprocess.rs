//! Text preprocessing, in two passes.
//!
//! The light pass is locale-agnostic and runs before classification; the
//! format-specific pass normalizes tokens whose meaning is ambiguous until
//! the layout family is known. Both passes are pure and idempotent.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::classification::InvoiceFormat;

lazy_static! {
    static ref ZERO_WIDTH: Regex = Regex::new("[\u{feff}\u{200b}\u{200c}\u{200d}]").unwrap();
    static ref SPACE_RUN: Regex = Regex::new("[ \t]+").unwrap();
    static ref BLANK_RUN: Regex = Regex::new("\n{3,}").unwrap();

    // An amount whose digit groups were split across a line break,
    // e.g. "1.\n234,56" or "1\n234,56".
    static ref SPLIT_AMOUNT: Regex =
        Regex::new(r"(\d{1,3})[.\u{00a0} ]?\n[ ]?(\d{3},\d{2})").unwrap();

    static ref US_DOLLAR: Regex = Regex::new(r"US\s?\$").unwrap();
    static ref DOLLAR_GAP: Regex = Regex::new(r"\$[ ]+(\d)").unwrap();
}

/// Locale-agnostic cleanup: line endings, encoding artifacts, whitespace.
///
/// Empty input yields an empty string. Running the function on its own
/// output is a no-op.
pub fn light_preprocess(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = ZERO_WIDTH.replace_all(&text, "");
    let text = text.replace(['\u{00a0}', '\u{202f}'], " ");
    let text = SPACE_RUN.replace_all(&text, " ");

    let lines: Vec<&str> = text.lines().map(|l| l.trim_end()).collect();
    let text = lines.join("\n");

    BLANK_RUN.replace_all(&text, "\n\n").into_owned()
}

/// Locale-aware cleanup that needs the resolved format.
///
/// International layouts get digit groups rejoined when an amount was split
/// across a line break; domestic layouts get `US$` and `$ 12.34` spacing
/// normalized. An unresolved format passes through unchanged.
pub fn format_preprocess(text: &str, format: InvoiceFormat) -> String {
    match format {
        InvoiceFormat::International => SPLIT_AMOUNT.replace_all(text, "$1 $2").into_owned(),
        InvoiceFormat::Domestic => {
            let text = US_DOLLAR.replace_all(text, "$");
            DOLLAR_GAP.replace_all(&text, "$$$1").into_owned()
        }
        InvoiceFormat::None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        assert_eq!(light_preprocess(""), "");
    }

    #[test]
    fn test_light_preprocess_whitespace() {
        let text = "Order  Placed:\t December 15, 2023  \r\nTotal:\u{00a0}$10.00";
        assert_eq!(
            light_preprocess(text),
            "Order Placed: December 15, 2023\nTotal: $10.00"
        );
    }

    #[test]
    fn test_light_preprocess_collapses_blank_lines() {
        let text = "a\n\n\n\n\nb";
        assert_eq!(light_preprocess(text), "a\n\nb");
    }

    #[test]
    fn test_light_preprocess_idempotent() {
        let text = "\u{feff}Rechnung\r\nSumme:  1\u{00a0}176,46 €\n\n\n\nEnde ";
        let once = light_preprocess(text);
        let twice = light_preprocess(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_preprocess_rejoins_split_amount() {
        let text = "Summe: 1.\n234,56 €";
        let out = format_preprocess(text, InvoiceFormat::International);
        assert_eq!(out, "Summe: 1 234,56 €");
    }

    #[test]
    fn test_format_preprocess_domestic_dollar() {
        let text = "Grand Total: US$ 172.78 plus $ 5.00";
        let out = format_preprocess(text, InvoiceFormat::Domestic);
        assert_eq!(out, "Grand Total: $172.78 plus $5.00");
    }

    #[test]
    fn test_format_preprocess_idempotent() {
        let text = "Summe: 1.\n234,56 €";
        let once = format_preprocess(text, InvoiceFormat::International);
        let twice = format_preprocess(&once, InvoiceFormat::International);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_preprocess_unresolved_passthrough() {
        let text = "anything at all";
        assert_eq!(format_preprocess(text, InvoiceFormat::None), text);
    }
}
