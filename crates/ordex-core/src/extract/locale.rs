//! Per-locale extraction rule tables.
//!
//! One declarative [`LocaleRules`] instance per supported language; the
//! extraction engine is parameterized by these instead of carrying a parser
//! implementation per locale. Loaded once, read-only afterwards.

use lazy_static::lazy_static;
use regex::Regex;

use crate::language::Language;

/// Declarative rule table for one language.
pub struct LocaleRules {
    /// Language this table belongs to.
    pub language: Language,

    /// Month name -> month number.
    pub months: &'static [(&'static str, u32)],

    /// Label introducing the order number; captures the rest of the line.
    pub order_number_label: Regex,

    /// Label introducing the order date; captures the rest of the line.
    pub order_date_label: Regex,

    /// Monetary field labels; each captures the rest of the line.
    pub subtotal_label: Regex,
    pub shipping_label: Regex,
    pub tax_label: Regex,
    pub total_label: Regex,
    pub discount_label: Regex,

    /// Amounts are written with a decimal comma (1.234,56).
    pub decimal_comma: bool,

    /// Numeric dates are day-first (15.01.2024 rather than 01/15/2024).
    pub day_first_numeric: bool,

    /// Currency appended when formatting derived amounts.
    pub currency_symbol: &'static str,
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

impl LocaleRules {
    fn english() -> Self {
        Self {
            language: Language::English,
            months: &[
                ("january", 1),
                ("february", 2),
                ("march", 3),
                ("april", 4),
                ("may", 5),
                ("june", 6),
                ("july", 7),
                ("august", 8),
                ("september", 9),
                ("october", 10),
                ("november", 11),
                ("december", 12),
            ],
            order_number_label: re(r"(?im)\border\s*(?:#|number|no\.?|id)\s*:?\s*(.+)$"),
            order_date_label: re(
                r"(?im)\b(?:order\s+placed|order\s+date|date\s+ordered|placed\s+on)\s*:?\s*(.+)$",
            ),
            subtotal_label: re(r"(?im)\b(?:items?\s+subtotal|item\(s\)\s+subtotal|subtotal)\s*:?\s*(.+)$"),
            shipping_label: re(
                r"(?im)\b(?:shipping\s*(?:&|and)\s*handling|shipping|postage)\s*:?\s*(.+)$",
            ),
            tax_label: re(
                r"(?im)\b(?:estimated\s+tax(?:\s+to\s+be\s+collected)?|sales\s+tax|tax)\s*:?\s*(.+)$",
            ),
            total_label: re(
                r"(?im)\b(?:grand\s+total|order\s+total|total\s+for\s+this\s+order|total)\s*:?\s*(.+)$",
            ),
            discount_label: re(r"(?im)\b(?:discount|promotion\s+applied|coupon)\s*:?\s*(.+)$"),
            decimal_comma: false,
            day_first_numeric: false,
            currency_symbol: "$",
        }
    }

    fn german() -> Self {
        Self {
            language: Language::German,
            months: &[
                ("januar", 1),
                ("februar", 2),
                ("märz", 3),
                ("april", 4),
                ("mai", 5),
                ("juni", 6),
                ("juli", 7),
                ("august", 8),
                ("september", 9),
                ("oktober", 10),
                ("november", 11),
                ("dezember", 12),
            ],
            order_number_label: re(r"(?im)\b(?:bestellnummer|bestell-?nr\.?)\s*:?\s*(.+)$"),
            order_date_label: re(
                r"(?im)\b(?:bestelldatum|rechnungsdatum|bestellung\s+aufgegeben\s+am)\s*:?\s*(.+)$",
            ),
            subtotal_label: re(r"(?im)\bzwischensumme\s*:?\s*(.+)$"),
            shipping_label: re(
                r"(?im)\b(?:verpackung\s*(?:und|&)\s*versand|versandkosten|versand)\s*:?\s*(.+)$",
            ),
            tax_label: re(r"(?im)\b(?:anfallende\s+ust\.?|umsatzsteuer|mwst\.?|ust\.?)\s*:?\s*(.+)$"),
            total_label: re(
                r"(?im)\b(?:gesamtsumme|gesamtbetrag|rechnungsbetrag|summe)\s*:?\s*(.+)$",
            ),
            discount_label: re(r"(?im)\b(?:rabatt|gutschein|aktion)\s*:?\s*(.+)$"),
            decimal_comma: true,
            day_first_numeric: true,
            currency_symbol: "€",
        }
    }

    fn french() -> Self {
        Self {
            language: Language::French,
            months: &[
                ("janvier", 1),
                ("février", 2),
                ("mars", 3),
                ("avril", 4),
                ("mai", 5),
                ("juin", 6),
                ("juillet", 7),
                ("août", 8),
                ("septembre", 9),
                ("octobre", 10),
                ("novembre", 11),
                ("décembre", 12),
            ],
            order_number_label: re(r"(?im)\b(?:numéro\s+de\s+commande|n°\s*de\s+commande)\s*:?\s*(.+)$"),
            order_date_label: re(
                r"(?im)\b(?:date\s+de\s+la\s+commande|commande\s+effectuée\s+le)\s*:?\s*(.+)$",
            ),
            subtotal_label: re(r"(?im)\bsous-total\s*:?\s*(.+)$"),
            shipping_label: re(r"(?im)\b(?:livraison\s+et\s+expédition|frais\s+de\s+port|livraison)\s*:?\s*(.+)$"),
            tax_label: re(r"(?im)\btva\s*:?\s*(.+)$"),
            total_label: re(r"(?im)\b(?:montant\s+total|total\s+de\s+la\s+commande|total)\s*:?\s*(.+)$"),
            discount_label: re(r"(?im)\b(?:remise|réduction)\s*:?\s*(.+)$"),
            decimal_comma: true,
            day_first_numeric: true,
            currency_symbol: "€",
        }
    }

    fn spanish() -> Self {
        Self {
            language: Language::Spanish,
            months: &[
                ("enero", 1),
                ("febrero", 2),
                ("marzo", 3),
                ("abril", 4),
                ("mayo", 5),
                ("junio", 6),
                ("julio", 7),
                ("agosto", 8),
                ("septiembre", 9),
                ("octubre", 10),
                ("noviembre", 11),
                ("diciembre", 12),
            ],
            order_number_label: re(r"(?im)\b(?:número\s+de\s+pedido|nº\s*de\s+pedido)\s*:?\s*(.+)$"),
            order_date_label: re(
                r"(?im)\b(?:fecha\s+del\s+pedido|pedido\s+realizado\s+el)\s*:?\s*(.+)$",
            ),
            subtotal_label: re(r"(?im)\bsubtotal\s*:?\s*(.+)$"),
            shipping_label: re(r"(?im)\b(?:gastos\s+de\s+envío|envío)\s*:?\s*(.+)$"),
            tax_label: re(r"(?im)\biva\s*:?\s*(.+)$"),
            total_label: re(r"(?im)\b(?:importe\s+total|total\s+del\s+pedido|total)\s*:?\s*(.+)$"),
            discount_label: re(r"(?im)\bdescuento\s*:?\s*(.+)$"),
            decimal_comma: true,
            day_first_numeric: true,
            currency_symbol: "€",
        }
    }

    fn italian() -> Self {
        Self {
            language: Language::Italian,
            months: &[
                ("gennaio", 1),
                ("febbraio", 2),
                ("marzo", 3),
                ("aprile", 4),
                ("maggio", 5),
                ("giugno", 6),
                ("luglio", 7),
                ("agosto", 8),
                ("settembre", 9),
                ("ottobre", 10),
                ("novembre", 11),
                ("dicembre", 12),
            ],
            order_number_label: re(r"(?im)\b(?:numero\s+(?:d['’])?ordine)\s*:?\s*(.+)$"),
            order_date_label: re(
                r"(?im)\b(?:data\s+dell['’]ordine|ordine\s+effettuato\s+il)\s*:?\s*(.+)$",
            ),
            subtotal_label: re(r"(?im)\b(?:subtotale|totale\s+parziale)\s*:?\s*(.+)$"),
            shipping_label: re(r"(?im)\b(?:costi\s+di\s+spedizione|spedizione)\s*:?\s*(.+)$"),
            tax_label: re(r"(?im)\biva\s*:?\s*(.+)$"),
            total_label: re(r"(?im)\b(?:totale\s+ordine|importo\s+totale|totale)\s*:?\s*(.+)$"),
            discount_label: re(r"(?im)\bsconto\s*:?\s*(.+)$"),
            decimal_comma: true,
            day_first_numeric: true,
            currency_symbol: "€",
        }
    }

    /// Resolve a month name against this locale's table.
    ///
    /// Exact match first, then an abbreviation of at least three letters
    /// ("Dec", "Sept", "Dez.").
    pub fn month_number(&self, name: &str) -> Option<u32> {
        let name = name.to_lowercase();
        if let Some((_, n)) = self.months.iter().find(|(month, _)| *month == name) {
            return Some(*n);
        }
        if name.len() >= 3 {
            return self
                .months
                .iter()
                .find(|(month, _)| month.starts_with(&name))
                .map(|(_, n)| *n);
        }
        None
    }
}

lazy_static! {
    pub static ref EN_RULES: LocaleRules = LocaleRules::english();
    pub static ref DE_RULES: LocaleRules = LocaleRules::german();
    pub static ref FR_RULES: LocaleRules = LocaleRules::french();
    pub static ref ES_RULES: LocaleRules = LocaleRules::spanish();
    pub static ref IT_RULES: LocaleRules = LocaleRules::italian();
}

/// Rule table for a detected language. Unknown falls back to English.
pub fn rules_for(language: Language) -> &'static LocaleRules {
    match language {
        Language::English | Language::Unknown => &EN_RULES,
        Language::German => &DE_RULES,
        Language::French => &FR_RULES,
        Language::Spanish => &ES_RULES,
        Language::Italian => &IT_RULES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_lookup() {
        assert_eq!(EN_RULES.month_number("December"), Some(12));
        assert_eq!(DE_RULES.month_number("märz"), Some(3));
        assert_eq!(EN_RULES.month_number("decembre"), None);
    }

    #[test]
    fn test_total_label_does_not_match_subtotal() {
        let caps = EN_RULES.total_label.captures("Subtotal: $159.98");
        assert!(caps.is_none());
        let caps = DE_RULES.total_label.captures("Zwischensumme: 159,98 €");
        assert!(caps.is_none());
    }

    #[test]
    fn test_labeled_line_capture() {
        let caps = EN_RULES.order_date_label.captures("Order Placed: December 15, 2023");
        assert_eq!(&caps.unwrap()[1], "December 15, 2023");

        let caps = DE_RULES.total_label.captures("Gesamtsumme: 1.176,46 €");
        assert_eq!(&caps.unwrap()[1], "1.176,46 €");
    }

    #[test]
    fn test_rules_for_fallback() {
        assert_eq!(rules_for(Language::Unknown).language, Language::English);
        assert_eq!(rules_for(Language::German).language, Language::German);
    }
}
