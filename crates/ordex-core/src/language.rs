//! Keyword-based language detection.
//!
//! Uses the same weighted token-presence idiom as the format classifier:
//! distinctive invoice terms score high, common stopwords low. Good enough
//! to route between the per-language rule banks; not a general detector.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Languages with dedicated extraction rule banks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    German,
    French,
    Spanish,
    Italian,
    #[default]
    Unknown,
}

impl Language {
    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Unknown => "und",
        }
    }
}

/// Detection outcome attached to the extracted invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDetection {
    /// Best-scoring language.
    pub language: Language,

    /// Share of the total signal captured by the winner (0.0 - 1.0).
    pub confidence: f32,
}

/// (word, weight) signal tables. Invoice vocabulary outweighs stopwords.
const ENGLISH: &[(&str, u32)] = &[
    ("order", 3),
    ("placed", 3),
    ("shipping", 3),
    ("subtotal", 3),
    ("invoice", 3),
    ("the", 1),
    ("and", 1),
    ("your", 1),
    ("of", 1),
];

const GERMAN: &[(&str, u32)] = &[
    ("rechnung", 3),
    ("bestellung", 3),
    ("versand", 3),
    ("summe", 3),
    ("zwischensumme", 3),
    ("der", 1),
    ("die", 1),
    ("und", 1),
    ("ihre", 1),
    ("für", 1),
];

const FRENCH: &[(&str, u32)] = &[
    ("commande", 3),
    ("facture", 3),
    ("livraison", 3),
    ("montant", 3),
    ("le", 1),
    ("la", 1),
    ("et", 1),
    ("votre", 1),
    ("des", 1),
];

const SPANISH: &[(&str, u32)] = &[
    ("pedido", 3),
    ("factura", 3),
    ("envío", 3),
    ("importe", 3),
    ("el", 1),
    ("y", 1),
    ("su", 1),
    ("del", 1),
    ("los", 1),
];

const ITALIAN: &[(&str, u32)] = &[
    ("ordine", 3),
    ("fattura", 3),
    ("spedizione", 3),
    ("importo", 3),
    ("il", 1),
    ("e", 1),
    ("suo", 1),
    ("della", 1),
    ("gli", 1),
];

fn score(words: &HashSet<String>, table: &[(&str, u32)]) -> u32 {
    table
        .iter()
        .filter(|(word, _)| words.contains(*word))
        .map(|(_, weight)| *weight)
        .sum()
}

/// Detect the dominant language of an invoice text.
pub fn detect(text: &str) -> LanguageDetection {
    let words: HashSet<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect();

    let candidates = [
        (Language::English, score(&words, ENGLISH)),
        (Language::German, score(&words, GERMAN)),
        (Language::French, score(&words, FRENCH)),
        (Language::Spanish, score(&words, SPANISH)),
        (Language::Italian, score(&words, ITALIAN)),
    ];

    let total: u32 = candidates.iter().map(|(_, s)| s).sum();
    let best = candidates
        .iter()
        .max_by_key(|(_, s)| *s)
        .copied()
        .unwrap_or((Language::Unknown, 0));

    if best.1 == 0 {
        return LanguageDetection {
            language: Language::Unknown,
            confidence: 0.0,
        };
    }

    LanguageDetection {
        language: best.0,
        confidence: best.1 as f32 / total as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_english() {
        let text = "Your order has been placed. Shipping and handling included.";
        let result = detect(text);
        assert_eq!(result.language, Language::English);
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn test_detect_german() {
        let text = "Vielen Dank für Ihre Bestellung. Die Rechnung und der Versand folgen.";
        let result = detect(text);
        assert_eq!(result.language, Language::German);
    }

    #[test]
    fn test_detect_unknown() {
        let result = detect("1234 5678 ---");
        assert_eq!(result.language, Language::Unknown);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::German.code(), "de");
        assert_eq!(Language::Unknown.code(), "und");
    }
}
