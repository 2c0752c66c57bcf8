//! Format classification result types.

use serde::{Deserialize, Serialize};

/// Top-level invoice layout family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceFormat {
    /// US marketplace layout (amazon.com style).
    Domestic,
    /// Internationally-formatted layout (amazon.de style).
    International,
    /// No format could be resolved.
    #[default]
    None,
}

/// Sub-classification within the international format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceSubtype {
    /// Business customer invoice (tabular layout, tax ids).
    Business,
    /// Consumer order confirmation layout.
    Consumer,
    /// No subtype applies or none could be resolved.
    #[default]
    None,
}

/// Data quality band derived from classification confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

/// Advisory action suggested for a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Accept,
    Review,
    Reject,
}

/// Raw signature scores per format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FormatScores {
    pub domestic: u32,
    pub international: u32,
}

/// Result of format classification. Produced once, then immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatClassification {
    /// Resolved layout family.
    pub format: InvoiceFormat,

    /// Resolved subtype (international format only).
    pub subtype: InvoiceSubtype,

    /// Banded confidence, 0-100.
    pub confidence: u8,

    /// Quality band derived from confidence.
    pub quality: QualityLevel,

    /// Advisory action; callers may ignore it.
    pub action: RecommendedAction,

    /// Raw per-format signature scores.
    pub scores: FormatScores,

    /// True when the subtype fell back to Consumer with no signal at all.
    /// Surfaced explicitly so downstream consumers can treat the subtype
    /// as low-confidence rather than silently trusting the default.
    pub subtype_defaulted: bool,
}

impl FormatClassification {
    /// Classification for input where neither format reached the cutoff.
    pub fn unresolved(scores: FormatScores, floor: u8) -> Self {
        Self {
            format: InvoiceFormat::None,
            subtype: InvoiceSubtype::None,
            confidence: floor,
            quality: QualityLevel::VeryLow,
            action: RecommendedAction::Reject,
            scores,
            subtype_defaulted: false,
        }
    }

    /// Whether the classification resolved to a concrete format.
    pub fn is_resolved(&self) -> bool {
        self.format != InvoiceFormat::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_classification() {
        let c = FormatClassification::unresolved(FormatScores::default(), 15);
        assert_eq!(c.format, InvoiceFormat::None);
        assert_eq!(c.quality, QualityLevel::VeryLow);
        assert_eq!(c.action, RecommendedAction::Reject);
        assert!(!c.is_resolved());
    }
}
