//! Format and subtype classification.

pub mod signatures;

use tracing::debug;

use crate::error::ClassifyError;
use crate::extract::rules::patterns::CATALOG_ID;
use crate::models::classification::{
    FormatClassification, FormatScores, InvoiceFormat, InvoiceSubtype, QualityLevel,
    RecommendedAction,
};
use crate::models::config::ClassifyConfig;

use signatures::{
    score_signatures, BUSINESS_BOOSTS, BUSINESS_SIGNATURES, CONSUMER_BOOSTS, CONSUMER_SIGNATURES,
    DOMESTIC_SIGNATURES, INTERNATIONAL_SIGNATURES, ITEM_TABLE_HEADER,
};

/// Weighted-signature format classifier.
pub struct FormatClassifier {
    config: ClassifyConfig,
}

impl FormatClassifier {
    /// Create a classifier with default thresholds.
    pub fn new() -> Self {
        Self {
            config: ClassifyConfig::default(),
        }
    }

    /// Create a classifier with explicit thresholds.
    pub fn with_config(config: ClassifyConfig) -> Self {
        Self { config }
    }

    /// Classify the layout family and subtype of an invoice text.
    ///
    /// Blank input is the one hard failure of this stage.
    pub fn classify(&self, text: &str) -> Result<FormatClassification, ClassifyError> {
        if text.trim().is_empty() {
            return Err(ClassifyError::EmptyInput);
        }

        let lower = text.to_lowercase();
        let scores = FormatScores {
            domestic: score_signatures(&lower, DOMESTIC_SIGNATURES),
            international: score_signatures(&lower, INTERNATIONAL_SIGNATURES),
        };

        debug!(
            domestic = scores.domestic,
            international = scores.international,
            "format signature scores"
        );

        let cutoff = self.config.ambiguity_cutoff;
        if scores.domestic < cutoff && scores.international < cutoff {
            return Ok(FormatClassification::unresolved(
                scores,
                self.config.confidence_floor,
            ));
        }

        // The international anchor is the strongest single signal, so the
        // international format wins exact ties.
        let format = if scores.international >= scores.domestic {
            InvoiceFormat::International
        } else {
            InvoiceFormat::Domestic
        };
        let winning = scores.domestic.max(scores.international);
        let losing = scores.domestic.min(scores.international);

        let mut confidence = band_confidence(winning);
        if losing >= cutoff {
            confidence = confidence
                .saturating_sub(self.config.ambiguity_penalty)
                .max(self.config.confidence_floor);
        }

        let (quality, action) = quality_for(confidence);

        let (subtype, subtype_defaulted) = if format == InvoiceFormat::International {
            self.classify_subtype(text, &lower)
        } else {
            (InvoiceSubtype::None, false)
        };

        Ok(FormatClassification {
            format,
            subtype,
            confidence,
            quality,
            action,
            scores,
            subtype_defaulted,
        })
    }

    /// Score business vs consumer indicators; break ties structurally.
    fn classify_subtype(&self, text: &str, lower: &str) -> (InvoiceSubtype, bool) {
        let business = score_signatures(lower, BUSINESS_SIGNATURES)
            + score_signatures(lower, BUSINESS_BOOSTS);
        let consumer = score_signatures(lower, CONSUMER_SIGNATURES)
            + score_signatures(lower, CONSUMER_BOOSTS);

        debug!(business, consumer, "subtype scores");

        if business > consumer {
            return (InvoiceSubtype::Business, false);
        }
        if consumer > business {
            return (InvoiceSubtype::Consumer, false);
        }

        // Tie (including no signal at all): a tabular item header appearing
        // before the first catalog id implies a business layout.
        let header_pos = ITEM_TABLE_HEADER.find(text).map(|m| m.start());
        let catalog_pos = CATALOG_ID.find(text).map(|m| m.start());
        if let (Some(h), Some(c)) = (header_pos, catalog_pos) {
            if h < c {
                return (InvoiceSubtype::Business, false);
            }
        }

        // No signal left; the consumer default is surfaced, not silent.
        (InvoiceSubtype::Consumer, business == 0 && consumer == 0)
    }
}

impl Default for FormatClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Band a winning signature score into a confidence value.
fn band_confidence(score: u32) -> u8 {
    match score {
        s if s >= 100 => 100,
        s if s >= 80 => 80,
        s if s >= 60 => 60,
        s if s >= 40 => 40,
        s if s >= 25 => 25,
        _ => 15,
    }
}

fn quality_for(confidence: u8) -> (QualityLevel, RecommendedAction) {
    match confidence {
        c if c >= 70 => (QualityLevel::High, RecommendedAction::Accept),
        c if c >= 40 => (QualityLevel::Medium, RecommendedAction::Review),
        c if c >= 25 => (QualityLevel::Low, RecommendedAction::Review),
        _ => (QualityLevel::VeryLow, RecommendedAction::Reject),
    }
}
