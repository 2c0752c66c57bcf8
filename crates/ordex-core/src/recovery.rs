//! Field-by-field error recovery.
//!
//! When the pipeline fails, each field strategy is re-run in isolation so
//! that one broken field cannot take the others down with it. The outcome
//! is a confidence-scored partial invoice; worst case it is simply marked
//! unusable. Recovery itself never fails.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ClassifyError, OrdexError};
use crate::extract::locale::{DE_RULES, EN_RULES};
use crate::extract::rules::amounts::extract_totals;
use crate::extract::rules::dates::{extract_order_date, to_iso};
use crate::extract::rules::items::{extract_items, ItemLayout};
use crate::extract::rules::order_number::extract_order_number;
use crate::models::config::{ExtractionConfig, RecoveryConfig};
use crate::models::invoice::ExtractedInvoice;

/// Category assigned to the error that triggered recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input or file access problem; the document itself is unusable.
    Critical,
    /// Extraction or parsing failure; partial data may still be salvaged.
    Recoverable,
    /// Data-quality-only problem; the document is fine.
    Informational,
}

/// Result of the recovery pass. Exists only on the failure path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryRecord {
    /// Category of the original error.
    pub category: ErrorCategory,

    /// Display form of the original error.
    pub original_error: String,

    /// Per-field confidence: 1.0 or the strategy's own fractional
    /// confidence when extracted, 0.0 when absent.
    pub field_confidence: BTreeMap<String, f32>,

    /// Fraction of fields recovered.
    pub confidence: f32,

    /// Whether the partial result is good enough to hand to callers.
    pub usable: bool,

    /// Ranked suggestions for the operator.
    pub suggestions: Vec<String>,
}

/// A recovery record together with the partial invoice it salvaged.
#[derive(Debug, Clone)]
pub struct RecoveryOutcome {
    pub record: RecoveryRecord,
    pub invoice: ExtractedInvoice,
}

/// Controller for the degraded extraction path.
pub struct RecoveryController {
    config: RecoveryConfig,
}

impl RecoveryController {
    pub fn new() -> Self {
        Self {
            config: RecoveryConfig::default(),
        }
    }

    pub fn with_config(config: RecoveryConfig) -> Self {
        Self { config }
    }

    /// Categorize a pipeline error.
    pub fn categorize(error: &OrdexError) -> ErrorCategory {
        match error {
            OrdexError::Source(_) | OrdexError::Classify(ClassifyError::EmptyInput) => {
                ErrorCategory::Critical
            }
            OrdexError::Extraction(_) => ErrorCategory::Recoverable,
            OrdexError::Config(_) => ErrorCategory::Informational,
        }
    }

    /// Re-run every field strategy in isolation and score the result.
    pub fn recover(
        &self,
        text: &str,
        error: &OrdexError,
        extraction: &ExtractionConfig,
    ) -> RecoveryOutcome {
        let category = Self::categorize(error);
        warn!(%error, ?category, "pipeline failed, entering field-by-field recovery");

        let mut invoice = ExtractedInvoice::new();
        invoice.processing.parser_variant = "recovery".to_string();
        let mut field_confidence = BTreeMap::new();

        // Order number.
        let m = extract_order_number(text, &EN_RULES)
            .or_else(|| extract_order_number(text, &DE_RULES));
        field_confidence.insert(
            "order_number".to_string(),
            m.as_ref().map(|m| m.confidence).unwrap_or(0.0),
        );
        invoice.order_number = m.map(|m| m.value);

        // Order date.
        let m = extract_order_date(text, &EN_RULES)
            .or_else(|| extract_order_date(text, &DE_RULES));
        field_confidence.insert(
            "order_date".to_string(),
            m.as_ref().map(|m| m.confidence).unwrap_or(0.0),
        );
        invoice.order_date = m.map(|m| to_iso(m.value));

        // Monetary totals, per locale family.
        let us = extract_totals(text, &EN_RULES);
        let eu = extract_totals(text, &DE_RULES);
        let totals = if eu.total.is_some() || eu.subtotal.is_some() {
            eu
        } else {
            us
        };
        invoice.processing.subtotal_markers = totals.subtotal_markers;
        for (name, value) in [
            ("subtotal", totals.subtotal),
            ("shipping", totals.shipping),
            ("tax", totals.tax),
            ("total", totals.total),
        ] {
            field_confidence.insert(name.to_string(), if value.is_some() { 1.0 } else { 0.0 });
            let raw = value.map(|m| m.raw);
            match name {
                "subtotal" => invoice.subtotal = raw,
                "shipping" => invoice.shipping = raw,
                "tax" => invoice.tax = raw,
                _ => invoice.total = raw,
            }
        }

        // Items: try the domestic list, then consumer blocks.
        let mut items = extract_items(text, &EN_RULES, ItemLayout::DomesticList, extraction, &[]);
        if items.is_empty() {
            items = extract_items(text, &DE_RULES, ItemLayout::ConsumerBlocks, extraction, &[]);
        }
        field_confidence.insert("items".to_string(), if items.is_empty() { 0.0 } else { 1.0 });
        invoice.items = items;

        let recovered = field_confidence.values().filter(|c| **c > 0.0).count();
        let confidence = recovered as f32 / field_confidence.len() as f32;

        let order_ok = field_confidence.get("order_number").copied().unwrap_or(0.0) > 0.0;
        let date_ok = field_confidence.get("order_date").copied().unwrap_or(0.0) > 0.0;
        let usable = order_ok && date_ok && confidence > self.config.min_usable_confidence;

        let suggestions = self.suggestions(category, confidence);

        debug!(confidence, usable, "recovery finished");

        let record = RecoveryRecord {
            category,
            original_error: error.to_string(),
            field_confidence,
            confidence,
            usable,
            suggestions,
        };
        RecoveryOutcome { record, invoice }
    }

    /// Category-ranked suggestions plus a confidence-banded advisory.
    fn suggestions(&self, category: ErrorCategory, confidence: f32) -> Vec<String> {
        let mut out: Vec<String> = match category {
            ErrorCategory::Critical => vec![
                "re-acquire the source document".to_string(),
                "check file permissions and encoding".to_string(),
            ],
            ErrorCategory::Recoverable => vec![
                "review the document for an unsupported layout".to_string(),
                "queue the order for manual review".to_string(),
            ],
            ErrorCategory::Informational => {
                vec!["review the flagged fields".to_string()]
            }
        };

        if confidence < 0.3 {
            out.push("very little could be recovered; re-extract from the original document".to_string());
        } else if confidence < 0.7 {
            out.push("manually verify the recovered fields before use".to_string());
        } else {
            out.push("most fields recovered; spot-check the monetary amounts".to_string());
        }

        out
    }
}

impl Default for RecoveryController {
    fn default() -> Self {
        Self::new()
    }
}
