//! Extracted invoice data models - the stable wire contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::language::LanguageDetection;
use crate::models::classification::FormatClassification;
use crate::models::validation::ValidationResult;
use crate::recovery::RecoveryRecord;

/// Vendor attached to every extracted invoice.
pub const VENDOR: &str = "Amazon";

/// A complete extracted purchase record.
///
/// Monetary fields keep their original locale formatting ("$172.78",
/// "1.234,56 €"); they are parsed into [`Decimal`] only transiently, inside
/// validation. Each pipeline stage enriches the record through the `with_*`
/// builders instead of mutating a shared aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// Marketplace order number (3-7-7 digit groups).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,

    /// Order date in canonical ISO form (YYYY-MM-DD).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,

    /// Line items in document order. Always present, possibly empty.
    pub items: Vec<LineItem>,

    /// Subtotal as formatted in the source document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<String>,

    /// Shipping cost as formatted in the source document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<String>,

    /// Tax amount as formatted in the source document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,

    /// Grand total as formatted in the source document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,

    /// Discount as formatted in the source document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,

    /// Vendor constant.
    pub vendor: String,

    /// Detected document language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageDetection>,

    /// Format classification that routed this invoice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<FormatClassification>,

    /// Cross-field validation result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,

    /// Recovery record, present only on the failure path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery: Option<RecoveryRecord>,

    /// Processing metadata (routing, hints, stage trace).
    pub processing: ProcessingMetadata,

    /// Stage timings and extraction success ratio.
    pub performance: PerformanceMetrics,
}

impl ExtractedInvoice {
    /// Create an empty invoice shell.
    pub fn new() -> Self {
        Self {
            order_number: None,
            order_date: None,
            items: Vec::new(),
            subtotal: None,
            shipping: None,
            tax: None,
            total: None,
            discount: None,
            vendor: VENDOR.to_string(),
            language: None,
            classification: None,
            validation: None,
            recovery: None,
            processing: ProcessingMetadata::default(),
            performance: PerformanceMetrics::default(),
        }
    }

    /// Attach the detected language.
    pub fn with_language(mut self, language: LanguageDetection) -> Self {
        self.language = Some(language);
        self
    }

    /// Attach the format classification.
    pub fn with_classification(mut self, classification: FormatClassification) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Attach the validation result.
    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Attach the recovery record (failure path only).
    pub fn with_recovery(mut self, recovery: RecoveryRecord) -> Self {
        self.recovery = Some(recovery);
        self
    }

    /// Attach the finalized performance metrics.
    pub fn with_performance(mut self, performance: PerformanceMetrics) -> Self {
        self.performance = performance;
        self
    }

    /// Fraction of the scalar fields (order number, date, four monetary
    /// totals) plus the item list that were extracted.
    pub fn field_success_ratio(&self) -> f32 {
        let fields = [
            self.order_number.is_some(),
            self.order_date.is_some(),
            self.subtotal.is_some(),
            self.shipping.is_some(),
            self.tax.is_some(),
            self.total.is_some(),
            !self.items.is_empty(),
        ];
        let hit = fields.iter().filter(|f| **f).count();
        hit as f32 / fields.len() as f32
    }
}

impl Default for ExtractedInvoice {
    fn default() -> Self {
        Self::new()
    }
}

/// A single line item on the invoice. Owned by its invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product description.
    pub description: String,

    /// Quantity ordered.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Line total (unit price x quantity as printed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,

    /// Platform-assigned catalog identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,

    /// Currency symbol or code seen next to the price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// Create an item with just a description and the default quantity.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            quantity: 1,
            unit_price: None,
            total_price: None,
            catalog_id: None,
            currency: None,
        }
    }

    /// Line total, falling back to unit price x quantity.
    pub fn effective_total(&self) -> Option<Decimal> {
        self.total_price
            .or_else(|| self.unit_price.map(|p| p * Decimal::from(self.quantity)))
    }
}

/// Metadata attached by the orchestrator while the invoice moves through
/// the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Name of the parser variant that produced the invoice.
    pub parser_variant: String,

    /// How deep the routing fallback chain went (0 = exact match).
    pub fallback_depth: u8,

    /// Stages executed, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<String>,

    /// Number of subtotal markers seen in the source text. Two or more
    /// hints at a multi-shipment order.
    pub subtotal_markers: usize,

    /// True when the subtotal was derived from item totals rather than
    /// matched verbatim.
    pub subtotal_derived: bool,

    /// Debug flag from the parse options.
    pub debug: bool,
}

impl ProcessingMetadata {
    /// Multi-shipment hint derived from repeated subtotal markers.
    pub fn multi_shipment_hint(&self) -> bool {
        self.subtotal_markers >= 2
    }
}

/// Per-stage timings and extraction quality numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total pipeline wall time in milliseconds.
    pub total_ms: u64,

    /// Per-stage wall time in milliseconds, in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stage_ms: Vec<StageTiming>,

    /// Fraction of fields successfully extracted (0.0 - 1.0).
    pub field_success_ratio: f32,
}

/// Wall time of one pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    /// Stage name.
    pub stage: String,

    /// Elapsed milliseconds.
    pub ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_field_success_ratio() {
        let mut invoice = ExtractedInvoice::new();
        assert_eq!(invoice.field_success_ratio(), 0.0);

        invoice.order_number = Some("123-4567890-1234567".to_string());
        invoice.total = Some("$10.00".to_string());
        let ratio = invoice.field_success_ratio();
        assert!((ratio - 2.0 / 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_effective_total_falls_back_to_unit_price() {
        let mut item = LineItem::new("Widget");
        item.quantity = 3;
        item.unit_price = Some(Decimal::from_str("2.50").unwrap());
        assert_eq!(item.effective_total(), Some(Decimal::from_str("7.50").unwrap()));

        item.total_price = Some(Decimal::from_str("7.00").unwrap());
        assert_eq!(item.effective_total(), Some(Decimal::from_str("7.00").unwrap()));
    }

    #[test]
    fn test_multi_shipment_hint() {
        let mut meta = ProcessingMetadata::default();
        assert!(!meta.multi_shipment_hint());
        meta.subtotal_markers = 2;
        assert!(meta.multi_shipment_hint());
    }
}
