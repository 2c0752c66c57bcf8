//! Pipeline orchestrator.
//!
//! Sequences preprocess, classification, routing, extraction and
//! validation; times every stage; and delegates failures to the recovery
//! controller. `None` is the only hard-failure signal this module emits -
//! errors never escape it.

use std::time::Instant;

use tracing::{debug, info};

use crate::classify::FormatClassifier;
use crate::error::{OrdexError, Result};
use crate::extract::{DomesticParser, InternationalParser, InvoiceExtractor, MinimalParser};
use crate::language::{self, Language, LanguageDetection};
use crate::models::classification::{FormatClassification, InvoiceFormat, InvoiceSubtype};
use crate::models::config::OrdexConfig;
use crate::models::invoice::{ExtractedInvoice, PerformanceMetrics, StageTiming};
use crate::preprocess::{format_preprocess, light_preprocess};
use crate::recovery::RecoveryController;
use crate::source::DocumentSource;
use crate::validate::ValidationEngine;

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Record the debug flag in processing metadata.
    pub debug: bool,
}

/// The extraction pipeline. Stateless between calls; safe to share across
/// threads.
pub struct Pipeline {
    config: OrdexConfig,
    classifier: FormatClassifier,
    validator: ValidationEngine,
    recovery: RecoveryController,
}

impl Pipeline {
    /// Pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(OrdexConfig::default())
    }

    /// Pipeline with explicit configuration.
    pub fn with_config(config: OrdexConfig) -> Self {
        let classifier = FormatClassifier::with_config(config.classify.clone());
        let validator = ValidationEngine::with_config(config.validation.clone());
        let recovery = RecoveryController::with_config(config.recovery.clone());
        Self {
            config,
            classifier,
            validator,
            recovery,
        }
    }

    /// Parse an invoice text into a structured purchase record.
    ///
    /// Any non-`None` result is a best-effort extraction, even when it
    /// carries validation errors; `None` means the text yielded nothing
    /// usable, recovery included.
    pub fn parse_invoice(&self, raw_text: &str, options: &ParseOptions) -> Option<ExtractedInvoice> {
        match self.run(raw_text, options) {
            Ok(invoice) => Some(invoice),
            Err(error) => self.recover(raw_text, &error),
        }
    }

    /// Fetch a document from the collaborator and parse it. Source
    /// failures take the critical recovery path.
    pub fn process_document(
        &self,
        source: &dyn DocumentSource,
        options: &ParseOptions,
    ) -> Option<ExtractedInvoice> {
        info!(document = %source.describe(), "processing document");
        match source.fetch() {
            Ok(text) => self.parse_invoice(&text, options),
            Err(error) => self.recover("", &OrdexError::from(error)),
        }
    }

    fn run(&self, raw_text: &str, options: &ParseOptions) -> Result<ExtractedInvoice> {
        let started = Instant::now();
        let mut clock = StageClock::new();

        let text = light_preprocess(raw_text);
        clock.lap("light_preprocess");

        let classification = self.classifier.classify(&text)?;
        clock.lap("classify");

        let text = format_preprocess(&text, classification.format);
        clock.lap("format_preprocess");

        let detection = language::detect(&text);
        clock.lap("detect_language");

        let (parser, fallback_depth) = route(&classification, &detection);
        debug!(
            variant = parser.name(),
            fallback_depth, "routed to parser variant"
        );
        clock.lap("route");

        let mut invoice = parser.extract(&text, &self.config.extraction);
        clock.lap("extract");

        invoice.processing.fallback_depth = fallback_depth;
        invoice.processing.debug = options.debug;
        let invoice = invoice
            .with_language(detection)
            .with_classification(classification);

        let validation = self.validator.validate(&invoice);
        clock.lap("validate");

        let mut invoice = invoice.with_validation(validation);
        invoice.processing.stages = clock.stage_names();

        let ratio = invoice.field_success_ratio();
        let metrics = PerformanceMetrics {
            total_ms: started.elapsed().as_millis() as u64,
            stage_ms: clock.into_timings(),
            field_success_ratio: ratio,
        };
        Ok(invoice.with_performance(metrics))
    }

    /// Failure path: categorized recovery, usable result or nothing.
    fn recover(&self, raw_text: &str, error: &OrdexError) -> Option<ExtractedInvoice> {
        let started = Instant::now();
        let outcome = self
            .recovery
            .recover(raw_text, error, &self.config.extraction);

        if !outcome.record.usable {
            info!(%error, "recovery unusable, returning none");
            return None;
        }

        // Even a recovered invoice ships with validation attached.
        let invoice = outcome.invoice;
        let validation = self.validator.validate(&invoice);
        let ratio = invoice.field_success_ratio();
        let invoice = invoice
            .with_validation(validation)
            .with_recovery(outcome.record)
            .with_performance(PerformanceMetrics {
                total_ms: started.elapsed().as_millis() as u64,
                stage_ms: vec![StageTiming {
                    stage: "recovery".to_string(),
                    ms: started.elapsed().as_millis() as u64,
                }],
                field_success_ratio: ratio,
            });
        Some(invoice)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// One routing table for every dispatch decision, with an explicit
/// fallback order:
///
/// 1. a resolved (format, subtype) pair selects its dedicated variant;
/// 2. an unresolved format falls back to the detected language;
/// 3. an unknown language falls back to the minimal extractor.
///
/// The returned depth records which rung was taken.
fn route(
    classification: &FormatClassification,
    detection: &LanguageDetection,
) -> (Box<dyn InvoiceExtractor>, u8) {
    match (classification.format, classification.subtype) {
        (InvoiceFormat::Domestic, _) => (Box::new(DomesticParser), 0),
        (InvoiceFormat::International, InvoiceSubtype::Business) => (
            Box::new(InternationalParser::business(detection.language)),
            0,
        ),
        (InvoiceFormat::International, _) => (
            Box::new(InternationalParser::consumer(detection.language)),
            0,
        ),
        (InvoiceFormat::None, _) => match detection.language {
            Language::English => (Box::new(DomesticParser), 1),
            Language::German | Language::French | Language::Spanish | Language::Italian => (
                Box::new(InternationalParser::consumer(detection.language)),
                1,
            ),
            Language::Unknown => (Box::new(MinimalParser), 2),
        },
    }
}

/// Accumulates per-stage wall times.
struct StageClock {
    last: Instant,
    timings: Vec<StageTiming>,
}

impl StageClock {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            timings: Vec::new(),
        }
    }

    fn lap(&mut self, stage: &str) {
        let now = Instant::now();
        self.timings.push(StageTiming {
            stage: stage.to_string(),
            ms: now.duration_since(self.last).as_millis() as u64,
        });
        self.last = now;
    }

    fn stage_names(&self) -> Vec<String> {
        self.timings.iter().map(|t| t.stage.clone()).collect()
    }

    fn into_timings(self) -> Vec<StageTiming> {
        self.timings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::models::classification::QualityLevel;

    fn options() -> ParseOptions {
        ParseOptions::default()
    }

    const DOMESTIC_ORDER: &str = "\
amazon.com
Order #123-4567890-1234567
Order Placed: December 15, 2023
Items Ordered
1 of: Echo Dot (4th Gen) $129.99
1 of: Smart Plug $29.99
Subtotal: $159.98
Shipping & Handling: $0.00
Tax: $12.80
Grand Total: $172.78";

    #[test]
    fn test_domestic_end_to_end() {
        let invoice = Pipeline::new().parse_invoice(DOMESTIC_ORDER, &options()).unwrap();

        assert_eq!(invoice.order_number.as_deref(), Some("123-4567890-1234567"));
        assert_eq!(invoice.order_date.as_deref(), Some("2023-12-15"));
        assert_eq!(invoice.total.as_deref(), Some("$172.78"));
        assert_eq!(invoice.vendor, "Amazon");

        let validation = invoice.validation.as_ref().unwrap();
        assert!(validation.is_valid, "findings: {:?}", validation.errors);

        let classification = invoice.classification.as_ref().unwrap();
        assert_eq!(classification.format, InvoiceFormat::Domestic);
        assert_eq!(invoice.processing.parser_variant, "domestic");
        assert_eq!(invoice.processing.fallback_depth, 0);
        assert!(invoice.performance.field_success_ratio > 0.9);
        assert!(!invoice.performance.stage_ms.is_empty());
    }

    #[test]
    fn test_international_consumer_end_to_end() {
        let text = "\
amazon.de
Bestellnummer: 304-1234567-7654321
Bestelldatum: 15. Dezember 2023
B0XY12ZT9Q Monitorhalterung
1176,46 €
176,46 €
Zwischensumme: 176,46 €
Versand: 0,00 €
Summe: 176,46 €
Vielen Dank für Ihre Bestellung";
        let invoice = Pipeline::new().parse_invoice(text, &options()).unwrap();

        assert_eq!(invoice.processing.parser_variant, "international_consumer");
        assert_eq!(invoice.items.len(), 1);
        // The dropped thousands separator was corrected against the
        // adjacent line total.
        assert_eq!(
            invoice.items[0].unit_price,
            Some(rust_decimal::Decimal::from_str_exact("176.46").unwrap())
        );
    }

    #[test]
    fn test_unresolved_format_language_fallback() {
        // No marketplace anchors or currency keywords, but clearly German.
        let text = "\
Der Kunde hat die Ware und die Lieferung für ihre Adresse erhalten
Bestellnummer: 304-1234567-7654321
Bestelldatum: 15. Dezember 2023";
        let invoice = Pipeline::new().parse_invoice(text, &options()).unwrap();
        assert_eq!(invoice.processing.fallback_depth, 1);
        assert_eq!(invoice.processing.parser_variant, "international_consumer");
        assert_eq!(invoice.order_number.as_deref(), Some("304-1234567-7654321"));
    }

    #[test]
    fn test_minimal_fallback_depth_two() {
        let text = "zzz qqq 123-4567890-1234567 2023-12-15 xxx 10,00 €";
        let invoice = Pipeline::new().parse_invoice(text, &options()).unwrap();
        assert_eq!(invoice.processing.fallback_depth, 2);
        assert_eq!(invoice.processing.parser_variant, "minimal");
    }

    #[test]
    fn test_empty_input_returns_none() {
        assert!(Pipeline::new().parse_invoice("", &options()).is_none());
        assert!(Pipeline::new().parse_invoice("   \n\t ", &options()).is_none());
    }

    #[test]
    fn test_unresolved_classification_quality() {
        let text = "Order #123-4567890-1234567 placed long ago";
        let invoice = Pipeline::new().parse_invoice(text, &options());
        // "order placed" is absent; scores stay below the cutoff, yet the
        // language fallback still extracts what it can.
        if let Some(invoice) = invoice {
            if let Some(c) = &invoice.classification {
                if c.format == InvoiceFormat::None {
                    assert_eq!(c.quality, QualityLevel::VeryLow);
                }
            }
        }
    }

    #[test]
    fn test_debug_flag_recorded() {
        let invoice = Pipeline::new()
            .parse_invoice(DOMESTIC_ORDER, &ParseOptions { debug: true })
            .unwrap();
        assert!(invoice.processing.debug);
    }

    struct FailingSource;

    impl DocumentSource for FailingSource {
        fn fetch(&self) -> std::result::Result<String, SourceError> {
            Err(SourceError::Unreadable("permission denied".to_string()))
        }

        fn describe(&self) -> String {
            "failing-source".to_string()
        }
    }

    #[test]
    fn test_source_failure_returns_none() {
        let result = Pipeline::new().process_document(&FailingSource, &options());
        assert!(result.is_none());
    }

    #[test]
    fn test_pipeline_is_shareable_across_threads() {
        let pipeline = std::sync::Arc::new(Pipeline::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = pipeline.clone();
                std::thread::spawn(move || {
                    pipeline.parse_invoice(DOMESTIC_ORDER, &ParseOptions::default())
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }
    }
}
