//! Core library for marketplace invoice extraction.
//!
//! This crate provides:
//! - Text preprocessing (locale-agnostic and format-aware passes)
//! - Weighted-signature format and subtype classification
//! - Locale-rule-driven field extraction (order number, dates, amounts,
//!   line items) across en/de/fr/es/it layouts
//! - Cross-field validation with data-quality scoring
//! - Field-by-field error recovery on pipeline failure
//!
//! [`Pipeline::parse_invoice`] is the sole entry point; everything else is
//! exposed for callers that need the individual stages.

pub mod classify;
pub mod error;
pub mod extract;
pub mod language;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod recovery;
pub mod source;
pub mod validate;

pub use classify::FormatClassifier;
pub use error::{ClassifyError, ExtractionError, OrdexError, Result, SourceError};
pub use language::{detect as detect_language, Language, LanguageDetection};
pub use models::classification::{FormatClassification, InvoiceFormat, InvoiceSubtype, QualityLevel};
pub use models::config::OrdexConfig;
pub use models::invoice::{ExtractedInvoice, LineItem, PerformanceMetrics, ProcessingMetadata};
pub use models::validation::{Finding, Severity, ValidationResult};
pub use pipeline::{ParseOptions, Pipeline};
pub use preprocess::{format_preprocess, light_preprocess};
pub use recovery::{ErrorCategory, RecoveryController, RecoveryRecord};
pub use source::{DocumentSource, FileDocumentSource};
pub use validate::ValidationEngine;
