//! Rule-based field extractors, parameterized by per-locale rule tables.

pub mod amounts;
pub mod dates;
pub mod items;
pub mod order_number;
pub mod patterns;

pub use amounts::{extract_totals, parse_amount_str, InvoiceTotals, MoneyMatch};
pub use dates::extract_order_date;
pub use items::extract_items;
pub use order_number::{extract_order_number, is_valid_order_number};

/// A single extracted candidate with provenance.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
