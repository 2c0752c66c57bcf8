//! Extraction engine: locale rule tables, field rules, parser variants.

pub mod locale;
pub mod rules;
mod variants;

pub use variants::{DomesticParser, InternationalParser, InvoiceExtractor, MinimalParser};
