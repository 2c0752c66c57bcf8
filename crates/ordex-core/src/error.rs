//! Error types for the ordex-core library.

use thiserror::Error;

/// Main error type for the ordex library.
#[derive(Error, Debug)]
pub enum OrdexError {
    /// Document source error (unreadable or corrupt input).
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Format classification error.
    #[error("classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// Invoice field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the text-extraction collaborator.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The document could not be read at all.
    #[error("unreadable document: {0}")]
    Unreadable(String),

    /// The document was read but its content is corrupt.
    #[error("corrupt document: {0}")]
    Corrupt(String),

    /// I/O error while fetching the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the format classifier.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Classification was asked to run on blank input.
    #[error("empty input text")]
    EmptyInput,
}

/// Errors related to invoice field extraction.
///
/// Shape mismatches on individual candidates are never surfaced here;
/// they are silent no-matches inside their own strategy.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// No invoice data could be extracted at all.
    #[error("no invoice data found")]
    NoData,
}

impl OrdexError {
    /// Whether this error is unrecoverable (input/file access).
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            OrdexError::Source(_) | OrdexError::Classify(ClassifyError::EmptyInput)
        )
    }
}

/// Result type for the ordex library.
pub type Result<T> = std::result::Result<T, OrdexError>;
