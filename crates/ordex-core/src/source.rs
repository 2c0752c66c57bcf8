//! Text-extraction collaborator interface.
//!
//! Upstream document-to-text conversion lives outside this crate; the core
//! only sees an opaque text fetch that may fail. Source failures map to the
//! critical recovery category.

use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// A handle to a document whose text can be fetched once per call.
pub trait DocumentSource {
    /// Fetch the raw document text.
    fn fetch(&self) -> Result<String, SourceError>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;
}

/// Document source backed by a UTF-8 text file.
pub struct FileDocumentSource {
    path: PathBuf,
}

impl FileDocumentSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DocumentSource for FileDocumentSource {
    fn fetch(&self) -> Result<String, SourceError> {
        std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => {
                SourceError::Corrupt(format!("{}: not valid UTF-8", self.path.display()))
            }
            _ => SourceError::Io(e),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_source_error() {
        let source = FileDocumentSource::new("/nonexistent/invoice.txt");
        assert!(source.fetch().is_err());
    }
}
