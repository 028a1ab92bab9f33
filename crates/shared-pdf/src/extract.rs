//! Plain-text extraction from accepted documents
//!
//! Two interchangeable backends sit behind [`TextExtractor`]:
//! - [`LopdfExtractor`]: walks the page tree in order and decodes each page (default)
//! - [`PdfExtractBackend`]: whole-document extraction via `pdf-extract`
//!
//! Callers should go through [`extract_normalized`], which applies the
//! whitespace normalization the rule patterns rely on.

use std::path::Path;

use lopdf::Document;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("No text content in {path}")]
    EmptyContent { path: String },
}

impl ExtractionError {
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::Unreadable { .. } => "unreadable",
            ExtractionError::EmptyContent { .. } => "empty-content",
        }
    }

    fn unreadable(path: &Path, reason: impl ToString) -> Self {
        ExtractionError::Unreadable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A backend capable of turning a document on disk into raw text
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Page-by-page extraction using lopdf's text decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        // The document is dropped on every return path below
        let doc = Document::load(path).map_err(|e| ExtractionError::unreadable(path, e))?;

        let pages = doc.get_pages();
        let mut text = String::new();
        for &page_number in pages.keys() {
            debug!("Extracting text from page {}", page_number);
            let page_text = doc
                .extract_text(&[page_number])
                .map_err(|e| ExtractionError::unreadable(path, format!("page {}: {}", page_number, e)))?;
            text.push_str(&page_text);
            text.push('\n');
        }

        Ok(text)
    }
}

/// Whole-document extraction using `pdf-extract` (better CID font coverage)
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractBackend;

impl TextExtractor for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractionError::unreadable(path, e))?;
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractionError::unreadable(path, e))
    }
}

/// Collapse every whitespace run to a single space and trim the ends
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract and normalize; whitespace-only output becomes `EmptyContent`
pub fn extract_normalized(
    extractor: &dyn TextExtractor,
    path: &Path,
) -> Result<String, ExtractionError> {
    info!("Extracting text from {} ({})", path.display(), extractor.name());
    let raw = extractor.extract(path)?;
    let text = normalize_text(&raw);
    if text.is_empty() {
        return Err(ExtractionError::EmptyContent {
            path: path.display().to_string(),
        });
    }
    info!("Extracted {} characters", text.chars().count());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{pdf_with_pages, truncated_pdf};
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_normalize_collapses_whitespace_runs() {
        assert_eq!(
            normalize_text("  contract \n\n with\tthe   customer \r\n"),
            "contract with the customer"
        );
    }

    #[test]
    fn test_normalize_whitespace_only_is_empty() {
        assert_eq!(normalize_text(" \n\t  "), "");
    }

    #[test]
    fn test_lopdf_extracts_pages_in_order() {
        let file = write_temp(&pdf_with_pages(&["first page", "second page", "third page"]));
        let text = extract_normalized(&LopdfExtractor, file.path()).unwrap();

        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        let third = text.find("third").unwrap();
        assert!(first < second && second < third, "got: {}", text);
    }

    #[test]
    fn test_output_is_single_spaced() {
        let file = write_temp(&pdf_with_pages(&["alpha", "beta"]));
        let text = extract_normalized(&LopdfExtractor, file.path()).unwrap();
        assert!(!text.contains("  "));
        assert!(!text.contains('\n'));
        assert_eq!(text, text.trim());
    }

    #[test]
    fn test_empty_document_is_empty_content() {
        let file = write_temp(&pdf_with_pages(&[" "]));
        let err = extract_normalized(&LopdfExtractor, file.path()).unwrap_err();
        assert_eq!(err.code(), "empty-content");
    }

    #[test]
    fn test_corrupt_document_is_unreadable() {
        let file = write_temp(&truncated_pdf());
        let err = extract_normalized(&LopdfExtractor, file.path()).unwrap_err();
        assert_eq!(err.code(), "unreadable");

        let err = extract_normalized(&PdfExtractBackend, file.path()).unwrap_err();
        assert_eq!(err.code(), "unreadable");
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let err = LopdfExtractor
            .extract(Path::new("/nonexistent/never.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable { .. }));
    }
}
