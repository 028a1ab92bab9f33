//! Structural validation of submitted PDFs
//!
//! Confirms that a file is a well-formed PDF with at least one page before it
//! is trusted for extraction.

use lopdf::Document;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StructureError {
    #[error("File too small to be a valid PDF")]
    TooSmall,

    #[error("Not a valid PDF file (missing %PDF- header)")]
    MissingHeader,

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF has no pages")]
    NoPages,
}

/// Facts gathered while validating a PDF
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PdfInfo {
    pub page_count: u32,
    /// PDF version string from the header (e.g., "1.7")
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
}

/// Validate a PDF held in memory
pub fn validate_structure(bytes: &[u8]) -> Result<PdfInfo, StructureError> {
    if bytes.len() < 8 {
        return Err(StructureError::TooSmall);
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(StructureError::MissingHeader);
    }

    let version = extract_version(bytes);

    let document = Document::load_mem(bytes).map_err(|e| StructureError::Parse(e.to_string()))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(StructureError::NoPages);
    }

    Ok(PdfInfo {
        page_count,
        version,
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
    })
}

/// Validate a PDF on disk
pub fn validate_file(path: &std::path::Path) -> Result<PdfInfo, StructureError> {
    let bytes = std::fs::read(path).map_err(|e| StructureError::Parse(e.to_string()))?;
    validate_structure(&bytes)
}

// Header format: %PDF-1.7
fn extract_version(bytes: &[u8]) -> String {
    std::str::from_utf8(&bytes[5..8])
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| "1.4".to_string())
}
