//! Shared PDF handling utilities
//!
//! This crate provides the PDF plumbing used by the intake and extraction
//! stages: structural validation and normalized text extraction.

pub mod extract;
pub mod structure;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use extract::{
    extract_normalized, normalize_text, ExtractionError, LopdfExtractor, PdfExtractBackend,
    TextExtractor,
};
pub use structure::{validate_file, validate_structure, PdfInfo, StructureError};
