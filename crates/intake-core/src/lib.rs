//! Intake gatekeeper for submitted disclosure documents
//!
//! A submission is staged privately, scanned for malware, checked for PDF
//! structure and only then handed to extraction as an [`AcceptedDocument`].

pub mod error;
pub mod gatekeeper;
pub mod scanner;
pub mod staging;

pub use error::IntakeError;
pub use gatekeeper::{Gatekeeper, IntakeConfig};
pub use scanner::{ClamdScanner, MalwareScanner, ScanError, ScanPolicy, ScanVerdict};
pub use staging::{sanitize_filename, AcceptedDocument};
