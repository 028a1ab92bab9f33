//! Disclosure processing pipeline
//!
//! Ties the stages together for one document at a time: intake gatekeeper,
//! text extraction, section classification against the selected standard
//! and, when asked, an external summary reported next to the result.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::{
    ExtractionConfig, ExtractorBackend, LoggingConfig, PathsConfig, PipelineConfig, ProbeConfig,
    ScannerConfig, StandardsConfig,
};
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use report::{BatchFailure, BatchReport, PipelineReport, ServiceStatus};
