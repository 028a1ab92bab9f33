use std::path::PathBuf;

use serde::Serialize;
use shared_types::{ExtractionSummary, ServiceAvailability, SummarizationOutcome};
use uuid::Uuid;

/// Result of processing one document
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub correlation_id: Uuid,
    pub filename: String,
    pub form_type: String,
    pub summary: ExtractionSummary,
    /// One line per step, in rule-table order
    pub rendered: String,
    /// `None` when summarization was not requested
    pub summarization: Option<SummarizationOutcome>,
    pub output_path: PathBuf,
    pub scan_bypassed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub filename: String,
    pub code: String,
    pub message: String,
}

/// Outcome of a directory run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: Vec<PipelineReport>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub scanner: ServiceAvailability,
    pub summarizer: ServiceAvailability,
}
