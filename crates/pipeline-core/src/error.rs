//! Error types for the pipeline orchestrator

use intake_core::IntakeError;
use shared_pdf::ExtractionError;
use shared_types::RejectReason;
use standards_engine::ConfigurationError;
use thiserror::Error;

/// Hard failures for a single document.
///
/// Soft outcomes (no step matched, summarization unavailable) are data on
/// the report, not errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Configuration(e) => e.code(),
            PipelineError::Intake(e) => e.code(),
            PipelineError::Extraction(e) => e.code(),
            PipelineError::Output(_) => "output",
        }
    }

    /// Intake rejection reason, when the document itself was refused
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            PipelineError::Intake(e) => e.reason(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through_from_stage_errors() {
        let err: PipelineError = ConfigurationError::UnknownFormType("xyz".into()).into();
        assert_eq!(err.code(), "unknown-form-type");

        let err: PipelineError = IntakeError::rejected(RejectReason::ScanUnavailable, "down").into();
        assert_eq!(err.code(), "scan-unavailable");

        let err: PipelineError = std::io::Error::other("read-only").into();
        assert_eq!(err.code(), "output");
        assert_eq!(err.reject_reason(), None);
    }

    #[test]
    fn test_reject_reason_only_for_intake_rejections() {
        let err: PipelineError = IntakeError::rejected(RejectReason::MalwareDetected, "x").into();
        assert_eq!(err.reject_reason(), Some(RejectReason::MalwareDetected));

        let err: PipelineError = IntakeError::InvalidFormType("a b".into()).into();
        assert_eq!(err.reject_reason(), None);
    }
}
