//! Error types for document intake

use shared_types::RejectReason;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    /// The document failed one of the intake checks
    #[error("{reason}: {detail}")]
    Rejected { reason: RejectReason, detail: String },

    #[error("Invalid form type for storage: {0}")]
    InvalidFormType(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntakeError {
    pub fn rejected(reason: RejectReason, detail: impl Into<String>) -> Self {
        IntakeError::Rejected {
            reason,
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            IntakeError::Rejected { reason, .. } => reason.code(),
            IntakeError::InvalidFormType(_) => "unknown-form-type",
            IntakeError::Storage(_) => "storage",
        }
    }

    /// Rejection reason, if the document itself was refused
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            IntakeError::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_code_follows_reason() {
        let err = IntakeError::rejected(RejectReason::MalwareDetected, "Eicar FOUND");
        assert_eq!(err.code(), "malware-detected");
        assert_eq!(err.reason(), Some(RejectReason::MalwareDetected));
        assert_eq!(err.to_string(), "malware-detected: Eicar FOUND");
    }

    #[test]
    fn test_storage_error_has_no_reason() {
        let err = IntakeError::from(std::io::Error::other("disk full"));
        assert_eq!(err.code(), "storage");
        assert!(err.reason().is_none());
    }
}
