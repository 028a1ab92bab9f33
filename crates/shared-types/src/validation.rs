//! Intake validation states and the per-document transition trail

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Why a submitted document was refused at intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    UnsupportedType,
    MalwareDetected,
    ScanUnavailable,
    CorruptOrInvalid,
}

impl RejectReason {
    /// Stable reason code shown to users and written to logs
    pub fn code(self) -> &'static str {
        match self {
            RejectReason::UnsupportedType => "unsupported-type",
            RejectReason::MalwareDetected => "malware-detected",
            RejectReason::ScanUnavailable => "scan-unavailable",
            RejectReason::CorruptOrInvalid => "corrupt-or-invalid",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RejectReason::UnsupportedType => "File type not allowed. Only PDF files are accepted.",
            RejectReason::MalwareDetected => "File contains a virus.",
            RejectReason::ScanUnavailable => "File could not be scanned for malware.",
            RejectReason::CorruptOrInvalid => "Invalid or corrupted PDF file.",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Position of a document in the intake state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ValidationState {
    Received,
    ExtensionChecked,
    Scanned,
    StructurallyValid,
    Accepted,
    Rejected(RejectReason),
}

impl ValidationState {
    fn rank(self) -> u8 {
        match self {
            ValidationState::Received => 0,
            ValidationState::ExtensionChecked => 1,
            ValidationState::Scanned => 2,
            ValidationState::StructurallyValid => 3,
            ValidationState::Accepted => 4,
            ValidationState::Rejected(_) => 5,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ValidationState::Accepted | ValidationState::Rejected(_)
        )
    }

    /// Whether `next` is a legal successor of `self`.
    ///
    /// Checks advance one step at a time; any non-terminal state may jump
    /// straight to `Rejected`.
    pub fn can_advance_to(self, next: ValidationState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            ValidationState::Rejected(_) => true,
            _ => next.rank() == self.rank() + 1,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal intake transition from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: ValidationState,
    pub to: ValidationState,
}

/// One recorded state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub state: ValidationState,
    pub timestamp: String,
}

/// Forward-only record of the states a document passed through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationTrail {
    pub correlation_id: Uuid,
    records: Vec<TransitionRecord>,
}

impl ValidationTrail {
    pub fn new(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            records: vec![TransitionRecord {
                state: ValidationState::Received,
                timestamp: Utc::now().to_rfc3339(),
            }],
        }
    }

    pub fn current(&self) -> ValidationState {
        self.records
            .last()
            .map(|r| r.state)
            .unwrap_or(ValidationState::Received)
    }

    pub fn advance(&mut self, next: ValidationState) -> Result<(), TransitionError> {
        let from = self.current();
        if !from.can_advance_to(next) {
            return Err(TransitionError { from, to: next });
        }
        self.records.push(TransitionRecord {
            state: next,
            timestamp: Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    pub fn reject(&mut self, reason: RejectReason) -> Result<(), TransitionError> {
        self.advance(ValidationState::Rejected(reason))
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn states(&self) -> Vec<ValidationState> {
        self.records.iter().map(|r| r.state).collect()
    }

    pub fn is_accepted(&self) -> bool {
        self.current() == ValidationState::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trail_walks_forward_to_accepted() {
        let mut trail = ValidationTrail::new(Uuid::new_v4());
        trail.advance(ValidationState::ExtensionChecked).unwrap();
        trail.advance(ValidationState::Scanned).unwrap();
        trail.advance(ValidationState::StructurallyValid).unwrap();
        trail.advance(ValidationState::Accepted).unwrap();

        assert!(trail.is_accepted());
        assert_eq!(
            trail.states(),
            vec![
                ValidationState::Received,
                ValidationState::ExtensionChecked,
                ValidationState::Scanned,
                ValidationState::StructurallyValid,
                ValidationState::Accepted,
            ]
        );
    }

    #[test]
    fn test_trail_refuses_skipping_a_check() {
        let mut trail = ValidationTrail::new(Uuid::new_v4());
        let err = trail.advance(ValidationState::Scanned).unwrap_err();
        assert_eq!(err.from, ValidationState::Received);
        assert_eq!(trail.current(), ValidationState::Received);
    }

    #[test]
    fn test_trail_refuses_moving_backwards() {
        let mut trail = ValidationTrail::new(Uuid::new_v4());
        trail.advance(ValidationState::ExtensionChecked).unwrap();
        assert!(trail.advance(ValidationState::Received).is_err());
    }

    #[test]
    fn test_rejection_is_terminal() {
        let mut trail = ValidationTrail::new(Uuid::new_v4());
        trail.reject(RejectReason::UnsupportedType).unwrap();
        assert!(trail.current().is_terminal());
        assert!(trail.advance(ValidationState::ExtensionChecked).is_err());
        assert!(trail.reject(RejectReason::CorruptOrInvalid).is_err());
    }

    #[test]
    fn test_any_open_state_can_reject() {
        let mut trail = ValidationTrail::new(Uuid::new_v4());
        trail.advance(ValidationState::ExtensionChecked).unwrap();
        trail.advance(ValidationState::Scanned).unwrap();
        trail.reject(RejectReason::CorruptOrInvalid).unwrap();
        assert_eq!(
            trail.current(),
            ValidationState::Rejected(RejectReason::CorruptOrInvalid)
        );
    }

    #[test]
    fn test_reason_codes_are_stable() {
        assert_eq!(RejectReason::UnsupportedType.code(), "unsupported-type");
        assert_eq!(RejectReason::MalwareDetected.code(), "malware-detected");
        assert_eq!(RejectReason::ScanUnavailable.code(), "scan-unavailable");
        assert_eq!(RejectReason::CorruptOrInvalid.code(), "corrupt-or-invalid");
    }
}
