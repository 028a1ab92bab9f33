pub mod types;
pub mod validation;

pub use types::{
    Document, ExtractionSummary, ServiceAvailability, StepResult, SummarizationOutcome,
};
pub use validation::{
    RejectReason, TransitionError, TransitionRecord, ValidationState, ValidationTrail,
};
