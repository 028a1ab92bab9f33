use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submitted document awaiting intake.
///
/// The byte content is immutable once submitted; the correlation id keys the
/// per-request staging and intake directories as well as the log span.
#[derive(Debug, Clone)]
pub struct Document {
    pub correlation_id: Uuid,
    pub filename: String,
    pub form_type: String,
    bytes: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, form_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            filename: filename.into(),
            form_type: form_type.into(),
            bytes,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Classification outcome for a single step of a standard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub matched_spans: Vec<String>,
    pub found: bool,
}

impl StepResult {
    pub fn found(step_name: impl Into<String>, matched_spans: Vec<String>) -> Self {
        let found = !matched_spans.is_empty();
        Self {
            step_name: step_name.into(),
            matched_spans,
            found,
        }
    }

    pub fn not_found(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            matched_spans: Vec::new(),
            found: false,
        }
    }
}

/// Ordered step results for one document, one entry per rule in table order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub form_type: String,
    pub steps: Vec<StepResult>,
}

impl ExtractionSummary {
    pub fn found_count(&self) -> usize {
        self.steps.iter().filter(|s| s.found).count()
    }

    pub fn step(&self, name: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.step_name == name)
    }
}

/// Reachability of an optional external collaborator (scanner, summarizer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAvailability {
    #[default]
    Unknown,
    Probing,
    Unavailable,
    Available,
}

impl ServiceAvailability {
    pub fn is_available(self) -> bool {
        self == ServiceAvailability::Available
    }
}

impl std::fmt::Display for ServiceAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceAvailability::Unknown => "unknown",
            ServiceAvailability::Probing => "probing",
            ServiceAvailability::Unavailable => "unavailable",
            ServiceAvailability::Available => "available",
        };
        f.write_str(s)
    }
}

/// Result of asking the external summarization service for a summary.
///
/// `Disabled` (no credential configured) and `Unavailable` (service not
/// reachable) are reported separately because operators fix them differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SummarizationOutcome {
    Disabled,
    Unavailable,
    Success(String),
    Failure(String),
}

impl SummarizationOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            SummarizationOutcome::Success(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_get_distinct_correlation_ids() {
        let a = Document::new("a.pdf", "asc606", vec![1, 2, 3]);
        let b = Document::new("a.pdf", "asc606", vec![1, 2, 3]);
        assert_ne!(a.correlation_id, b.correlation_id);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_step_result_with_no_spans_is_not_found() {
        let step = StepResult::found("Identify Contract", vec![]);
        assert!(!step.found);

        let step = StepResult::not_found("Identify Contract");
        assert!(step.matched_spans.is_empty());
    }

    #[test]
    fn test_summarization_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&SummarizationOutcome::Failure(
            "malformed-response".into(),
        ))
        .unwrap();
        assert_eq!(json, r#"{"status":"failure","detail":"malformed-response"}"#);

        let json = serde_json::to_string(&SummarizationOutcome::Disabled).unwrap();
        assert_eq!(json, r#"{"status":"disabled"}"#);
    }

    #[test]
    fn test_availability_defaults_to_unknown() {
        assert_eq!(ServiceAvailability::default(), ServiceAvailability::Unknown);
        assert!(!ServiceAvailability::Probing.is_available());
        assert_eq!(ServiceAvailability::Unavailable.to_string(), "unavailable");
    }
}
