// Section classification: one StepResult per step rule, in table order
use shared_types::{ExtractionSummary, StepResult};
use tracing::{debug, info, warn};

use crate::error::ConfigurationError;
use crate::rules::{RuleBook, Standard, StepRule};

/// Classify normalized text against the standard registered for `form_type`
pub fn classify(
    book: &RuleBook,
    form_type: &str,
    text: &str,
) -> Result<ExtractionSummary, ConfigurationError> {
    let standard = book.get(form_type)?;
    Ok(classify_text(&standard, text))
}

/// Classify normalized text against one standard.
///
/// Pure: no I/O and no state, so identical input always yields an identical
/// summary. A step with no matches is recorded as not found, never an error.
pub fn classify_text(standard: &Standard, text: &str) -> ExtractionSummary {
    info!("Classifying text against {}", standard.form_type);

    let steps = standard
        .steps
        .iter()
        .map(|rule| {
            let spans = collect_matches(rule, text);
            if spans.is_empty() {
                warn!("No matches found for step: {}", rule.name);
                StepResult::not_found(&rule.name)
            } else {
                debug!("Matches found for {}: {:?}", rule.name, spans);
                StepResult::found(&rule.name, spans)
            }
        })
        .collect();

    ExtractionSummary {
        form_type: standard.form_type.clone(),
        steps,
    }
}

/// Every non-overlapping match of every pattern, pattern order first
fn collect_matches(rule: &StepRule, text: &str) -> Vec<String> {
    let mut spans = Vec::new();
    for pattern in &rule.patterns {
        let before = spans.len();
        spans.extend(pattern.find_iter(text).map(|m| m.as_str().to_string()));
        if spans.len() > before {
            debug!(
                "Pattern '{}' matched {} time(s)",
                pattern.as_str(),
                spans.len() - before
            );
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn book() -> &'static RuleBook {
        RuleBook::builtin()
    }

    #[test]
    fn test_identifies_contract_with_customer() {
        let text = "We have a contract with the customer for delivery of software.";
        let summary = classify(book(), "asc606", text).unwrap();

        let step = summary.step("Identify Contract").unwrap();
        assert!(step.found);
        assert_eq!(step.matched_spans, vec!["contract with the customer"]);
    }

    #[test]
    fn test_missing_step_is_not_found() {
        let summary = classify(book(), "asc606", "Nothing relevant here.").unwrap();
        assert!(summary.steps.iter().all(|s| !s.found));
        assert!(summary.steps.iter().all(|s| s.matched_spans.is_empty()));
    }

    #[test]
    fn test_collects_all_matches_in_pattern_order() {
        // Second pattern's match appears first in the text, but pattern order wins
        let text = "An agreement between the parties. Later, a contract with our customer. \
                    Then another contract with a customer.";
        let summary = classify(book(), "asc606", text).unwrap();
        let step = summary.step("Identify Contract").unwrap();
        assert_eq!(
            step.matched_spans,
            vec![
                "contract with our customer",
                "contract with a customer",
                "agreement between the parties",
            ]
        );
    }

    #[test]
    fn test_one_result_per_step_in_table_order() {
        let text = "revenue recognition occurs upon delivery; revenue recognition when shipped";
        let summary = classify(book(), "asc606", text).unwrap();
        let names: Vec<_> = summary.steps.iter().map(|s| s.step_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Identify Contract",
                "Identify Performance Obligations",
                "Determine Transaction Price",
                "Allocate Transaction Price",
                "Recognize Revenue",
            ]
        );
        assert_eq!(summary.step("Recognize Revenue").unwrap().matched_spans.len(), 2);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let summary = classify(book(), "asc450", "A CONTINGENT LIABILITY was recorded.").unwrap();
        let step = summary.step("Contingency Identification").unwrap();
        assert_eq!(step.matched_spans, vec!["CONTINGENT LIABILITY"]);
    }

    #[test]
    fn test_unknown_form_type_fails() {
        let err = classify(book(), "xyz", "anything").unwrap_err();
        assert_eq!(err.code(), "unknown-form-type");
    }

    #[test]
    fn test_summary_records_form_type() {
        let summary = classify(book(), "IFRS15", "").unwrap();
        assert_eq!(summary.form_type, "ifrs15");
        assert_eq!(summary.found_count(), 0);
    }
}
