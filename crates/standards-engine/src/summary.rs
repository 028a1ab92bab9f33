//! Plain-text rendering of extraction summaries
//!
//! One line per step, in rule-table order:
//!
//! ```text
//! Identify Contract: contract with the customer; agreement between the parties
//! Performance Obligations: Not Found
//! ```

use shared_types::{ExtractionSummary, StepResult};

use crate::rules::Standard;

pub const SPAN_DELIMITER: &str = "; ";
pub const NOT_FOUND: &str = "Not Found";

/// Render one step line
pub fn render_step(standard: &Standard, result: &StepResult) -> String {
    if result.found {
        format!(
            "{}: {}",
            result.step_name,
            result.matched_spans.join(SPAN_DELIMITER)
        )
    } else {
        let label = standard
            .steps
            .iter()
            .find(|rule| rule.name == result.step_name)
            .map(|rule| rule.label.as_str())
            .unwrap_or(result.step_name.as_str());
        format!("{}: {}", label, NOT_FOUND)
    }
}

/// Render a whole summary, newline separated, in the order of `summary.steps`
pub fn render_summary(standard: &Standard, summary: &ExtractionSummary) -> String {
    summary
        .steps
        .iter()
        .map(|step| render_step(standard, step))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recover step names, in order, from rendered text.
///
/// A line is attributed to a step if it starts with that step's name or its
/// "Not Found" label followed by `": "`. Unrecognised lines are skipped.
pub fn parse_step_names(standard: &Standard, rendered: &str) -> Vec<String> {
    rendered
        .lines()
        .filter_map(|line| {
            standard
                .steps
                .iter()
                .find(|rule| {
                    has_heading(line, &rule.name) || has_heading(line, &rule.label)
                })
                .map(|rule| rule.name.clone())
        })
        .collect()
}

fn has_heading(line: &str, heading: &str) -> bool {
    line.strip_prefix(heading)
        .map(|rest| rest.starts_with(": "))
        .unwrap_or(false)
}
