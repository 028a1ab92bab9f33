//! Subcommand handlers and their console output

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;

use pipeline_core::{BatchReport, Pipeline, PipelineError, PipelineReport};
use shared_types::SummarizationOutcome;
use standards_engine::StandardsEngine;

pub fn parse(
    pipeline: &Pipeline,
    file: &Path,
    form_type: &str,
    summarize: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    match pipeline.process_file(file, form_type, summarize) {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", format_report(&report));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprint!("{}", format_error(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn batch(pipeline: &Pipeline, dir: &Path, form_type: &str) -> anyhow::Result<ExitCode> {
    match pipeline.process_directory(dir, form_type) {
        Ok(report) => {
            print!("{}", format_batch(&report));
            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(e) => {
            eprint!("{}", format_error(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// `Error [<code>]: <message>`, plus the user-facing reason for rejections
pub fn format_error(err: &PipelineError) -> String {
    let mut out = format!("Error [{}]: {}\n", err.code(), err);
    if let Some(reason) = err.reject_reason() {
        let _ = writeln!(out, "{}", reason.message());
    }
    out
}

pub fn format_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.rendered);
    if let Some(outcome) = &report.summarization {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", format_outcome(outcome));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Saved to {}", report.output_path.display());
    out
}

pub fn format_outcome(outcome: &SummarizationOutcome) -> String {
    match outcome {
        SummarizationOutcome::Success(text) => format!("AI Summary:\n{}", text),
        SummarizationOutcome::Disabled => {
            "AI Summary: disabled (no API key configured)".to_string()
        }
        SummarizationOutcome::Unavailable => {
            "AI Summary: service unavailable".to_string()
        }
        SummarizationOutcome::Failure(reason) => format!("AI Summary failed: {}", reason),
    }
}

pub fn format_batch(report: &BatchReport) -> String {
    let mut out = String::new();
    for processed in &report.processed {
        let _ = writeln!(
            out,
            "ok      {} -> {}",
            processed.filename,
            processed.output_path.display()
        );
    }
    for failure in &report.failures {
        let _ = writeln!(out, "failed  {} [{}]", failure.filename, failure.code);
    }
    let _ = writeln!(
        out,
        "Processed {} of {} file(s), {} failed",
        report.processed.len(),
        report.total(),
        report.failures.len()
    );
    out
}

pub fn format_standards(engine: &StandardsEngine) -> String {
    let mut out = String::new();
    for standard in engine.rules().iter() {
        let _ = writeln!(out, "{:<10} {}", standard.form_type, standard.title);
        for (i, step) in standard.steps.iter().enumerate() {
            let _ = writeln!(out, "    {}. {}", i + 1, step.name);
        }
    }
    out
}
