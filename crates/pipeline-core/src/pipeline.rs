//! Orchestration of one document through intake, extraction,
//! classification and optional summarization

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use intake_core::{ClamdScanner, Gatekeeper, IntakeConfig};
use service_probe::AvailabilityProbe;
use shared_pdf::{extract_normalized, LopdfExtractor, PdfExtractBackend, TextExtractor};
use shared_types::Document;
use standards_engine::summary::render_summary;
use standards_engine::{classifier, StandardsEngine};
use summarizer_core::SummarizationDelegate;
use tracing::{error, info, info_span, warn};

use crate::config::{ExtractorBackend, PipelineConfig};
use crate::error::PipelineError;
use crate::report::{BatchFailure, BatchReport, PipelineReport, ServiceStatus};

pub struct Pipeline {
    output_dir: PathBuf,
    engine: StandardsEngine,
    gatekeeper: Gatekeeper,
    extractor: Box<dyn TextExtractor>,
    summarizer: SummarizationDelegate,
}

impl Pipeline {
    /// Wire every stage from configuration
    pub fn from_config(config: &PipelineConfig) -> anyhow::Result<Self> {
        let engine = match &config.standards.extra_rules {
            Some(path) => StandardsEngine::with_extra_rules(path)
                .with_context(|| format!("Failed to load rule file {}", path.display()))?,
            None => StandardsEngine::new(),
        };

        let retry = config.probe.retry_policy();
        let intake = IntakeConfig::new(&config.paths.staging_dir, &config.paths.intake_dir)
            .with_scan_policy(config.scan_policy);
        let mut gatekeeper = Gatekeeper::new(intake);
        if config.scanner.enabled {
            let scanner = ClamdScanner::new(
                &config.scanner.host,
                config.scanner.port,
                config.scanner.timeout(),
            );
            let probe = AvailabilityProbe::new("clamd", retry)
                .with_reprobe_on_call(config.probe.reprobe_on_call);
            gatekeeper = gatekeeper.with_scanner(Box::new(scanner), Arc::new(probe));
        }

        let summarizer_probe = AvailabilityProbe::new("summarizer", retry)
            .with_reprobe_on_call(config.probe.reprobe_on_call);
        let summarizer = SummarizationDelegate::from_config(
            config.summarization.clone(),
            Arc::new(summarizer_probe),
        )
        .context("Failed to configure summarization")?;

        let extractor: Box<dyn TextExtractor> = match config.extraction.backend {
            ExtractorBackend::Lopdf => Box::new(LopdfExtractor),
            ExtractorBackend::PdfExtract => Box::new(PdfExtractBackend),
        };

        Ok(Self {
            output_dir: config.paths.output_dir.clone(),
            engine,
            gatekeeper,
            extractor,
            summarizer,
        })
    }

    pub fn new(
        output_dir: impl Into<PathBuf>,
        engine: StandardsEngine,
        gatekeeper: Gatekeeper,
        summarizer: SummarizationDelegate,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            engine,
            gatekeeper,
            extractor: Box::new(LopdfExtractor),
            summarizer,
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn engine(&self) -> &StandardsEngine {
        &self.engine
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Probe the scanner and the summarizer with their full retry budgets
    pub fn probe_services(&self) -> ServiceStatus {
        ServiceStatus {
            scanner: self.gatekeeper.probe_scanner(),
            summarizer: self.summarizer.probe_service(),
        }
    }

    /// Run one document through every stage
    pub fn process(
        &self,
        document: Document,
        summarize: bool,
    ) -> Result<PipelineReport, PipelineError> {
        let span = info_span!(
            "document",
            correlation_id = %document.correlation_id,
            filename = %document.filename,
            form_type = %document.form_type
        );
        let _enter = span.enter();

        // Unknown form types stop here, before any file is written
        let standard = self.engine.standard(&document.form_type)?;

        info!("Intake started ({} bytes)", document.len());
        let accepted = self.gatekeeper.admit(&document)?;

        info!("Extracting text with {}", self.extractor.name());
        let text = match extract_normalized(self.extractor.as_ref(), accepted.path()) {
            Ok(text) => text,
            Err(e) => {
                error!("Extraction failed: {}", e);
                return Err(e.into());
            }
        };

        let summary = classifier::classify_text(&standard, &text);
        info!(
            "Classified against {}: {}/{} steps found",
            standard.form_type,
            summary.found_count(),
            summary.steps.len()
        );
        let rendered = render_summary(&standard, &summary);

        let summarization = if summarize {
            Some(self.summarizer.summarize(&text))
        } else {
            None
        };

        let output_path = write_output(&self.output_dir, accepted.stem(), &rendered)?;
        info!("Summary written to {}", output_path.display());

        Ok(PipelineReport {
            correlation_id: document.correlation_id,
            filename: accepted.filename.clone(),
            form_type: standard.form_type.clone(),
            summary,
            rendered,
            summarization,
            output_path,
            scan_bypassed: accepted.scan_bypassed,
        })
    }

    /// Read `path` from disk and process it
    pub fn process_file(
        &self,
        path: &Path,
        form_type: &str,
        summarize: bool,
    ) -> Result<PipelineReport, PipelineError> {
        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.process(Document::new(filename, form_type, bytes), summarize)
    }

    /// Process every `.pdf` in `dir`, in name order.
    ///
    /// A document that fails is recorded and the run continues. An unknown
    /// form type fails the whole run before any file is read.
    pub fn process_directory(
        &self,
        dir: &Path,
        form_type: &str,
    ) -> Result<BatchReport, PipelineError> {
        self.engine.standard(form_type)?;

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_pdf_extension(path))
            .collect();
        files.sort();
        info!("Batch of {} file(s) from {}", files.len(), dir.display());

        let mut report = BatchReport::default();
        for path in files {
            match self.process_file(&path, form_type, false) {
                Ok(processed) => report.processed.push(processed),
                Err(e) => {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    warn!("Skipping {} ({}): {}", filename, e.code(), e);
                    report.failures.push(BatchFailure {
                        filename,
                        code: e.code().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Batch finished: {} processed, {} failed",
            report.processed.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Write `<output_dir>/<stem>.txt` via a temp file and rename
fn write_output(output_dir: &Path, stem: &str, rendered: &str) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(output_dir)?;
    let dest = output_dir.join(format!("{}.txt", stem));

    let mut tmp = tempfile::NamedTempFile::new_in(output_dir)?;
    tmp.write_all(rendered.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(&dest).map_err(|e| e.error)?;

    Ok(dest)
}
