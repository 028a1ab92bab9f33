//! The intake gatekeeper
//!
//! Checks run in a fixed order and short-circuit on the first failure:
//! extension, isolated staging, malware scan, structural validity. Only a
//! document that clears all of them is moved into the intake tree.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use service_probe::{AvailabilityProbe, RetryPolicy};
use shared_types::{Document, RejectReason, ServiceAvailability, ValidationState, ValidationTrail};
use tracing::{debug, error, info, warn};

use crate::error::IntakeError;
use crate::scanner::{MalwareScanner, ScanPolicy, ScanVerdict};
use crate::staging::{promote, sanitize_filename, AcceptedDocument, StagedFile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    pub staging_root: PathBuf,
    pub intake_root: PathBuf,
    pub scan_policy: ScanPolicy,
}

impl IntakeConfig {
    pub fn new(staging_root: impl Into<PathBuf>, intake_root: impl Into<PathBuf>) -> Self {
        Self {
            staging_root: staging_root.into(),
            intake_root: intake_root.into(),
            scan_policy: ScanPolicy::default(),
        }
    }

    pub fn with_scan_policy(mut self, policy: ScanPolicy) -> Self {
        self.scan_policy = policy;
        self
    }
}

/// Outcome of the scan stage that lets the document continue
enum ScanOutcome {
    Clean,
    Bypassed,
}

pub struct Gatekeeper {
    config: IntakeConfig,
    scanner: Option<Box<dyn MalwareScanner>>,
    scanner_probe: Arc<AvailabilityProbe>,
}

impl Gatekeeper {
    /// Gatekeeper without a scanner; the scan policy decides every document
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            config,
            scanner: None,
            scanner_probe: Arc::new(AvailabilityProbe::new("clamd", RetryPolicy::default())),
        }
    }

    pub fn with_scanner(
        mut self,
        scanner: Box<dyn MalwareScanner>,
        probe: Arc<AvailabilityProbe>,
    ) -> Self {
        self.scanner = Some(scanner);
        self.scanner_probe = probe;
        self
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub fn scanner_probe(&self) -> &Arc<AvailabilityProbe> {
        &self.scanner_probe
    }

    /// Probe the scanner with the full retry policy (startup)
    pub fn probe_scanner(&self) -> ServiceAvailability {
        match &self.scanner {
            Some(scanner) => self.scanner_probe.probe(scanner.endpoint()),
            None => {
                self.scanner_probe.mark_unavailable("no scanner configured");
                ServiceAvailability::Unavailable
            }
        }
    }

    /// Run every intake check against `document`
    pub fn admit(&self, document: &Document) -> Result<AcceptedDocument, IntakeError> {
        let mut trail = ValidationTrail::new(document.correlation_id);

        let filename = match sanitize_filename(&document.filename) {
            Some(name) => name,
            None => {
                return Err(reject(
                    &mut trail,
                    RejectReason::UnsupportedType,
                    format!("'{}' is not a PDF file name", document.filename),
                ))
            }
        };
        let form_type = storage_component(&document.form_type)?;
        advance(&mut trail, ValidationState::ExtensionChecked);

        let staged = StagedFile::write(
            &self.config.staging_root,
            document.correlation_id,
            &filename,
            document.bytes(),
        )?;

        let scan_bypassed = match self.scan(document.bytes()) {
            Ok(ScanOutcome::Clean) => false,
            Ok(ScanOutcome::Bypassed) => true,
            Err((reason, detail)) => return Err(reject(&mut trail, reason, detail)),
        };
        advance(&mut trail, ValidationState::Scanned);

        let info = match shared_pdf::validate_file(staged.path()) {
            Ok(info) => info,
            Err(e) => {
                return Err(reject(
                    &mut trail,
                    RejectReason::CorruptOrInvalid,
                    e.to_string(),
                ))
            }
        };
        debug!("Structure ok: {} page(s), PDF {}", info.page_count, info.version);
        advance(&mut trail, ValidationState::StructurallyValid);

        let dir = self
            .config
            .intake_root
            .join(&form_type)
            .join(document.correlation_id.to_string());
        fs::create_dir_all(&dir)?;
        let path = dir.join(&filename);
        if let Err(e) = promote(&staged, &path) {
            let _ = fs::remove_dir_all(&dir);
            return Err(e.into());
        }
        advance(&mut trail, ValidationState::Accepted);

        info!("Accepted {} ({} bytes)", filename, document.len());
        Ok(AcceptedDocument {
            correlation_id: document.correlation_id,
            filename,
            form_type,
            info,
            scan_bypassed,
            path,
            dir,
            trail,
        })
    }

    fn scan(&self, bytes: &[u8]) -> Result<ScanOutcome, (RejectReason, String)> {
        let scanner = match &self.scanner {
            Some(scanner) => scanner,
            None => return self.scan_unavailable("no scanner configured"),
        };

        if !self.scanner_probe.check(scanner.endpoint()).is_available() {
            return self.scan_unavailable("scanner unavailable");
        }

        match scanner.scan(bytes) {
            Ok(ScanVerdict::Clean) => {
                debug!("Scan clean");
                Ok(ScanOutcome::Clean)
            }
            Ok(ScanVerdict::Infected(signature)) => Err((
                RejectReason::MalwareDetected,
                format!("{} FOUND", signature),
            )),
            Err(e) if e.is_service_failure() => {
                self.scanner_probe.mark_unavailable(&e.to_string());
                self.scan_unavailable(&e.to_string())
            }
            Err(e) => {
                warn!("{}", e);
                self.scan_unavailable(&e.to_string())
            }
        }
    }

    fn scan_unavailable(&self, detail: &str) -> Result<ScanOutcome, (RejectReason, String)> {
        match self.config.scan_policy {
            ScanPolicy::FailOpen => {
                warn!("Malware scan bypassed under fail-open policy: {}", detail);
                Ok(ScanOutcome::Bypassed)
            }
            ScanPolicy::FailClosed => Err((RejectReason::ScanUnavailable, detail.to_string())),
        }
    }
}

fn advance(trail: &mut ValidationTrail, next: ValidationState) {
    if let Err(e) = trail.advance(next) {
        warn!("{}", e);
    }
}

fn reject(trail: &mut ValidationTrail, reason: RejectReason, detail: String) -> IntakeError {
    advance(trail, ValidationState::Rejected(reason));
    error!("Rejected ({}): {}", reason.code(), detail);
    debug!("Validation trail: {:?}", trail.states());
    IntakeError::rejected(reason, detail)
}

fn storage_component(form_type: &str) -> Result<String, IntakeError> {
    let normalized = form_type.trim().to_ascii_lowercase();
    let valid = !normalized.is_empty()
        && normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(normalized)
    } else {
        Err(IntakeError::InvalidFormType(form_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{fake, ClamdScanner, ScanError};
    use pretty_assertions::assert_eq;
    use service_probe::{ProbeError, ServiceEndpoint};
    use shared_pdf::fixtures::{pdf_with_text, truncated_pdf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        config: IntakeConfig,
    }

    fn fixture(policy: ScanPolicy) -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let config = IntakeConfig::new(root.path().join("staging"), root.path().join("intake"))
            .with_scan_policy(policy);
        Fixture {
            _root: root,
            config,
        }
    }

    fn quick_probe() -> Arc<AvailabilityProbe> {
        Arc::new(AvailabilityProbe::new(
            "clamd",
            RetryPolicy::new(1, Duration::ZERO),
        ))
    }

    fn scanning_gatekeeper(config: IntakeConfig) -> Gatekeeper {
        let port = fake::spawn_clamd();
        let scanner = ClamdScanner::new("127.0.0.1", port, Duration::from_secs(2));
        Gatekeeper::new(config).with_scanner(Box::new(scanner), quick_probe())
    }

    fn unreachable_gatekeeper(config: IntakeConfig) -> Gatekeeper {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let scanner = ClamdScanner::new("127.0.0.1", port, Duration::from_millis(200));
        Gatekeeper::new(config).with_scanner(Box::new(scanner), quick_probe())
    }

    /// Scanner whose first scan drops the connection
    #[derive(Default)]
    struct FlakyScanner {
        handshakes: AtomicUsize,
        scans: AtomicUsize,
    }

    impl ServiceEndpoint for FlakyScanner {
        fn name(&self) -> &str {
            "flaky"
        }

        fn is_present(&self) -> bool {
            true
        }

        fn handshake(&self) -> Result<(), ProbeError> {
            self.handshakes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl MalwareScanner for FlakyScanner {
        fn endpoint(&self) -> &dyn ServiceEndpoint {
            self
        }

        fn scan(&self, _bytes: &[u8]) -> Result<ScanVerdict, ScanError> {
            if self.scans.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ScanError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )))
            } else {
                Ok(ScanVerdict::Clean)
            }
        }
    }

    /// Lets a test keep a handle on the scanner it hands to the gatekeeper
    struct SharedScanner(Arc<FlakyScanner>);

    impl MalwareScanner for SharedScanner {
        fn endpoint(&self) -> &dyn ServiceEndpoint {
            self.0.as_ref()
        }

        fn scan(&self, bytes: &[u8]) -> Result<ScanVerdict, ScanError> {
            self.0.scan(bytes)
        }
    }

    fn pdf(name: &str) -> Document {
        Document::new(name, "asc606", pdf_with_text("contract with the customer"))
    }

    fn staging_is_empty(config: &IntakeConfig) -> bool {
        fs::read_dir(&config.staging_root)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    #[test]
    fn test_clean_pdf_is_accepted_into_intake_tree() {
        let fx = fixture(ScanPolicy::FailClosed);
        let gatekeeper = scanning_gatekeeper(fx.config.clone());
        let document = pdf("report.pdf");

        let accepted = gatekeeper.admit(&document).unwrap();

        let expected = fx
            .config
            .intake_root
            .join("asc606")
            .join(document.correlation_id.to_string())
            .join("report.pdf");
        assert_eq!(accepted.path(), expected.as_path());
        assert!(accepted.path().exists());
        assert!(!accepted.scan_bypassed);
        assert_eq!(accepted.info.page_count, 1);
        assert_eq!(accepted.stem(), "report");
        assert_eq!(
            accepted.trail().states(),
            vec![
                ValidationState::Received,
                ValidationState::ExtensionChecked,
                ValidationState::Scanned,
                ValidationState::StructurallyValid,
                ValidationState::Accepted,
            ]
        );
        assert!(staging_is_empty(&fx.config));
    }

    #[test]
    fn test_dropping_accepted_document_releases_directory() {
        let fx = fixture(ScanPolicy::FailClosed);
        let gatekeeper = scanning_gatekeeper(fx.config.clone());
        let accepted = gatekeeper.admit(&pdf("report.pdf")).unwrap();
        let dir = accepted.dir().to_path_buf();

        drop(accepted);
        assert!(!dir.exists());
    }

    #[test]
    fn test_wrong_extension_is_unsupported_type() {
        let fx = fixture(ScanPolicy::FailClosed);
        let gatekeeper = scanning_gatekeeper(fx.config.clone());
        let document = Document::new("report.docx", "asc606", b"PK\x03\x04".to_vec());

        let err = gatekeeper.admit(&document).unwrap_err();
        assert_eq!(err.code(), "unsupported-type");
        assert!(staging_is_empty(&fx.config));
    }

    #[test]
    fn test_traversal_name_is_unsupported_type() {
        let fx = fixture(ScanPolicy::FailOpen);
        let gatekeeper = Gatekeeper::new(fx.config.clone());
        let err = gatekeeper.admit(&pdf("../../evil.pdf")).unwrap_err();
        assert_eq!(err.reason(), Some(RejectReason::UnsupportedType));
    }

    #[test]
    fn test_infected_file_is_rejected() {
        let fx = fixture(ScanPolicy::FailOpen);
        let gatekeeper = scanning_gatekeeper(fx.config.clone());
        let mut bytes = pdf_with_text("invoice");
        bytes.extend_from_slice(fake::EICAR_MARKER);
        let document = Document::new("invoice.pdf", "asc606", bytes);

        let err = gatekeeper.admit(&document).unwrap_err();
        assert_eq!(err.code(), "malware-detected");
        assert!(staging_is_empty(&fx.config));
    }

    #[test]
    fn test_unreachable_scanner_fail_closed_rejects() {
        let fx = fixture(ScanPolicy::FailClosed);
        let gatekeeper = unreachable_gatekeeper(fx.config.clone());

        let err = gatekeeper.admit(&pdf("report.pdf")).unwrap_err();
        assert_eq!(err.code(), "scan-unavailable");
        assert_eq!(
            gatekeeper.scanner_probe().current(),
            ServiceAvailability::Unavailable
        );
    }

    #[test]
    fn test_refused_scan_does_not_block_later_documents() {
        let fx = fixture(ScanPolicy::FailClosed);
        let port = fake::spawn_clamd_with_limit(Some(2000));
        let scanner = ClamdScanner::new("127.0.0.1", port, Duration::from_secs(2));
        let gatekeeper =
            Gatekeeper::new(fx.config.clone()).with_scanner(Box::new(scanner), quick_probe());

        assert!(gatekeeper.admit(&pdf("small.pdf")).is_ok());

        let large = Document::new("large.pdf", "asc606", pdf_with_text(&"a".repeat(5000)));
        let err = gatekeeper.admit(&large).unwrap_err();
        assert_eq!(err.code(), "scan-unavailable");
        assert_eq!(
            gatekeeper.scanner_probe().current(),
            ServiceAvailability::Available
        );

        assert!(gatekeeper.admit(&pdf("small.pdf")).is_ok());
    }

    #[test]
    fn test_failed_scan_call_is_rechecked_on_next_document() {
        let fx = fixture(ScanPolicy::FailClosed);
        let scanner = Arc::new(FlakyScanner::default());
        let gatekeeper = Gatekeeper::new(fx.config.clone())
            .with_scanner(Box::new(SharedScanner(scanner.clone())), quick_probe());

        let err = gatekeeper.admit(&pdf("first.pdf")).unwrap_err();
        assert_eq!(err.code(), "scan-unavailable");

        let accepted = gatekeeper.admit(&pdf("second.pdf")).unwrap();
        assert!(!accepted.scan_bypassed);
        assert_eq!(scanner.handshakes.load(Ordering::SeqCst), 2);
        assert_eq!(scanner.scans.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unreachable_scanner_fail_open_proceeds_to_structure_check() {
        let fx = fixture(ScanPolicy::FailOpen);
        let gatekeeper = unreachable_gatekeeper(fx.config.clone());

        let accepted = gatekeeper.admit(&pdf("report.pdf")).unwrap();
        assert!(accepted.scan_bypassed);

        let corrupt = Document::new("broken.pdf", "asc606", truncated_pdf());
        let err = gatekeeper.admit(&corrupt).unwrap_err();
        assert_eq!(err.code(), "corrupt-or-invalid");
    }

    #[test]
    fn test_missing_scanner_follows_policy() {
        let closed = fixture(ScanPolicy::FailClosed);
        let err = Gatekeeper::new(closed.config.clone())
            .admit(&pdf("report.pdf"))
            .unwrap_err();
        assert_eq!(err.code(), "scan-unavailable");

        let open = fixture(ScanPolicy::FailOpen);
        assert!(Gatekeeper::new(open.config.clone())
            .admit(&pdf("report.pdf"))
            .is_ok());
    }

    #[test]
    fn test_non_pdf_bytes_with_pdf_name_are_corrupt() {
        let fx = fixture(ScanPolicy::FailClosed);
        let gatekeeper = scanning_gatekeeper(fx.config.clone());
        let document = Document::new("fake.pdf", "asc606", b"just some text, honest".to_vec());

        let err = gatekeeper.admit(&document).unwrap_err();
        assert_eq!(err.code(), "corrupt-or-invalid");
        assert!(staging_is_empty(&fx.config));
    }

    #[test]
    fn test_form_type_cannot_escape_intake_root() {
        let fx = fixture(ScanPolicy::FailOpen);
        let gatekeeper = Gatekeeper::new(fx.config.clone());
        let document = Document::new("a.pdf", "../asc606", pdf_with_text("x"));
        assert!(matches!(
            gatekeeper.admit(&document),
            Err(IntakeError::InvalidFormType(_))
        ));
    }

    #[test]
    fn test_probe_scanner_without_scanner_is_unavailable() {
        let fx = fixture(ScanPolicy::FailClosed);
        let gatekeeper = Gatekeeper::new(fx.config.clone());
        assert_eq!(gatekeeper.probe_scanner(), ServiceAvailability::Unavailable);
    }
}
