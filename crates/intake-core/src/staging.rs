//! Per-request storage
//!
//! Submitted bytes land in a private staging directory keyed by the
//! document's correlation id. Accepted files are moved into the intake tree
//! and owned by an [`AcceptedDocument`], which removes its directory on drop.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use shared_pdf::PdfInfo;
use shared_types::ValidationTrail;
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

/// Only the final path component of a submitted name is ever used.
///
/// Returns `None` for names that are empty, contain separators or
/// parent/current components, have no stem, or whose extension is not `.pdf`.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return None;
    }

    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return None,
    }

    let stem = path.file_stem()?.to_str()?;
    let extension = path.extension()?.to_str()?;
    if stem.is_empty() || !extension.eq_ignore_ascii_case("pdf") {
        return None;
    }
    Some(name.to_string())
}

/// Staged copy of a submission; the directory is removed on drop
#[derive(Debug)]
pub struct StagedFile {
    dir: TempDir,
    path: PathBuf,
}

impl StagedFile {
    /// Write `bytes` into a fresh directory under `staging_root`
    pub fn write(
        staging_root: &Path,
        correlation_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        fs::create_dir_all(staging_root)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-", correlation_id))
            .tempdir_in(staging_root)?;
        let path = dir.path().join(filename);

        let mut file = private_file(&path)?;
        file.write_all(bytes)?;
        file.sync_all()?;

        debug!("Staged {} bytes at {}", bytes.len(), path.display());
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}

/// Move a staged file to `dest`, copying when a rename crosses filesystems
pub(crate) fn promote(staged: &StagedFile, dest: &Path) -> std::io::Result<()> {
    if fs::rename(staged.path(), dest).is_err() {
        fs::copy(staged.path(), dest)?;
    }
    Ok(())
}

/// A document that passed every intake check.
///
/// Owns `<intake_root>/<form_type>/<correlation_id>/`; dropping the handle
/// releases that directory.
#[derive(Debug)]
pub struct AcceptedDocument {
    pub correlation_id: Uuid,
    pub filename: String,
    pub form_type: String,
    pub info: PdfInfo,
    /// The scan was skipped under a fail-open policy
    pub scan_bypassed: bool,
    pub(crate) path: PathBuf,
    pub(crate) dir: PathBuf,
    pub(crate) trail: ValidationTrail,
}

impl AcceptedDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn trail(&self) -> &ValidationTrail {
        &self.trail
    }

    /// File name without the `.pdf` extension
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }
}

impl Drop for AcceptedDocument {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!("Released {}", self.dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to release {}: {}", self.dir.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_accepts_plain_pdf_names() {
        assert_eq!(sanitize_filename("10-K.pdf").as_deref(), Some("10-K.pdf"));
        assert_eq!(sanitize_filename("REPORT.PDF").as_deref(), Some("REPORT.PDF"));
        assert_eq!(
            sanitize_filename("  annual report.pdf ").as_deref(),
            Some("annual report.pdf")
        );
    }

    #[test]
    fn test_sanitize_rejects_other_extensions() {
        assert!(sanitize_filename("report.docx").is_none());
        assert!(sanitize_filename("report.pdf.exe").is_none());
        assert!(sanitize_filename("report").is_none());
    }

    #[test]
    fn test_sanitize_rejects_traversal_and_empty_names() {
        assert!(sanitize_filename("").is_none());
        assert!(sanitize_filename("../etc/passwd.pdf").is_none());
        assert!(sanitize_filename("dir/file.pdf").is_none());
        assert!(sanitize_filename("..\\file.pdf").is_none());
        assert!(sanitize_filename("..").is_none());
        assert!(sanitize_filename(".pdf").is_none());
    }

    #[test]
    fn test_staged_file_is_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let staged =
            StagedFile::write(root.path(), Uuid::new_v4(), "a.pdf", b"%PDF-1.7").unwrap();
        let dir = staged.dir().to_path_buf();
        assert_eq!(fs::read(staged.path()).unwrap(), b"%PDF-1.7");

        drop(staged);
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_staged_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let root = tempfile::tempdir().unwrap();
        let staged =
            StagedFile::write(root.path(), Uuid::new_v4(), "a.pdf", b"%PDF-1.7").unwrap();
        let mode = fs::metadata(staged.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_staging_dir_is_keyed_by_correlation_id() {
        let root = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let staged = StagedFile::write(root.path(), id, "a.pdf", b"x").unwrap();
        let dir_name = staged.dir().file_name().unwrap().to_string_lossy().to_string();
        assert!(dir_name.starts_with(&id.to_string()));
    }
}
