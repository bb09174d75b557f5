use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backend::{BackendError, PdfBackend};
use crate::text::TextOptions;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("source PDF not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

/// One source PDF to convert into one destination text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub options: TextOptions,
}

impl ExtractionJob {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            options: TextOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TextOptions) -> Self {
        self.options = options;
        self
    }
}

/// What a run reports. The `Display` form is the single status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { destination: PathBuf, bytes: usize },
    Failed { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Written { .. })
    }
}

impl From<ExtractError> for Outcome {
    fn from(err: ExtractError) -> Self {
        // The status line must stay a single line whatever the source
        // error's formatting.
        let message = err
            .to_string()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Outcome::Failed { message }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Written { destination, .. } => {
                write!(f, "Wrote extracted text to: {}", destination.display())
            }
            Outcome::Failed { message } => write!(f, "Error extracting text: {}", message),
        }
    }
}

/// Run a job to completion. Every failure is folded into
/// [`Outcome::Failed`]; nothing propagates to the caller.
pub fn run(job: &ExtractionJob, backend: &dyn PdfBackend) -> Outcome {
    match extract_to_file(job, backend) {
        Ok(bytes) => {
            tracing::info!(
                destination = %job.destination.display(),
                bytes,
                "wrote extracted text"
            );
            Outcome::Written {
                destination: job.destination.clone(),
                bytes,
            }
        }
        Err(e) => {
            tracing::debug!(source = %job.source.display(), error = ?e, "extraction failed");
            e.into()
        }
    }
}

/// Extract the source's text and write it to the destination, returning
/// the number of bytes written.
///
/// The destination is only replaced once the full text has been written
/// to a sibling temporary file, so a failure at any step leaves an
/// existing destination as it was.
pub fn extract_to_file(
    job: &ExtractionJob,
    backend: &dyn PdfBackend,
) -> Result<usize, ExtractError> {
    if !job.source.is_file() {
        return Err(ExtractError::SourceNotFound(job.source.clone()));
    }

    tracing::debug!(source = %job.source.display(), "extracting text");
    let text = backend.extract_text(&job.source)?;
    let text = job.options.apply(text);

    write_text(&job.destination, &text)?;
    Ok(text.len())
}

/// Write `text` as UTF-8 to `path`, replacing any existing file.
///
/// A symlinked destination is written through to its target. An existing
/// file keeps its permissions; a new one gets the process default
/// (`0o666` minus the umask on Unix), the same as `std::fs::write`.
pub fn write_text(path: &Path, text: &str) -> Result<(), ExtractError> {
    let write_err = |source: std::io::Error| ExtractError::Write {
        path: path.to_path_buf(),
        source,
    };

    let target = match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::canonicalize(path).map_err(write_err)?
        }
        _ => path.to_path_buf(),
    };
    let existing = std::fs::metadata(&target).ok();

    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".resume-text");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the umask at creation, like any newly created file.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut tmp = builder.tempfile_in(parent).map_err(write_err)?;
    if let Some(meta) = existing {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(&target).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines() {
        let ok = Outcome::Written {
            destination: PathBuf::from("/p/assets/resume_text.txt"),
            bytes: 12,
        };
        assert_eq!(
            ok.to_string(),
            "Wrote extracted text to: /p/assets/resume_text.txt"
        );
        assert!(ok.is_success());

        let failed: Outcome =
            ExtractError::SourceNotFound(PathBuf::from("/p/missing.pdf")).into();
        assert_eq!(
            failed.to_string(),
            "Error extracting text: source PDF not found: /p/missing.pdf"
        );
        assert!(!failed.is_success());
    }

    #[test]
    fn multi_line_errors_collapse_to_one_status_line() {
        let err = ExtractError::Config("cannot load\n\n   xref is broken\n".into());
        let outcome: Outcome = err.into();
        let line = outcome.to_string();
        assert_eq!(line.lines().count(), 1, "got: {line:?}");
        assert_eq!(
            line,
            "Error extracting text: configuration error: cannot load xref is broken"
        );
    }

    #[test]
    fn backend_errors_keep_their_message() {
        let err: ExtractError = BackendError::Open("no objects found".into()).into();
        assert_eq!(err.to_string(), "failed to open PDF: no objects found");
    }

    #[test]
    fn write_text_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old contents that are longer").unwrap();

        write_text(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        // Only the destination remains; the temp file was persisted over it.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_text_into_missing_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.txt");
        let err = write_text(&path, "text").unwrap_err();
        assert!(matches!(err, ExtractError::Write { .. }));
        assert!(err.to_string().starts_with("failed to write "));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn new_file_gets_default_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let ours = dir.path().join("resume_text.txt");
        let reference = dir.path().join("reference.txt");

        write_text(&ours, "text").unwrap();
        std::fs::write(&reference, "text").unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&ours), mode(&reference));
    }

    #[cfg(unix)]
    #[test]
    fn existing_file_keeps_its_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume_text.txt");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_text(&path, "new").unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o640);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_destination_is_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.txt");
        let link = dir.path().join("resume_text.txt");
        std::fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_text(&link, "new").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "new");
    }
}
