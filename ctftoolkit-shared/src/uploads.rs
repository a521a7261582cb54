/// Scratch files for uploaded artifacts
///
/// Uploaded files are written to the upload directory as
/// `<YYYYMMDDhhmmss>_<original name>` before being handed to a tool, and
/// removed when the [`ScratchFile`] handle is dropped. Removal is
/// best-effort: a failure is logged and otherwise ignored.
///
/// Only the final component of the client-supplied name is used. Files are
/// created with create-new semantics, so a same-second upload with the same
/// name fails instead of overwriting the first one.

use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Error type for scratch file handling
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Client-supplied name has no usable file name component
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    /// A scratch file with the same name already exists
    #[error("Scratch file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Reduces a client-supplied file name to its final path component
///
/// Both `/` and `\` are treated as separators. Returns `None` for names that
/// are empty or consist only of `.`/`..`.
pub fn sanitize_file_name(name: &str) -> Option<&str> {
    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}

/// Formats the timestamp prefix used for scratch and generated file names
pub fn timestamp(at: DateTime<Local>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Builds the scratch file name for an upload received at `at`
pub fn scratch_name(original: &str, at: DateTime<Local>) -> Result<String, UploadError> {
    let base = sanitize_file_name(original)
        .ok_or_else(|| UploadError::InvalidFileName(original.to_string()))?;
    Ok(format!("{}_{}", timestamp(at), base))
}

/// Checks the extension of `name` against `allowed` (e.g. `[".pcap"]`), ignoring case
pub fn has_allowed_extension(name: &str, allowed: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            allowed
                .iter()
                .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Resolves a generated artifact name inside `dir`
///
/// The name must already be a bare file name; anything with separators or
/// parent references is rejected.
pub fn resolve_artifact(dir: &Path, name: &str) -> Result<PathBuf, UploadError> {
    match sanitize_file_name(name) {
        Some(base) if base == name => Ok(dir.join(base)),
        _ => Err(UploadError::InvalidFileName(name.to_string())),
    }
}

/// An uploaded file persisted for the duration of one tool invocation
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Writes `contents` to a new scratch file in `dir`
    pub async fn create(
        dir: &Path,
        original_name: &str,
        contents: &[u8],
    ) -> Result<Self, UploadError> {
        let path = dir.join(scratch_name(original_name, Local::now())?);

        tokio::fs::create_dir_all(dir).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => UploadError::AlreadyExists(path.clone()),
                _ => UploadError::Io(e),
            })?;

        // From here on, Drop removes the file even if the write fails
        let scratch = Self { path };
        file.write_all(contents).await?;
        file.flush().await?;

        tracing::debug!(path = %scratch.path.display(), bytes = contents.len(), "Saved scratch upload");
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Unlinking is one metadata syscall regardless of file size, so it runs
// inline and the file is gone by the time the handler returns.
impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove scratch file");
        }
    }
}
