//! On-disk stores for uploaded photos. The file name is the only identity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PhotoError;

/// Largest file the upload store accepts.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types the upload store accepts.
pub const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// How stored files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// `{unix-millis}-{uuid}{ext}`; extension defaults to `.jpg`.
    TimestampUuid,
    /// `{original-stem}-{unix-millis}-{random}{ext}`.
    StemTimestampRandom,
}

/// Which checks run before a file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Type allow-list and size ceiling.
    Strict,
    /// Accept anything.
    None,
}

/// A file that was written to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Name on disk.
    pub filename: String,
    /// Public URL path (e.g. `/uploads/…`).
    pub url: String,
}

/// Per-file outcome of a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// The requested file name.
    pub filename: String,
    /// Whether the file was removed.
    pub success: bool,
    /// Why it was not removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A directory of uploaded files served under a URL prefix.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
    naming: Naming,
    validation: Validation,
}

impl UploadStore {
    /// The general upload store: validated, timestamp + UUID names.
    pub fn uploads(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: "/uploads".to_string(),
            naming: Naming::TimestampUuid,
            validation: Validation::Strict,
        }
    }

    /// The "My Photos" store: unvalidated, original stem + timestamp + random names.
    pub fn my_photos(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: "/my-photos".to_string(),
            naming: Naming::StemTimestampRandom,
            validation: Validation::None,
        }
    }

    /// Directory backing this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// URL prefix the store is served under.
    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Validate and write a file under a fresh collision-resistant name.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::InvalidUpload`] for a rejected type or size and
    /// [`PhotoError::Io`] if the directory or file cannot be written.
    pub async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredFile, PhotoError> {
        if self.validation == Validation::Strict {
            validate_upload(content_type, bytes.len())?;
        }

        let filename = self.unique_name(original_name);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        info!(dir = %self.dir.display(), %filename, bytes = bytes.len(), "stored upload");
        Ok(StoredFile { url: format!("{}/{filename}", self.url_prefix), filename })
    }

    /// Names of the regular files in the store. A missing directory is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub async fn list(&self) -> Result<Vec<String>, PhotoError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Delete each named file, reporting every outcome.
    pub async fn delete(&self, filenames: &[String]) -> Vec<DeleteOutcome> {
        let mut results = Vec::with_capacity(filenames.len());
        for filename in filenames {
            let outcome = if is_plain_file_name(filename) {
                match tokio::fs::remove_file(self.dir.join(filename)).await {
                    Ok(()) => {
                        DeleteOutcome { filename: filename.clone(), success: true, error: None }
                    }
                    Err(e) => {
                        warn!(%filename, error = %e, "failed to delete upload");
                        DeleteOutcome {
                            filename: filename.clone(),
                            success: false,
                            error: Some(e.to_string()),
                        }
                    }
                }
            } else {
                DeleteOutcome {
                    filename: filename.clone(),
                    success: false,
                    error: Some("Invalid file path.".to_string()),
                }
            };
            results.push(outcome);
        }
        results
    }

    fn unique_name(&self, original_name: &str) -> String {
        let path = Path::new(original_name);
        let millis = chrono::Utc::now().timestamp_millis();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{e}"));

        match self.naming {
            Naming::TimestampUuid => {
                let ext = ext.unwrap_or_else(|| ".jpg".to_string());
                format!("{millis}-{}{ext}", uuid::Uuid::new_v4())
            }
            Naming::StemTimestampRandom => {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(sanitize_stem)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "uploaded_photo".to_string());
                let suffix: u32 = rand::random::<u32>() % 1_000_000_000;
                format!("{stem}-{millis}-{suffix}{}", ext.unwrap_or_default())
            }
        }
    }
}

/// Check an upload against the type allow-list and size ceiling.
///
/// # Errors
///
/// Returns [`PhotoError::InvalidUpload`] describing the first failed check.
pub fn validate_upload(content_type: Option<&str>, len: usize) -> Result<(), PhotoError> {
    let content_type = content_type.unwrap_or_default();
    if !ALLOWED_TYPES.contains(&content_type) {
        return Err(PhotoError::InvalidUpload(format!(
            "Unsupported file type '{content_type}'. Only JPEG, PNG, WEBP are accepted."
        )));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(PhotoError::InvalidUpload("File must not be larger than 10MB.".to_string()));
    }
    Ok(())
}

/// A single path component that stays inside the store directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

/// Keep a stem readable while removing anything that could escape the directory.
fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_') { c } else { '_' })
        .collect()
}
