//! Image encoding for transport to the vision model.

use std::path::Path;

use base64::Engine;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::error::PhotoError;
use crate::selection::interpreter::Named;

/// MIME type assumed when neither the caller, the extension nor the content tell us.
pub const DEFAULT_MIME: &str = "image/jpeg";

/// An image ready to be sent inline: `{ name, type, data }` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// Original file name.
    pub name: String,
    /// Declared or guessed MIME type.
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Standard base64 of the full file content.
    pub data: String,
}

impl EncodedImage {
    /// Decode the base64 payload back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, PhotoError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data).map_err(|e| {
            PhotoError::InvalidArgument(format!("Invalid base64 data for '{}': {e}", self.name))
        })
    }

    /// Fill in a missing MIME type from the file name.
    #[must_use]
    pub fn with_guessed_type(mut self) -> Self {
        if self.mime_type.trim().is_empty() {
            self.mime_type = mime_from_extension(&self.name).unwrap_or(DEFAULT_MIME).to_string();
        }
        self
    }
}

impl Named for EncodedImage {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Encode in-memory bytes.
///
/// `declared_type` wins when it is present and non-empty; otherwise the type is
/// guessed from the extension, then from the content, then [`DEFAULT_MIME`].
#[must_use]
pub fn encode_bytes(name: &str, bytes: &[u8], declared_type: Option<&str>) -> EncodedImage {
    let mime_type = declared_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| guess_mime(name, bytes).to_string());

    EncodedImage {
        name: name.to_string(),
        mime_type,
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
    }
}

/// Read and encode a single file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn encode_file(path: &Path) -> Result<EncodedImage, PhotoError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(encode_bytes(&name, &bytes, None))
}

/// Read and encode files concurrently. Output order matches input order.
///
/// # Errors
///
/// Returns the first read error; no partial batch is returned.
pub async fn encode_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<EncodedImage>, PhotoError> {
    try_join_all(paths.iter().map(|p| encode_file(p.as_ref()))).await
}

/// Best-effort MIME type for a file.
#[must_use]
pub fn guess_mime(name: &str, bytes: &[u8]) -> &'static str {
    mime_from_extension(name).or_else(|| sniff_mime(bytes)).unwrap_or(DEFAULT_MIME)
}

/// MIME type implied by a file name's extension.
#[must_use]
pub fn mime_from_extension(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "jpe" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

/// MIME type detected from the leading bytes of the content.
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}
