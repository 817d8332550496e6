//! Image CDN port for hosted asset storage and metadata.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::PhotoError;

/// Metadata about a hosted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// The asset's public ID.
    pub public_id: String,
    /// Width in pixels, if known.
    pub width: Option<u32>,
    /// Height in pixels, if known.
    pub height: Option<u32>,
    /// HTTPS delivery URL of the original.
    #[serde(default)]
    pub secure_url: Option<String>,
}

/// A file to place on the CDN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUpload {
    /// Original file name.
    pub file_name: String,
    /// Raw file bytes.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// The result of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Public ID to reference the asset in later calls.
    pub public_id: String,
    /// HTTPS delivery URL of the original.
    pub secure_url: String,
}

/// Boxed future type returned by [`ImageCdn`] methods.
pub type CdnFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PhotoError>> + Send + 'a>>;

/// Stores images on, and reads metadata from, a hosted image CDN.
pub trait ImageCdn: Send + Sync {
    /// Look up an asset's metadata.
    fn resource(&self, public_id: &str) -> CdnFuture<'_, AssetInfo>;

    /// Upload a new asset.
    fn upload(&self, upload: &AssetUpload) -> CdnFuture<'_, UploadedAsset>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
