//! Live adapter for the Cloudinary Admin and Upload APIs.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::truncate_body;
use crate::config::CloudinaryCredentials;
use crate::error::PhotoError;
use crate::ports::image_cdn::{AssetInfo, AssetUpload, CdnFuture, ImageCdn, UploadedAsset};
use crate::processing::escape_public_id;

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Live Cloudinary client.
///
/// Resource lookups are signed with the API key and secret; uploads are
/// unsigned and go through the configured upload preset.
pub struct CloudinaryCdn {
    client: Client,
    base_url: String,
    cloud_name: Option<String>,
    credentials: Option<CloudinaryCredentials>,
    upload_preset: String,
    folder: String,
}

impl CloudinaryCdn {
    /// Create a client for `cloud_name`.
    #[must_use]
    pub fn new(
        cloud_name: Option<String>,
        credentials: Option<CloudinaryCredentials>,
        upload_preset: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: CLOUDINARY_API_BASE.to_string(),
            cloud_name,
            credentials,
            upload_preset: upload_preset.into(),
            folder: folder.into(),
        }
    }

    fn cloud_url(&self, path: &str) -> Result<String, PhotoError> {
        let cloud = self.cloud_name.as_deref().ok_or(PhotoError::MissingCloudName)?;
        Ok(format!("{}/{cloud}/{path}", self.base_url))
    }
}

impl ImageCdn for CloudinaryCdn {
    fn resource(&self, public_id: &str) -> CdnFuture<'_, AssetInfo> {
        let path = format!("resources/image/upload/{}", escape_public_id(public_id));
        Box::pin(async move {
            let url = self.cloud_url(&path)?;
            let credentials =
                self.credentials.as_ref().ok_or_else(|| PhotoError::MissingApiKey {
                    provider: "Cloudinary".into(),
                    env_var: "CLOUDINARY_API_KEY".into(),
                })?;

            debug!(%url, "fetching cloudinary resource");
            let response = self
                .client
                .get(&url)
                .basic_auth(&credentials.api_key, Some(&credentials.api_secret))
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;
            if !status.is_success() {
                return Err(PhotoError::Api {
                    status: status.as_u16(),
                    message: error_message(&text),
                });
            }

            serde_json::from_str(&text).map_err(|e| PhotoError::Api {
                status: 200,
                message: format!("Failed to parse resource: {e}"),
            })
        })
    }

    fn upload(&self, upload: &AssetUpload) -> CdnFuture<'_, UploadedAsset> {
        let upload = upload.clone();
        Box::pin(async move {
            let url = self.cloud_url("image/upload")?;

            let file = Part::bytes(upload.data).file_name(upload.file_name.clone());
            let form = Form::new()
                .part("file", file)
                .text("upload_preset", self.upload_preset.clone())
                .text("folder", self.folder.clone());

            debug!(%url, file = %upload.file_name, "uploading to cloudinary");
            let response = self.client.post(&url).multipart(form).send().await?;

            let status = response.status();
            let text = response.text().await?;
            if !status.is_success() {
                return Err(PhotoError::Api {
                    status: status.as_u16(),
                    message: error_message(&text),
                });
            }

            serde_json::from_str(&text).map_err(|e| PhotoError::Api {
                status: 200,
                message: format!("Failed to parse upload response: {e}"),
            })
        })
    }
}

#[derive(Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorDetail,
}

#[derive(Deserialize)]
struct CloudinaryErrorDetail {
    message: String,
}

/// Cloudinary's `{"error":{"message":…}}`, or the raw body when it is not that shape.
fn error_message(body: &str) -> String {
    serde_json::from_str::<CloudinaryErrorBody>(body)
        .map_or_else(|_| truncate_body(body), |b| b.error.message)
}
