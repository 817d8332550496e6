//! Cloudinary post-processing endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::read_form_file;
use crate::api::{ApiError, AppState};
use crate::ports::AssetUpload;
use crate::processing::UpscaleFactor;

/// Body of an upscale request. `factor` stays loosely typed so a wrong type is
/// reported as an invalid factor rather than a parse failure.
#[derive(Debug, Deserialize)]
pub struct UpscaleBody {
    /// Asset to upscale.
    #[serde(default)]
    pub public_id: Option<String>,
    /// Requested factor, 2 or 4.
    #[serde(default)]
    pub factor: Option<Value>,
}

/// Upscale response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleResponse {
    /// Delivery URL of the upscaled image.
    pub upscaled_url: String,
}

/// Body of a background-removal request.
#[derive(Debug, Deserialize)]
pub struct RemoveBgBody {
    /// Asset to process.
    #[serde(default)]
    pub public_id: Option<String>,
}

/// Background-removal response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBgResponse {
    /// Delivery URL of the background-removed image.
    pub bg_removed_url: String,
}

/// CDN upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdnUploadResponse {
    /// Public ID of the new asset.
    pub public_id: String,
    /// HTTPS URL of the new asset.
    pub secure_url: String,
}

/// `POST /api/cloudinary/upscale`
pub async fn upscale(
    State(state): State<AppState>,
    body: Result<Json<UpscaleBody>, JsonRejection>,
) -> Result<Json<UpscaleResponse>, ApiError> {
    let Json(body) = body?;
    let public_id = body.public_id.filter(|id| !id.trim().is_empty());
    let factor = body.factor.filter(is_truthy);
    let (Some(public_id), Some(factor)) = (public_id, factor) else {
        return Err(ApiError::BadRequest("Missing public_id or factor".to_string()));
    };
    let factor = parse_factor(&factor)?;
    info!(%public_id, %factor, "upscale requested");

    let upscaled_url = state.processor.upscale(&public_id, factor).await?;
    Ok(Json(UpscaleResponse { upscaled_url }))
}

/// `POST /api/cloudinary/remove-bg`
pub async fn remove_bg(
    State(state): State<AppState>,
    body: Result<Json<RemoveBgBody>, JsonRejection>,
) -> Result<Json<RemoveBgResponse>, ApiError> {
    let Json(body) = body?;
    let public_id = body.public_id.unwrap_or_default();
    let bg_removed_url = state.processor.remove_background(&public_id)?;
    Ok(Json(RemoveBgResponse { bg_removed_url }))
}

/// `POST /api/cloudinary/upload`
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CdnUploadResponse>, ApiError> {
    let file = read_form_file(&mut multipart, "file")
        .await?
        .ok_or_else(|| ApiError::BadRequest("No file uploaded.".to_string()))?;

    let upload = AssetUpload { file_name: file.name, data: file.bytes };
    let asset = state.processor.upload(&upload).await?;
    Ok(Json(CdnUploadResponse { public_id: asset.public_id, secure_url: asset.secure_url }))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Only the JSON numbers 2 and 4 are accepted.
fn parse_factor(value: &Value) -> Result<UpscaleFactor, ApiError> {
    let invalid = || ApiError::BadRequest("Invalid upscale factor. Must be 2 or 4.".to_string());
    let n = value.as_u64().ok_or_else(invalid)?;
    UpscaleFactor::try_from(n).map_err(|_| invalid())
}
