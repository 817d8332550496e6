//! Local upload store endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::read_form_file;
use crate::api::{ApiError, AppState};
use crate::storage::DeleteOutcome;

/// Response to a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Human-readable status.
    pub message: String,
    /// Stored file name.
    pub filename: String,
    /// Public URL path.
    pub url: String,
}

/// Response to a saved "My Photos" photo.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePhotoResponse {
    /// Human-readable status.
    pub message: String,
    /// Public URL path.
    pub file_path: String,
}

/// Stored file names.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Regular files in the upload directory.
    pub files: Vec<String>,
}

/// Body of a delete request.
#[derive(Debug, Deserialize)]
pub struct DeleteBody {
    /// Names to delete.
    #[serde(default)]
    pub filenames: Vec<String>,
}

/// Per-file delete outcomes.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// One entry per requested name, in request order.
    pub results: Vec<DeleteOutcome>,
}

/// `POST /api/upload`
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_form_file(&mut multipart, "file")
        .await?
        .ok_or_else(|| ApiError::BadRequest("No file found.".to_string()))?;

    let stored = state.uploads.save(&file.name, file.content_type.as_deref(), &file.bytes).await?;
    Ok(Json(UploadResponse {
        message: "Upload successful".to_string(),
        filename: stored.filename,
        url: stored.url,
    }))
}

/// `POST /api/my-photos/save-photo`
pub async fn save_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SavePhotoResponse>, ApiError> {
    let file = read_form_file(&mut multipart, "photo")
        .await?
        .filter(|f| !f.name.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("No photo file provided or filename missing".to_string())
        })?;

    let stored =
        state.my_photos.save(&file.name, file.content_type.as_deref(), &file.bytes).await?;
    Ok(Json(SavePhotoResponse {
        message: "Photo saved successfully".to_string(),
        file_path: stored.url,
    }))
}

/// `GET /api/list-uploads`
pub async fn list_uploads(State(state): State<AppState>) -> Result<Json<ListResponse>, ApiError> {
    let files = state.uploads.list().await?;
    Ok(Json(ListResponse { files }))
}

/// `POST /api/delete-uploads`: 200 when every file was deleted, 500 otherwise.
pub async fn delete_uploads(
    State(state): State<AppState>,
    body: Result<Json<DeleteBody>, JsonRejection>,
) -> Result<(StatusCode, Json<DeleteResponse>), ApiError> {
    let Json(body) = body?;
    if body.filenames.is_empty() {
        return Err(ApiError::BadRequest("No filenames provided.".to_string()));
    }

    let results = state.uploads.delete(&body.filenames).await;
    let status = if results.iter().all(|r| r.success) {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(DeleteResponse { results })))
}
