//! Route handlers.

pub mod cloudinary;
pub mod selection;
pub mod uploads;

use axum::extract::Multipart;
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

use super::ApiError;

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// A file read from a multipart form.
pub(crate) struct FormFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read the first file in `field_name`; other fields are ignored.
///
/// A form without any parts yields `None`, like a form without the field.
pub(crate) async fn read_form_file(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<Option<FormFile>, ApiError> {
    let mut seen_field = false;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            // multer rejects a body that closes before its first part
            Err(e) if !seen_field => {
                debug!(error = %e, "multipart body has no parts");
                return Ok(None);
            }
            Err(e) => return Err(ApiError::BadRequest(format!("Multipart error: {e}"))),
        };
        seen_field = true;
        if field.name() != Some(field_name) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Read error: {e}")))?
            .to_vec();
        return Ok(Some(FormFile { name, content_type, bytes }));
    }
}
