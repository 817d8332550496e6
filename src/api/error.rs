//! HTTP error mapping. Every error body is `{"error": message}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::error::PhotoError;

/// An error that ends a request.
#[derive(Debug)]
pub enum ApiError {
    /// The caller sent something unusable.
    BadRequest(String),
    /// The service or an upstream failed.
    Internal(String),
}

impl From<PhotoError> for ApiError {
    fn from(err: PhotoError) -> Self {
        if !err.is_client_error() {
            return ApiError::Internal(err.to_string());
        }
        match err {
            PhotoError::InvalidArgument(msg) | PhotoError::InvalidUpload(msg) => {
                ApiError::BadRequest(msg)
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: PhotoError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn client_errors_are_400() {
        assert_eq!(status_of(PhotoError::EmptyBatch), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(PhotoError::InvalidArgument("bad factor".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(PhotoError::InvalidUpload("gif".into())), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_and_config_errors_are_500() {
        assert_eq!(status_of(PhotoError::MissingCloudName), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status_of(PhotoError::EmptyResponse { turn: "first" }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(PhotoError::MissingDimensions), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn argument_messages_are_passed_through_verbatim() {
        let ApiError::BadRequest(msg) =
            ApiError::from(PhotoError::InvalidArgument("public_id is required".into()))
        else {
            panic!("expected bad request");
        };
        assert_eq!(msg, "public_id is required");
    }

    #[test]
    fn status_follows_client_error_classification() {
        let errors = [
            PhotoError::EmptyBatch,
            PhotoError::InvalidUpload("gif".into()),
            PhotoError::Config("bad".into()),
            PhotoError::Api { status: 400, message: "bad key".into() },
        ];
        for err in errors {
            let expected = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            assert_eq!(status_of(err), expected);
        }
    }

    #[test]
    fn empty_batch_message() {
        let ApiError::BadRequest(msg) = ApiError::from(PhotoError::EmptyBatch) else {
            panic!("expected bad request");
        };
        assert_eq!(msg, PhotoError::EmptyBatch.to_string());
    }
}
