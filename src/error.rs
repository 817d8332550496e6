//! Unified error type for bestphoto.

use thiserror::Error;

/// Errors that can occur while selecting or processing photos.
#[derive(Debug, Error)]
pub enum PhotoError {
    /// An upstream API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A selection was requested for a batch with no images.
    #[error("No files provided")]
    EmptyBatch,

    /// The vision model answered without any text.
    #[error("Empty response from Gemini AI on {turn} turn")]
    EmptyResponse {
        /// Which round produced the empty reply (`"first"` or `"second"`).
        turn: &'static str,
    },

    /// An uploaded file was rejected before it reached the disk.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// The CDN did not report dimensions for an asset.
    #[error("Could not retrieve original image dimensions for upscaling.")]
    MissingDimensions,

    /// No Cloudinary cloud name is configured.
    #[error("No Cloudinary cloud name. Set CLOUDINARY_CLOUD_NAME or add it to config file.")]
    MissingCloudName,

    /// No API key configured for the provider.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The provider name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },
}

impl PhotoError {
    /// Whether the failure happened below the HTTP layer and may succeed on resubmission.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the failure was caused by the caller's input rather than the service.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::EmptyBatch | Self::InvalidUpload(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors() {
        assert!(PhotoError::EmptyBatch.is_client_error());
        assert!(PhotoError::InvalidArgument("factor".into()).is_client_error());
        assert!(PhotoError::InvalidUpload("too big".into()).is_client_error());
        assert!(!PhotoError::MissingDimensions.is_client_error());
        assert!(!PhotoError::Config("bad".into()).is_client_error());
    }

    #[test]
    fn api_errors_are_not_transport() {
        let err = PhotoError::Api { status: 503, message: "overloaded".into() };
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "API error (503): overloaded");
    }

    #[test]
    fn empty_response_names_turn() {
        let err = PhotoError::EmptyResponse { turn: "second" };
        assert_eq!(err.to_string(), "Empty response from Gemini AI on second turn");
    }
}
