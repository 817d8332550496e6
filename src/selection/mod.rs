//! Best-photo selection: validate, build the conversation, ask the model, interpret.

pub mod interpreter;
pub mod request;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::error::PhotoError;
use crate::ports::{VisionModel, VisionRequest, VisionResponse};

pub use interpreter::{interpret, parse_best_index, resolve, Named, Resolution};
pub use request::{build_vision_request, SelectionRequest};

/// Most automatic retries a transport failure can trigger.
pub const MAX_TRANSPORT_RETRIES: u32 = 1;

/// The answer to one selection round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOutcome {
    /// Name of the selected file, or `None` when the reply selected nothing.
    pub best_photo_id: Option<String>,
    /// 0-based index of the selected file.
    pub best_photo_index: Option<usize>,
    /// Why this photo was chosen.
    pub reason: String,
    /// The model's unmodified response body.
    pub raw_response: serde_json::Value,
    /// The model's reply text, replayed as the model turn of a feedback round.
    #[serde(skip)]
    pub reply: String,
}

impl SelectionOutcome {
    /// Whether the model's reply resolved to a batch member.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.best_photo_index.is_some()
    }
}

/// Runs selection rounds against a vision model.
#[derive(Clone)]
pub struct Selector {
    vision: Arc<dyn VisionModel>,
    model: String,
    transport_retries: u32,
}

impl Selector {
    /// Create a selector that asks `model` through `vision`.
    pub fn new(vision: Arc<dyn VisionModel>, model: impl Into<String>) -> Self {
        Self { vision, model: model.into(), transport_retries: MAX_TRANSPORT_RETRIES }
    }

    /// Set how many times a transport failure is retried (at most [`MAX_TRANSPORT_RETRIES`]).
    #[must_use]
    pub fn with_transport_retries(mut self, retries: u32) -> Self {
        self.transport_retries = retries.min(MAX_TRANSPORT_RETRIES);
        self
    }

    /// The resolved model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one selection round.
    ///
    /// An unparseable or out-of-range reply is not an error: the outcome simply
    /// has no selection.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::EmptyBatch`] before any upstream call when the batch
    /// is empty, [`PhotoError::EmptyResponse`] when the model answers with no text,
    /// and any error from the vision model.
    pub async fn select(
        &self,
        category: Category,
        request: &SelectionRequest,
    ) -> Result<SelectionOutcome, PhotoError> {
        let vision_request = build_vision_request(category, &self.model, request)?;
        let feedback_round = request.is_feedback_round();
        info!(%category, files = request.files.len(), feedback_round, "running selection");

        let response = self.generate(&vision_request).await?;
        let turn = if feedback_round { "second" } else { "first" };
        let reply = response
            .text
            .filter(|t| !t.is_empty())
            .ok_or(PhotoError::EmptyResponse { turn })?;
        debug!(%category, reply = %reply, "vision model replied");

        let resolution = interpret(&reply, &request.files);
        let best_photo_index = resolution.index();
        let best_photo_id = resolution.item().map(|file| file.name.clone());
        match &best_photo_id {
            Some(name) => info!(%category, best = %name, "selection resolved"),
            None => warn!(%category, reply = %reply, "reply did not resolve to a photo"),
        }

        let reason = if feedback_round {
            reply.clone()
        } else {
            category.first_round_reason().to_string()
        };

        Ok(SelectionOutcome {
            best_photo_id,
            best_photo_index,
            reason,
            raw_response: response.raw,
            reply,
        })
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, PhotoError> {
        let mut attempt = 0;
        loop {
            match self.vision.generate(request).await {
                Err(e) if e.is_transport() && attempt < self.transport_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "transport failure, retrying vision call");
                }
                other => return other,
            }
        }
    }
}
