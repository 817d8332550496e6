//! Builds the conversation sent to the vision model for a selection round.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::encoder::EncodedImage;
use crate::error::PhotoError;
use crate::ports::vision_model::{
    BlockThreshold, HarmCategory, Part, Role, SafetySetting, Turn, VisionRequest,
};

/// Stand-in for the model turn when the caller has no first-round reply to replay.
pub const MISSING_FIRST_OUTPUT: &str = "No specific first output.";

/// One selection round as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    /// The batch, in the order the client wants indices to refer to.
    #[serde(default)]
    pub files: Vec<EncodedImage>,
    /// Free-form feedback; its presence makes this a second round.
    #[serde(default)]
    pub feedback: Option<String>,
    /// The model's reply from the first round.
    #[serde(default)]
    pub first_output: Option<String>,
}

impl SelectionRequest {
    /// A first-round request for the given batch.
    #[must_use]
    pub fn first_round(files: Vec<EncodedImage>) -> Self {
        Self { files, feedback: None, first_output: None }
    }

    /// A feedback round that replays `first_output` before the feedback.
    #[must_use]
    pub fn feedback_round(
        files: Vec<EncodedImage>,
        first_output: Option<String>,
        feedback: impl Into<String>,
    ) -> Self {
        Self { files, feedback: Some(feedback.into()), first_output }
    }

    /// The feedback text, if it has any non-whitespace content.
    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref().filter(|f| !f.trim().is_empty())
    }

    /// Whether this request is a feedback round.
    #[must_use]
    pub fn is_feedback_round(&self) -> bool {
        self.feedback().is_some()
    }
}

/// Safety thresholds attached to every selection request.
#[must_use]
pub fn safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::HarmCategoryHarassment,
        HarmCategory::HarmCategoryHateSpeech,
        HarmCategory::HarmCategorySexuallyExplicit,
        HarmCategory::HarmCategoryDangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting { category, threshold: BlockThreshold::BlockLowAndAbove })
    .collect()
}

/// Build the vision request for a selection round.
///
/// # Errors
///
/// Returns [`PhotoError::EmptyBatch`] if the request has no files.
pub fn build_vision_request(
    category: Category,
    model: &str,
    request: &SelectionRequest,
) -> Result<VisionRequest, PhotoError> {
    if request.files.is_empty() {
        return Err(PhotoError::EmptyBatch);
    }

    let mut parts = Vec::with_capacity(request.files.len() + 1);
    parts.push(Part::Text(category.instruction().to_string()));
    parts.extend(request.files.iter().map(|file| Part::InlineData {
        mime_type: file.mime_type.clone(),
        data: file.data.clone(),
    }));

    let mut contents = vec![Turn { role: Role::User, parts }];

    if let Some(feedback) = request.feedback() {
        let first = request
            .first_output
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .unwrap_or(MISSING_FIRST_OUTPUT);
        contents.push(Turn::model_text(first));
        contents.push(Turn::user_text(category.feedback_instruction(feedback)));
    }

    Ok(VisionRequest {
        model: model.to_string(),
        system_instruction: category.rubric().to_string(),
        safety_settings: safety_settings(),
        response_mime_type: "text/plain".to_string(),
        contents,
    })
}
