//! Vision model port for multimodal text generation APIs.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::PhotoError;

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller.
    User,
    /// The vision model.
    Model,
}

/// One piece of a conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text(String),
    /// An inline base64 image.
    InlineData {
        /// MIME type of the image.
        mime_type: String,
        /// Base64 payload.
        data: String,
    },
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Author of the turn.
    pub role: Role,
    /// Ordered parts of the turn.
    pub parts: Vec<Part>,
}

impl Turn {
    /// A user turn with a single text part.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self { role: Role::User, parts: vec![Part::Text(text.into())] }
    }

    /// A model turn with a single text part.
    #[must_use]
    pub fn model_text(text: impl Into<String>) -> Self {
        Self { role: Role::Model, parts: vec![Part::Text(text.into())] }
    }
}

/// Content category a safety threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    /// `HARM_CATEGORY_HARASSMENT`
    HarmCategoryHarassment,
    /// `HARM_CATEGORY_HATE_SPEECH`
    HarmCategoryHateSpeech,
    /// `HARM_CATEGORY_SEXUALLY_EXPLICIT`
    HarmCategorySexuallyExplicit,
    /// `HARM_CATEGORY_DANGEROUS_CONTENT`
    HarmCategoryDangerousContent,
}

/// How aggressively a harm category is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    /// `BLOCK_LOW_AND_ABOVE`
    BlockLowAndAbove,
}

/// A safety threshold for one harm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// The harm category.
    pub category: HarmCategory,
    /// The blocking threshold.
    pub threshold: BlockThreshold,
}

/// A request for a text answer about a set of images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionRequest {
    /// The resolved model identifier (e.g., `"gemini-2.5-flash"`).
    pub model: String,
    /// System instruction (the rubric).
    pub system_instruction: String,
    /// Safety thresholds.
    pub safety_settings: Vec<SafetySetting>,
    /// Requested response MIME type.
    pub response_mime_type: String,
    /// Conversation turns, oldest first.
    pub contents: Vec<Turn>,
}

/// Token accounting reported by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: Option<u64>,
    /// Tokens in the candidates.
    pub candidates_tokens: Option<u64>,
    /// Total tokens.
    pub total_tokens: Option<u64>,
}

/// The model's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionResponse {
    /// Concatenated text of the first candidate, if any.
    pub text: Option<String>,
    /// Usage metadata, if reported.
    #[serde(default)]
    pub usage: Option<Usage>,
    /// The unmodified response body.
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Boxed future type returned by [`VisionModel::generate`].
pub type VisionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<VisionResponse, PhotoError>> + Send + 'a>>;

/// Answers questions about images via an external API.
pub trait VisionModel: Send + Sync {
    /// Generate a text answer for the given request.
    fn generate(&self, request: &VisionRequest) -> VisionFuture<'_>;
}
