//! Live adapter for the Gemini `generateContent` API.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::truncate_body;
use crate::error::PhotoError;
use crate::ports::vision_model::{
    Part, Turn, Usage, VisionFuture, VisionModel, VisionRequest, VisionResponse,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live Gemini vision model.
///
/// The key is checked per call, so a server can start without one and report
/// the problem on the request that needs it.
pub struct GeminiVisionModel {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiVisionModel {
    /// Create a model client with the given API key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self { client: Client::new(), api_key, base_url: GEMINI_API_BASE.to_string() }
    }

    /// Point the client at a different API root (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl VisionModel for GeminiVisionModel {
    fn generate(&self, request: &VisionRequest) -> VisionFuture<'_> {
        let body = request_body(request);
        let url = format!("{}/{}:generateContent", self.base_url, request.model);
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or_else(|| PhotoError::MissingApiKey {
                provider: "Gemini".into(),
                env_var: "GEMINI_API_KEY".into(),
            })?;

            debug!(%url, "calling gemini");
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(PhotoError::Api {
                    status: status.as_u16(),
                    message: truncate_body(&response_text),
                });
            }

            parse_response(&response_text)
        })
    }
}

/// The REST body for a request.
fn request_body(request: &VisionRequest) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
        "contents": request.contents.iter().map(wire_turn).collect::<Vec<_>>(),
        "safetySettings": request.safety_settings,
        "generationConfig": { "responseMimeType": request.response_mime_type },
    })
}

fn wire_turn(turn: &Turn) -> Value {
    let parts: Vec<Value> = turn
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineData { mime_type, data } => {
                json!({ "inlineData": { "mimeType": mime_type, "data": data } })
            }
        })
        .collect();
    json!({ "role": turn.role, "parts": parts })
}

fn parse_response(body: &str) -> Result<VisionResponse, PhotoError> {
    let raw: Value = serde_json::from_str(body).map_err(|e| PhotoError::Api {
        status: 200,
        message: format!("Failed to parse response: {e}"),
    })?;
    let parsed: GeminiResponse = serde_json::from_value(raw.clone()).map_err(|e| {
        PhotoError::Api { status: 200, message: format!("Unexpected response shape: {e}") }
    })?;

    let text = parsed.candidates.into_iter().next().and_then(|candidate| {
        let texts: Vec<String> =
            candidate.content?.parts.into_iter().filter_map(|p| p.text).collect();
        (!texts.is_empty()).then(|| texts.concat())
    });

    let usage = parsed.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        candidates_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    Ok(VisionResponse { text, usage, raw })
}

// --- Gemini API response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
    total_token_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::encoder::encode_bytes;
    use crate::selection::{build_vision_request, SelectionRequest};

    #[test]
    fn body_uses_rest_field_names() {
        let files = vec![encode_bytes("a.png", b"abc", None)];
        let request = SelectionRequest::feedback_round(files, Some("1".into()), "sharper");
        let vision = build_vision_request(Category::Animal, "gemini-test", &request).unwrap();

        let body = request_body(&vision);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], Category::Animal.rubric());
        assert_eq!(body["generationConfig"]["responseMimeType"], "text/plain");
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_LOW_AND_ABOVE");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "YWJj");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "1");
    }

    #[test]
    fn text_parts_of_first_candidate_are_joined() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "2"}, {"text": "\n"}]}},
                {"content": {"role": "model", "parts": [{"text": "3"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 1200, "candidatesTokenCount": 1, "totalTokenCount": 1201}
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.text.as_deref(), Some("2\n"));
        assert_eq!(response.usage.unwrap().total_tokens, Some(1201));
        assert!(response.raw["candidates"].is_array());
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response = parse_response(body).unwrap();
        assert!(response.text.is_none());
        assert_eq!(response.raw["promptFeedback"]["blockReason"], "SAFETY");
    }

    #[test]
    fn non_json_body_is_an_api_error() {
        assert!(matches!(parse_response("<html>"), Err(PhotoError::Api { status: 200, .. })));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let model = GeminiVisionModel::new(None).with_base_url("http://127.0.0.1:9");
        let files = vec![encode_bytes("a.jpg", b"x", None)];
        let request =
            build_vision_request(Category::Portrait, "m", &SelectionRequest::first_round(files))
                .unwrap();

        let err = model.generate(&request).await.unwrap_err();
        assert!(matches!(err, PhotoError::MissingApiKey { .. }));
    }
}
