//! Recording adapter for the `VisionModel` port.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record_result;
use crate::cassette::{CassetteRecorder, Port};
use crate::ports::vision_model::{VisionFuture, VisionModel, VisionRequest};

/// Passes requests to a live vision model and records every answer.
pub struct RecordingVisionModel {
    inner: Arc<dyn VisionModel>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingVisionModel {
    /// Wrap `inner`, writing interactions to `recorder`.
    pub fn new(inner: Arc<dyn VisionModel>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl VisionModel for RecordingVisionModel {
    fn generate(&self, request: &VisionRequest) -> VisionFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.generate(&request).await;
            // Image payloads stay out of the cassette.
            let input = json!({ "model": request.model, "turns": request.contents.len() });
            record_result(&self.recorder, Port::VisionModel, "generate", input, &result);
            result
        })
    }
}
