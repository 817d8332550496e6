//! Replaying adapter for the `VisionModel` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::{CassetteReplayer, Port};
use crate::ports::vision_model::{VisionFuture, VisionModel, VisionRequest, VisionResponse};

/// Answers vision requests from a cassette.
pub struct ReplayingVisionModel {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingVisionModel {
    /// Create a replaying vision model backed by `replayer`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl VisionModel for ReplayingVisionModel {
    fn generate(&self, _request: &VisionRequest) -> VisionFuture<'_> {
        let output = next_output(&self.replayer, Port::VisionModel, "generate");
        Box::pin(async move { replay_result::<VisionResponse>(output?) })
    }
}
