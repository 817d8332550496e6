//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::adapters::live::cloudinary::CloudinaryCdn;
use crate::adapters::live::gemini::GeminiVisionModel;
use crate::adapters::recording::image_cdn::RecordingImageCdn;
use crate::adapters::recording::vision_model::RecordingVisionModel;
use crate::adapters::replaying::image_cdn::ReplayingImageCdn;
use crate::adapters::replaying::vision_model::ReplayingVisionModel;
use crate::cassette::{Cassette, CassetteRecorder, CassetteReplayer};
use crate::config::Config;
use crate::error::PhotoError;
use crate::ports::{ImageCdn, VisionModel};

/// Environment variable naming a cassette to replay.
pub const REPLAY_ENV: &str = "BESTPHOTO_REPLAY";

/// Environment variable that turns on recording (`1` or `true`).
pub const RECORD_ENV: &str = "BESTPHOTO_REC";

const CASSETTE_DIR: &str = ".bestphoto/cassettes";

/// Bundles all port trait objects into a single context.
#[derive(Clone)]
pub struct ServiceContext {
    /// Vision model port.
    pub vision: Arc<dyn VisionModel>,
    /// Image CDN port.
    pub cdn: Arc<dyn ImageCdn>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette to disk.
    ///
    /// Every context created alongside this session must be dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds the recorder or the file
    /// cannot be written.
    pub fn finish(self) -> Result<PathBuf, PhotoError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| PhotoError::Config("Recording adapter still has references".into()))?
            .into_inner()
            .map_err(|_| PhotoError::Config("Cassette recorder lock poisoned".into()))?;
        recorder.finish()
    }
}

impl ServiceContext {
    /// Create a context that calls Gemini and Cloudinary.
    ///
    /// Missing keys are not an error here; they surface on the first call that
    /// needs them.
    #[must_use]
    pub fn live(config: &Config) -> Self {
        let vision = GeminiVisionModel::new(config.gemini_key());
        let cdn = CloudinaryCdn::new(
            config.cloud_name(),
            config.cloudinary_credentials(),
            config.cloudinary.upload_preset.clone(),
            config.cloudinary.folder.clone(),
        );
        Self { vision: Arc::new(vision), cdn: Arc::new(cdn) }
    }

    /// Create a live context whose calls are also written to a new cassette.
    #[must_use]
    pub fn recording(config: &Config) -> (Self, RecordingSession) {
        let live = Self::live(config);

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(CASSETTE_DIR).join(&timestamp).join("session.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-session"),
            get_commit_hash(),
        )));

        let ctx = Self {
            vision: Arc::new(RecordingVisionModel::new(live.vision, Arc::clone(&recorder))),
            cdn: Arc::new(RecordingImageCdn::new(live.cdn, Arc::clone(&recorder))),
        };
        (ctx, RecordingSession { recorder })
    }

    /// Create a context that answers every call from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, PhotoError> {
        let cassette = Cassette::load(path)?;
        let interactions = cassette.interactions.len();
        info!(cassette = %cassette.name, interactions, "cassette loaded");
        let replayer = CassetteReplayer::new(cassette);
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self {
            vision: Arc::new(ReplayingVisionModel::new(Arc::clone(&replayer))),
            cdn: Arc::new(ReplayingImageCdn::new(replayer)),
        })
    }

    /// Pick the mode from [`REPLAY_ENV`] and [`RECORD_ENV`]; replay wins over record.
    ///
    /// # Errors
    ///
    /// Returns an error if a replay cassette cannot be loaded.
    pub fn from_env(config: &Config) -> Result<(Self, Option<RecordingSession>), PhotoError> {
        if let Some(path) = std::env::var_os(REPLAY_ENV).filter(|p| !p.is_empty()) {
            info!(cassette = %Path::new(&path).display(), "replaying upstream calls");
            return Ok((Self::replaying(Path::new(&path))?, None));
        }
        let recording = std::env::var(RECORD_ENV).is_ok_and(|v| v == "true" || v == "1");
        if recording {
            info!("recording upstream calls");
            let (ctx, session) = Self::recording(config);
            return Ok((ctx, Some(session)));
        }
        Ok((Self::live(config), None))
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AssetUpload;

    const CASSETTE: &str = r#"
name: replay-test
recorded_at: 2025-05-01T10:00:00Z
commit: abc123
interactions:
  - seq: 0
    port: image_cdn
    method: upload
    input: {}
    output:
      Ok:
        public_id: bestphoto/cat
        secure_url: https://res.cloudinary.com/demo/image/upload/bestphoto/cat.jpg
  - seq: 1
    port: vision_model
    method: generate
    input: {}
    output:
      Err: "API error (429): quota"
"#;

    #[tokio::test]
    async fn replaying_context_serves_both_ports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.cassette.yaml");
        std::fs::write(&path, CASSETTE).unwrap();

        let ctx = ServiceContext::replaying(&path).unwrap();

        let upload = AssetUpload { file_name: "cat.jpg".into(), data: vec![1] };
        assert_eq!(ctx.cdn.upload(&upload).await.unwrap().public_id, "bestphoto/cat");

        let request = crate::selection::build_vision_request(
            crate::category::Category::Animal,
            "m",
            &crate::selection::SelectionRequest::first_round(vec![
                crate::encoder::encode_bytes("cat.jpg", &[1], None),
            ]),
        )
        .unwrap();
        let err = ctx.vision.generate(&request).await.unwrap_err();
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn missing_cassette_is_a_config_error() {
        let result = ServiceContext::replaying(Path::new("/nonexistent/x.cassette.yaml"));
        assert!(matches!(result, Err(PhotoError::Config(_))));
    }

    #[test]
    fn session_cannot_finish_while_context_is_alive() {
        let (ctx, session) = ServiceContext::recording(&Config::default());
        assert!(session.finish().is_err());
        drop(ctx);
    }
}
