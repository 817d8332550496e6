//! Collects interactions during a live run.

use std::path::PathBuf;

use chrono::Utc;
use serde_json::Value;

use super::format::{Cassette, Interaction, Port};
use crate::error::PhotoError;

/// Holds interactions in memory until [`finish`](Self::finish) writes them out.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// A recorder that will write to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self { path: path.into(), name: name.into(), commit: commit.into(), interactions: vec![] }
    }

    /// Append an interaction. Sequence numbers are shared across ports.
    pub fn record(&mut self, port: Port, method: &str, input: Value, output: Value) {
        let seq = self.interactions.len() as u64;
        self.interactions.push(Interaction { seq, port, method: method.to_string(), input, output });
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Write the cassette and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, PhotoError> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions: self.interactions,
        };
        cassette.save(&self.path)?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interleaved_ports_share_one_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "session", "deadbeef");
        assert!(recorder.is_empty());
        recorder.record(
            Port::ImageCdn,
            "upload",
            json!({"file_name": "dog.jpg"}),
            json!({"Ok": {"public_id": "bestphoto/dog", "secure_url": "https://x/dog.jpg"}}),
        );
        recorder.record(
            Port::VisionModel,
            "generate",
            json!({"model": "gemini-test"}),
            json!({"Err": "API error (429): quota"}),
        );
        assert_eq!(recorder.len(), 2);

        let written = recorder.finish().unwrap();
        assert_eq!(written, path);

        let cassette = Cassette::load(&path).unwrap();
        let seqs: Vec<_> = cassette.interactions.iter().map(|i| (i.seq, i.port)).collect();
        assert_eq!(seqs, [(0, Port::ImageCdn), (1, Port::VisionModel)]);
        assert_eq!(cassette.commit, "deadbeef");
        assert_eq!(cassette.interactions[1].output["Err"], "API error (429): quota");
    }
}
