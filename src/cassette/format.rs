//! On-disk cassette format.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PhotoError;

/// The boundary a recorded call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Port {
    /// [`crate::ports::VisionModel`].
    VisionModel,
    /// [`crate::ports::ImageCdn`].
    ImageCdn,
}

impl Port {
    /// The name used in cassette files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VisionModel => "vision_model",
            Self::ImageCdn => "image_cdn",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded session of port interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Interactions in recording order.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording.
    pub seq: u64,
    /// Which port was called.
    pub port: Port,
    /// Method name on the port.
    pub method: String,
    /// Serialized call input. Informational only; replay does not match on it.
    #[serde(default)]
    pub input: serde_json::Value,
    /// Serialized result, `{"Ok": …}` or `{"Err": "…"}`.
    pub output: serde_json::Value,
}

impl Cassette {
    /// Read a cassette from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::Config`] naming the file if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PhotoError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PhotoError::Config(format!("Failed to load cassette {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            PhotoError::Config(format!("Failed to load cassette {}: {e}", path.display()))
        })
    }

    /// Write the cassette as YAML, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<(), PhotoError> {
        let yaml = serde_yaml::to_string(self).map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
