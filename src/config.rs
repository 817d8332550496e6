//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Cloudinary account settings.
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Vision selection settings.
    #[serde(default)]
    pub selection: SelectionConfig,
}

/// API key configuration.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Cloudinary account settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloudinaryConfig {
    /// Cloud name used in API and delivery URLs.
    pub cloud_name: Option<String>,
    /// Admin API key.
    pub api_key: Option<String>,
    /// Admin API secret.
    pub api_secret: Option<String>,
    /// Unsigned upload preset.
    pub upload_preset: String,
    /// Folder that uploads are placed in.
    pub folder: String,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            upload_preset: "bestphoto".to_string(),
            folder: "bestphoto".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Directory holding the `uploads/` and `my-photos/` stores.
    pub public_dir: PathBuf,
    /// Maximum request body size in MiB.
    pub body_limit_mb: usize,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            body_limit_mb: 64,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Vision selection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Model name or short alias.
    pub model: String,
    /// Automatic retries after a transport failure (capped at one).
    pub transport_retries: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { model: "gemini-flash".to_string(), transport_retries: 1 }
    }
}

/// Credentials for the Cloudinary Admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    /// Admin API key.
    pub api_key: String,
    /// Admin API secret.
    pub api_secret: String,
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Gemini API key, preferring environment variable.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        env_non_empty("GEMINI_API_KEY").or_else(|| self.keys.gemini.clone())
    }

    /// Get the Cloudinary cloud name, preferring environment variable.
    #[must_use]
    pub fn cloud_name(&self) -> Option<String> {
        env_non_empty("CLOUDINARY_CLOUD_NAME").or_else(|| self.cloudinary.cloud_name.clone())
    }

    /// Get the Cloudinary Admin API credentials, preferring environment variables.
    ///
    /// Both the key and the secret must be present.
    #[must_use]
    pub fn cloudinary_credentials(&self) -> Option<CloudinaryCredentials> {
        let api_key =
            env_non_empty("CLOUDINARY_API_KEY").or_else(|| self.cloudinary.api_key.clone())?;
        let api_secret =
            env_non_empty("CLOUDINARY_API_SECRET").or_else(|| self.cloudinary.api_secret.clone())?;
        Some(CloudinaryCredentials { api_key, api_secret })
    }

    /// Directory of the general upload store.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.server.public_dir.join("uploads")
    }

    /// Directory of the saved "My Photos" store.
    #[must_use]
    pub fn my_photos_dir(&self) -> PathBuf {
        self.server.public_dir.join("my-photos")
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `BESTPHOTO_CONFIG` environment variable
/// 3. `~/.config/bestphoto/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("BESTPHOTO_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/bestphoto/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/bestphoto/config.toml")
    } else {
        PathBuf::from("bestphoto.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.keys.gemini.is_none());
        assert!(config.cloudinary.cloud_name.is_none());
        assert_eq!(config.cloudinary.upload_preset, "bestphoto");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.selection.model, "gemini-flash");
        assert_eq!(config.selection.transport_retries, 1);
        assert_eq!(config.uploads_dir(), PathBuf::from("public/uploads"));
        assert_eq!(config.my_photos_dir(), PathBuf::from("public/my-photos"));
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn load_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[keys]
gemini = "test-gemini-key"

[cloudinary]
cloud_name = "demo"
api_key = "k"
api_secret = "s"

[server]
port = 8080
public_dir = "/srv/bestphoto"

[selection]
model = "gemini-pro"
transport_retries = 0
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.keys.gemini.as_deref(), Some("test-gemini-key"));
        assert_eq!(config.cloudinary.cloud_name.as_deref(), Some("demo"));
        assert_eq!(config.cloudinary.folder, "bestphoto");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.uploads_dir(), PathBuf::from("/srv/bestphoto/uploads"));
        assert_eq!(config.selection.model, "gemini-pro");
        assert_eq!(config.selection.transport_retries, 0);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn credentials_need_key_and_secret() {
        let mut config = Config::default();
        config.cloudinary.api_key = Some("k".into());
        std::env::remove_var("CLOUDINARY_API_KEY");
        std::env::remove_var("CLOUDINARY_API_SECRET");
        assert!(config.cloudinary_credentials().is_none());

        config.cloudinary.api_secret = Some("s".into());
        assert_eq!(
            config.cloudinary_credentials(),
            Some(CloudinaryCredentials { api_key: "k".into(), api_secret: "s".into() })
        );
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
