//! Configuration for askme.
//!
//! The configuration lives in `<data-dir>/config.json`. The API key is never
//! stored here; it comes from the command line or the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::generation::GenerationConfig;
use crate::store::DEFAULT_HISTORY_KEY;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".askme";

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Subdirectory of the data directory holding key-value slots.
pub const STORAGE_DIR: &str = "storage";

/// Main configuration for askme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model id sent to the API.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Storage key of the conversation log.
    #[serde(default = "default_history_key")]
    pub history_key: String,

    /// Optional timeout for a single generation call. None waits forever.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Sampling parameters sent with every request.
    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_history_key() -> String {
    DEFAULT_HISTORY_KEY.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_api_base_url(),
            history_key: default_history_key(),
            timeout_seconds: None,
            generation: GenerationConfig::default(),
        }
    }
}

impl Config {
    /// Path of the config file inside `data_dir`.
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Directory of the key-value slots inside `data_dir`, kept apart from
    /// the config file so no history key can overwrite it.
    pub fn storage_dir(data_dir: &Path) -> PathBuf {
        data_dir.join(STORAGE_DIR)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration, falling back to defaults when the file is missing.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Generation timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.history_key, "history");
        assert_eq!(config.timeout_seconds, None);
        assert!(config.timeout().is_none());
        assert_eq!(config.generation.top_k, 64);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"model": "gemini-1.5-pro", "timeout_seconds": 30}"#).unwrap();
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = Config::path_in(&temp.path().join("nested"));

        let config = Config {
            history_key: "work".into(),
            ..Config::default()
        };
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_storage_dir_is_separate_from_config() {
        let data_dir = Path::new("/data");
        assert_eq!(Config::storage_dir(data_dir), Path::new("/data/storage"));
        assert_ne!(
            Config::storage_dir(data_dir),
            Config::path_in(data_dir).parent().unwrap()
        );
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_or_default(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Config::load_or_default(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_saved_config_has_no_api_key() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("api_key"));
    }
}
