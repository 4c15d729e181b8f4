//! Configuration types for jalchat.
//!
//! The configuration names the backend endpoint and the persona and
//! language choices offered to the user. Every field has a default, so a
//! missing or partial file still yields a usable config.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding the config file and logs, relative to the working directory.
pub const CONFIG_DIR: &str = ".jalchat";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Main configuration for jalchat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Full URL of the chat endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Client-side request timeout. `None` waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Personas offered in the persona selector.
    #[serde(default = "default_personas")]
    pub personas: Vec<String>,

    /// Languages offered in the language selector.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Persona selected at startup.
    #[serde(default = "default_persona")]
    pub default_persona: String,

    /// Language selected at startup.
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5000/chat".into()
}

fn default_personas() -> Vec<String> {
    vec![
        "General Public".into(),
        "Farmer".into(),
        "Scientist".into(),
        "Policy Maker".into(),
    ]
}

fn default_languages() -> Vec<String> {
    vec![
        "English".into(),
        "Hindi".into(),
        "Marathi".into(),
        "Tamil".into(),
        "Bengali".into(),
    ]
}

fn default_persona() -> String {
    "General Public".into()
}

fn default_language() -> String {
    "English".into()
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration, falling back to defaults if the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Save to a new file, refusing to overwrite an existing one.
    pub fn save_new(&self, path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        self.save(path)
    }

    /// Default config path under `base`.
    pub fn default_path(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Parsed endpoint URL.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }

    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: None,
            personas: default_personas(),
            languages: default_languages(),
            default_persona: default_persona(),
            default_language: default_language(),
        }
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

    /// Endpoint is not a valid absolute URL.
    #[error("Invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Refused to overwrite an existing config.
    #[error("Config already exists at {0}")]
    AlreadyExists(PathBuf),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}
