//! Trip planner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::coordinator::CoordinatorConfig;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection
    pub api: ApiConfig,

    /// Where phase results are persisted
    pub storage: StorageConfig,

    /// Flow coordinator tuning
    pub coordinator: CoordinatorConfig,

    /// Log level used when --log-level is not given
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Fails fast when no API key can be resolved.
    pub fn validate(&self) -> Result<()> {
        self.api.api_key().map(|_| ())
    }

    /// Load configuration with fallback chain
    ///
    /// Explicit path, then `./.tripplanner.yml`, then
    /// `~/.config/tripplanner/tripplanner.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(".tripplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tripplanner").join("tripplanner.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Only the log level, read before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Inline API key, used when the environment variable is unset
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8002".to_string(),
            api_key_env: "TRIPPLANNER_API_KEY".to_string(),
            api_key: None,
            timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    /// Resolve the API key: environment variable first, then the inline key
    pub fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(&self.api_key_env)
            && !key.trim().is_empty()
        {
            return Ok(key);
        }
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                eyre::eyre!(
                    "API key not found. Set the {} environment variable or api.api-key in the config file.",
                    self.api_key_env
                )
            })
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding persisted phase results
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // XDG data directory (~/.local/share/tripplanner/state on Linux)
        let dir = dirs::data_dir()
            .map(|d| d.join("tripplanner").join("state"))
            .unwrap_or_else(|| PathBuf::from(".tripplanner"))
            .to_string_lossy()
            .into_owned();

        Self { dir }
    }
}
