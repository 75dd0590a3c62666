//! Configuration file support for gymlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gymlog/config.toml`.
//! Every section and key is optional.

use crate::catalog::DEMO_USER_ID;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub advice: AdviceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// User every request is scoped to
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user_id: default_user_id(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Advice backend configuration (any OpenAI-compatible endpoint)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdviceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AdviceConfig {
    /// API key from the configured environment variable, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Log output format
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Logging configuration; `RUST_LOG` still overrides `level`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    5000
}

fn default_user_id() -> String {
    DEMO_USER_ID.into()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from the standard config path
    ///
    /// Returns the file that was read, or `None` if defaults were used.
    /// Runs before logging is set up, so callers report the source.
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Ok((Self::load_from(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("gymlog").join("config.toml"))
    }

    /// Reject values that would only fail later at startup
    pub fn validate(&self) -> Result<()> {
        if self.server.user_id.trim().is_empty() {
            return Err(Error::Config("server.user_id must not be empty".into()));
        }
        if self.advice.timeout_secs == 0 {
            return Err(Error::Config("advice.timeout_secs must be positive".into()));
        }
        if !self.advice.base_url.starts_with("http://") && !self.advice.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "advice.base_url must be an http(s) URL, got '{}'",
                self.advice.base_url
            )));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
