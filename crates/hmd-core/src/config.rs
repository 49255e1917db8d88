//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/hmd-sync/config.toml)
//! 3. Environment variables (HMD_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::buffer::{BufferId, SessionParams};

/// Environment variable prefix
const ENV_PREFIX: &str = "HMD";

/// Default debounce quiet period
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 250;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the update API
    #[serde(default)]
    pub api_uri: String,

    /// Opaque credential sent with every update
    #[serde(default)]
    pub token: String,

    /// Quiet period before buffered edits are flushed
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,

    /// Timeout for a single update request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_uri: String::new(),
            token: String::new(),
            quiet_period_ms: default_quiet_period_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (HMD_API_URI, HMD_TOKEN, HMD_QUIET_PERIOD_MS, ...)
    /// 2. Config file (~/.config/hmd-sync/config.toml or HMD_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make a session unusable
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // HMD_API_URI
        if let Ok(val) = std::env::var(format!("{}_API_URI", ENV_PREFIX)) {
            self.api_uri = val;
        }

        // HMD_TOKEN
        if let Ok(val) = std::env::var(format!("{}_TOKEN", ENV_PREFIX)) {
            self.token = val;
        }

        // Numeric overrides are ignored when they don't parse
        if let Some(val) = env_u64("QUIET_PERIOD_MS") {
            self.quiet_period_ms = val;
        }
        if let Some(val) = env_u64("REQUEST_TIMEOUT_SECS").filter(|&secs| secs > 0) {
            self.request_timeout_secs = val;
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with HMD_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hmd-sync")
            .join("config.toml")
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session parameters for a buffer, using the configured endpoint and token
    pub fn session_params(&self, buffer_id: impl Into<BufferId>) -> SessionParams {
        SessionParams::new(buffer_id)
            .with_api_uri(self.api_uri.clone())
            .with_token(self.token.clone())
    }
}

fn env_u64(suffix: &str) -> Option<u64> {
    std::env::var(format!("{}_{}", ENV_PREFIX, suffix))
        .ok()
        .and_then(|val| val.trim().parse().ok())
}

fn default_quiet_period_ms() -> u64 {
    DEFAULT_QUIET_PERIOD_MS
}

fn default_request_timeout_secs() -> u64 {
    30
}
