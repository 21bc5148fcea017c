//! Configuration management for quantbot
//!
//! Handles loading configuration from a TOML file with environment
//! variable overrides. The `plugins` list selects which capability
//! plugins the registry activates, in order.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered list of plugin keys to activate (e.g. "eodhd", "signals").
    /// Unrecognized keys are skipped at registry construction.
    pub plugins: Vec<String>,
    pub provider: ProviderConfig,
    pub signals: SignalConfig,
}

/// Historical-data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the EOD historical data API
    pub base_url: String,
    /// Environment variable containing the API token
    pub api_key_env: String,
    /// Exchange suffix appended to symbols
    pub exchange: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Signal table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Path to the precomputed composite signal table (CSV)
    pub file: PathBuf,
    /// Provenance label reported for signal lookups
    pub source_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugins: vec!["eodhd".to_string(), "signals".to_string()],
            provider: ProviderConfig::default(),
            signals: SignalConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eodhd.com/api".to_string(),
            api_key_env: "EOD_HISTORICAL_API_KEY".to_string(),
            exchange: "CC".to_string(),
            timeout: 30,
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("data/cc_composite_signal.csv"),
            source_name: "aspa".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                debug!("Loading config from {:?}", path);
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
                toml::from_str(&contents)
                    .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?
            }
            None => Config::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("QUANTBOT_PROVIDER_URL") {
            self.provider.base_url = base_url;
        }
        if let Ok(file) = std::env::var("QUANTBOT_SIGNAL_FILE") {
            self.signals.file = PathBuf::from(file);
        }
        if let Ok(plugins) = std::env::var("QUANTBOT_PLUGINS") {
            self.plugins = plugins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.is_empty() {
            return Err(ConfigError::Invalid("provider.base_url is empty".to_string()));
        }
        if self.provider.api_key_env.is_empty() {
            return Err(ConfigError::Invalid("provider.api_key_env is empty".to_string()));
        }
        Ok(())
    }

    /// Get the provider API token from the environment, if set.
    /// Absence is tolerated here; provider calls will fail at execution time.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.provider.api_key_env).ok()
    }
}
