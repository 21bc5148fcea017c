//! Error types for quantbot

use thiserror::Error;

/// Main error type for quantbot
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plugin execution failed: {0}")]
    Execution(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Data-provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid lookback range '{0}': expected a day count, 'YTD' or 'MTD'")]
    InvalidRange(String),

    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    #[error("Failed to read signal table: {0}")]
    SignalTable(String),
}

/// Result type alias using BotError
pub type Result<T> = std::result::Result<T, BotError>;
