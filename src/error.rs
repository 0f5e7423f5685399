//! Error types for cloud-platform-rs

use thiserror::Error;

/// Main error type for platform bootstrap operations
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned status code {status}")]
    Status { url: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No configuration source")]
    NoConfigSource,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Network configuration consumer has gone away")]
    ChannelClosed,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlatformError {
    /// Create a status error for a non-200 response
    pub fn status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self::Status {
            url: url.into(),
            status: status.as_u16(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// True for the "nothing to fetch" signal, as opposed to a real failure
    pub fn is_no_config_source(&self) -> bool {
        matches!(self, Self::NoConfigSource)
    }
}
