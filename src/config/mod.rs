//! Platform settings
//!
//! Settings are optional: every field has a default pointing at the real
//! Alibaba Cloud endpoints. A settings file mostly exists to point the
//! platform at a different metadata server (tests, local emulators).

pub mod loader;

pub use loader::{DEFAULT_SETTINGS_PATH, load_settings};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::platforms::alibabacloud::{METADATA_ENDPOINT, USERDATA_ENDPOINT};

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Platform settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Platform to bootstrap (looked up by name)
    pub platform: String,

    /// Base URL of the instance metadata service
    pub metadata_endpoint: String,

    /// URL of the user-data document
    pub userdata_endpoint: String,

    /// Timeout applied to each HTTP request
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            platform: "alibabacloud".to_string(),
            metadata_endpoint: METADATA_ENDPOINT.to_string(),
            userdata_endpoint: USERDATA_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Parse settings from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
