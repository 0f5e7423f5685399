//! Settings loader

use super::Settings;
use crate::PlatformError;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/cloud-platform/platform.yaml";

/// Load settings from `path`, falling back to defaults when it does not exist
///
/// A file that exists but does not parse is an error.
pub async fn load_settings(path: impl AsRef<Path>) -> Result<Settings, PlatformError> {
    let path = path.as_ref();

    if !path.exists() {
        debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path).await?;
    let settings = Settings::from_yaml(&content)?;

    if settings.request_timeout_secs == 0 {
        return Err(PlatformError::Config(format!(
            "{}: request_timeout_secs must be greater than zero",
            path.display()
        )));
    }

    info!("Loaded settings from {}", path.display());
    Ok(settings)
}
