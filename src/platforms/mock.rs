//! Mock platform for testing
//!
//! Provides a configurable platform for exercising code that consumes the
//! [`Platform`] trait without a metadata service.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{Mode, Platform, publish};
use crate::PlatformError;
use crate::kernel::KernelParameters;
use crate::netutils::NetworkReadiness;
use crate::network::PlatformNetworkConfig;

/// Mock platform for testing
///
/// # Example
/// ```
/// use cloud_platform_rs::platforms::mock::MockPlatform;
/// use cloud_platform_rs::network::PlatformNetworkConfig;
///
/// let mock = MockPlatform::new()
///     .with_configuration(b"version: v1alpha1".to_vec())
///     .with_network_config(PlatformNetworkConfig::default());
/// ```
pub struct MockPlatform {
    name: &'static str,
    mode: Mode,
    configuration: Option<Vec<u8>>,
    network_config: Option<PlatformNetworkConfig>,
    network_error: Option<String>,
}

impl MockPlatform {
    /// Create a new mock platform with default values
    pub fn new() -> Self {
        Self {
            name: "mock",
            mode: Mode::Metal,
            configuration: None,
            network_config: None,
            network_error: None,
        }
    }

    /// Set the platform name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Set the boot mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the configuration document; without one the mock reports no config source
    pub fn with_configuration(mut self, data: Vec<u8>) -> Self {
        self.configuration = Some(data);
        self
    }

    /// Set the network configuration to publish
    pub fn with_network_config(mut self, config: PlatformNetworkConfig) -> Self {
        self.network_config = Some(config);
        self
    }

    /// Make network configuration fail with a network error
    pub fn with_network_error(mut self, message: &str) -> Self {
        self.network_error = Some(message.to_string());
        self
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &'static str {
        self.name
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    async fn configuration(
        &self,
        ctx: &CancellationToken,
        readiness: &dyn NetworkReadiness,
    ) -> Result<Vec<u8>, PlatformError> {
        readiness.wait(ctx).await?;

        self.configuration
            .clone()
            .ok_or(PlatformError::NoConfigSource)
    }

    fn kernel_args(&self) -> KernelParameters {
        KernelParameters::default()
    }

    async fn network_configuration(
        &self,
        ctx: &CancellationToken,
        tx: &mpsc::Sender<PlatformNetworkConfig>,
    ) -> Result<(), PlatformError> {
        if let Some(message) = &self.network_error {
            return Err(PlatformError::Network(message.clone()));
        }

        let config = self.network_config.clone().unwrap_or_default();
        publish(ctx, tx, config).await
    }
}
