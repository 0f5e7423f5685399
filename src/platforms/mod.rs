//! Cloud platform implementations
//!
//! A platform knows how to fetch the machine configuration, which kernel
//! arguments the image needs, and how to turn the provider's metadata into
//! network configuration. Platforms are selected by name from a lookup table.

pub mod alibabacloud;
pub mod mock;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::PlatformError;
use crate::config::Settings;
use crate::kernel::KernelParameters;
use crate::netutils::NetworkReadiness;
use crate::network::PlatformNetworkConfig;

/// Boot mode a platform runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Cloud instance, configured from a metadata service
    Cloud,
    /// Running inside a container
    Container,
    /// Bare metal
    Metal,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Cloud => write!(f, "cloud"),
            Mode::Container => write!(f, "container"),
            Mode::Metal => write!(f, "metal"),
        }
    }
}

/// Trait for cloud platforms
#[async_trait]
pub trait Platform: Send + Sync {
    /// Name of this platform (e.g., "alibabacloud")
    fn name(&self) -> &'static str;

    /// Boot mode of this platform
    fn mode(&self) -> Mode;

    /// Fetch the raw machine configuration document
    ///
    /// Returns [`PlatformError::NoConfigSource`] when the platform has
    /// nothing to offer, which callers treat as "use defaults".
    async fn configuration(
        &self,
        ctx: &CancellationToken,
        readiness: &dyn NetworkReadiness,
    ) -> Result<Vec<u8>, PlatformError>;

    /// Extra kernel arguments required on this platform
    fn kernel_args(&self) -> KernelParameters;

    /// Produce network configuration and send it once on `tx`
    ///
    /// Blocks until the value is accepted by the channel or `ctx` is
    /// cancelled, whichever happens first.
    async fn network_configuration(
        &self,
        ctx: &CancellationToken,
        tx: &mpsc::Sender<PlatformNetworkConfig>,
    ) -> Result<(), PlatformError>;
}

type Constructor = fn(&Settings) -> Box<dyn Platform>;

fn new_alibabacloud(settings: &Settings) -> Box<dyn Platform> {
    Box::new(alibabacloud::AlibabaCloud::from_settings(settings))
}

/// Known platforms by name
const PLATFORMS: &[(&str, Constructor)] = &[("alibabacloud", new_alibabacloud)];

/// Names of all known platforms
pub fn platform_names() -> impl Iterator<Item = &'static str> {
    PLATFORMS.iter().map(|(name, _)| *name)
}

/// Look up a platform by name and construct it from `settings`
pub fn platform_by_name(
    name: &str,
    settings: &Settings,
) -> Result<Box<dyn Platform>, PlatformError> {
    PLATFORMS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, constructor)| constructor(settings))
        .ok_or_else(|| PlatformError::UnknownPlatform(name.to_string()))
}

/// Hand `value` to the consumer, unless `ctx` is cancelled first
///
/// A token that is already cancelled always wins, even if the channel has room.
pub(crate) async fn publish(
    ctx: &CancellationToken,
    tx: &mpsc::Sender<PlatformNetworkConfig>,
    value: PlatformNetworkConfig,
) -> Result<(), PlatformError> {
    if ctx.is_cancelled() {
        return Err(PlatformError::Cancelled);
    }

    tokio::select! {
        sent = tx.send(value) => sent.map_err(|_| PlatformError::ChannelClosed),
        _ = ctx.cancelled() => Err(PlatformError::Cancelled),
    }
}

/// Drive a platform's network configuration through a one-slot channel
///
/// This is the consumer side of [`Platform::network_configuration`].
pub async fn acquire_network_config(
    platform: &dyn Platform,
    ctx: &CancellationToken,
) -> Result<PlatformNetworkConfig, PlatformError> {
    let (tx, mut rx) = mpsc::channel(1);

    platform.network_configuration(ctx, &tx).await?;
    drop(tx);

    rx.recv().await.ok_or(PlatformError::ChannelClosed)
}
