//! Network readiness
//!
//! Platforms that download over the network must wait until basic
//! connectivity exists. Whatever tracks link and address state implements
//! [`NetworkReadiness`]; this crate only waits on it.

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::PlatformError;

/// Something that can tell when the network is usable
#[async_trait]
pub trait NetworkReadiness: Send + Sync {
    /// Block until the network is ready or `ctx` is cancelled
    async fn wait(&self, ctx: &CancellationToken) -> Result<(), PlatformError>;
}

/// Readiness source that is always satisfied
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

#[async_trait]
impl NetworkReadiness for AlwaysReady {
    async fn wait(&self, ctx: &CancellationToken) -> Result<(), PlatformError> {
        if ctx.is_cancelled() {
            return Err(PlatformError::Cancelled);
        }
        Ok(())
    }
}

/// Readiness driven by a boolean watch channel
#[derive(Debug, Clone)]
pub struct ReadinessSignal {
    rx: watch::Receiver<bool>,
}

impl ReadinessSignal {
    /// Create a signal and the sender used to flip it
    pub fn new() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }
}

#[async_trait]
impl NetworkReadiness for ReadinessSignal {
    async fn wait(&self, ctx: &CancellationToken) -> Result<(), PlatformError> {
        let mut rx = self.rx.clone();
        debug!("Waiting for network to become ready");

        tokio::select! {
            result = rx.wait_for(|ready| *ready) => result
                .map(|_| ())
                .map_err(|_| PlatformError::Network("readiness source closed".to_string())),
            _ = ctx.cancelled() => Err(PlatformError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_already_ready() {
        let (tx, signal) = ReadinessSignal::new();
        tx.send(true).unwrap();
        signal.wait(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_signal_becomes_ready() {
        let (tx, signal) = ReadinessSignal::new();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tx.send(true).unwrap();
        });
        signal.wait(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_signal_cancelled() {
        let (_tx, signal) = ReadinessSignal::new();
        let ctx = CancellationToken::new();
        ctx.cancel();
        let err = signal.wait(&ctx).await.unwrap_err();
        assert!(matches!(err, PlatformError::Cancelled));
    }

    #[tokio::test]
    async fn test_signal_sender_dropped() {
        let (tx, signal) = ReadinessSignal::new();
        drop(tx);
        let err = signal.wait(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PlatformError::Network(_)));
    }

    #[tokio::test]
    async fn test_always_ready() {
        AlwaysReady.wait(&CancellationToken::new()).await.unwrap();
    }
}
