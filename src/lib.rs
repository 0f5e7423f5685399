//! cloud-platform-rs library
//!
//! Early-boot cloud platform support: fetch instance metadata, translate it
//! into network configuration and download the machine configuration from
//! user-data.
//!
//! # Design Principles
//!
//! - **Safety First**: No unsafe code (`#![forbid(unsafe_code)]`)
//! - **One attempt, one outcome**: no hidden retries, callers own the policy
//! - **Cancellable**: every blocking call races a [`CancellationToken`]
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod config;
pub mod download;
pub mod kernel;
pub mod netutils;
pub mod network;
pub mod platforms;

mod error;

pub use error::PlatformError;
pub use platforms::{Mode, Platform, acquire_network_config, platform_by_name};
