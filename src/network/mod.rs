//! Canonical network configuration
//!
//! Platforms translate whatever their metadata service reports into these
//! entities. The boot orchestrator merges them with other sources, ordering
//! them by [`ConfigLayer`].

mod hostname;

pub use hostname::HostnameSpec;

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Provenance of a configuration entity, lowest precedence first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLayer {
    #[default]
    Default,
    Cmdline,
    Platform,
    Operator,
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLayer::Default => write!(f, "default"),
            ConfigLayer::Cmdline => write!(f, "cmdline"),
            ConfigLayer::Platform => write!(f, "platform"),
            ConfigLayer::Operator => write!(f, "operator"),
        }
    }
}

/// NTP servers to synchronize time against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeServerSpec {
    pub ntp_servers: Vec<String>,
    pub config_layer: ConfigLayer,
}

/// DNS resolvers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSpec {
    pub dns_servers: Vec<IpAddr>,
    pub config_layer: ConfigLayer,
}

/// Identity of the instance as reported by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMetadata {
    pub platform: String,
    pub hostname: String,
    pub region: String,
    pub zone: String,
    pub instance_type: String,
    pub instance_id: String,
    pub provider_id: String,
}

/// Network configuration produced by a platform, delivered once to the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformNetworkConfig {
    #[serde(default)]
    pub time_servers: Vec<TimeServerSpec>,
    #[serde(default)]
    pub hostnames: Vec<HostnameSpec>,
    #[serde(default)]
    pub resolvers: Vec<ResolverSpec>,
    #[serde(default)]
    pub external_ips: Vec<IpAddr>,
    pub metadata: Option<PlatformMetadata>,
}

impl PlatformNetworkConfig {
    /// Serialize to pretty JSON for display
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_layer_ordering() {
        assert!(ConfigLayer::Platform > ConfigLayer::Cmdline);
        assert!(ConfigLayer::Operator > ConfigLayer::Platform);
        assert_eq!(ConfigLayer::Platform.to_string(), "platform");
    }

    #[test]
    fn test_network_config_json() {
        let config = PlatformNetworkConfig {
            external_ips: vec!["8.8.8.8".parse().unwrap()],
            resolvers: vec![ResolverSpec {
                dns_servers: vec!["1.1.1.1".parse().unwrap()],
                config_layer: ConfigLayer::Platform,
            }],
            ..Default::default()
        };

        let json = config.to_json().unwrap();
        assert!(json.contains("\"config_layer\": \"platform\""));
        assert!(json.contains("8.8.8.8"));

        let back: PlatformNetworkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
