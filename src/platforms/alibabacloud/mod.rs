//! Alibaba Cloud platform
//!
//! Reads instance metadata from the unauthenticated metadata service at
//! 100.100.100.200 and the machine configuration from instance user-data.

mod metadata;

pub use metadata::MetadataConfig;

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Mode, Platform, publish};
use crate::PlatformError;
use crate::config::Settings;
use crate::download::Download;
use crate::kernel::{KERNEL_PARAM_NET_IFNAMES, KernelParameter, KernelParameters};
use crate::netutils::NetworkReadiness;
use crate::network::{
    ConfigLayer, HostnameSpec, PlatformMetadata, PlatformNetworkConfig, ResolverSpec,
    TimeServerSpec,
};

/// Metadata service base URL (link-local style address)
pub const METADATA_ENDPOINT: &str = "http://100.100.100.200/latest/meta-data";

/// User-data URL
pub const USERDATA_ENDPOINT: &str = "http://100.100.100.200/latest/user-data";

/// Per-request timeout against the metadata service
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Alibaba Cloud platform
#[derive(Debug, Clone)]
pub struct AlibabaCloud {
    metadata_endpoint: String,
    userdata_endpoint: String,
    timeout: Duration,
}

impl AlibabaCloud {
    pub fn new() -> Self {
        Self::with_endpoints(METADATA_ENDPOINT, USERDATA_ENDPOINT)
    }

    /// Create with custom endpoints (for testing)
    pub fn with_endpoints(metadata_endpoint: &str, userdata_endpoint: &str) -> Self {
        Self {
            metadata_endpoint: metadata_endpoint.to_string(),
            userdata_endpoint: userdata_endpoint.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_endpoints(&settings.metadata_endpoint, &settings.userdata_endpoint)
            .with_timeout(settings.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Translate raw metadata into network configuration
    ///
    /// Nameservers and the public address that do not parse as IPs are
    /// dropped. An invalid hostname fails the whole translation.
    pub fn parse_metadata(
        &self,
        metadata: &MetadataConfig,
    ) -> Result<PlatformNetworkConfig, PlatformError> {
        let mut config = PlatformNetworkConfig {
            time_servers: vec![TimeServerSpec {
                ntp_servers: metadata.ntp_servers.clone(),
                config_layer: ConfigLayer::Platform,
            }],
            ..Default::default()
        };

        if !metadata.hostname.is_empty() {
            let mut hostname = HostnameSpec::new(ConfigLayer::Platform);
            hostname.parse_fqdn(&metadata.hostname)?;
            config.hostnames.push(hostname);
        }

        if !metadata.nameservers.is_empty() {
            let dns_servers = metadata
                .nameservers
                .iter()
                .filter_map(|ns| parse_ip(ns, "nameserver"))
                .collect();

            config.resolvers.push(ResolverSpec {
                dns_servers,
                config_layer: ConfigLayer::Platform,
            });
        }

        if !metadata.public_ipv4.is_empty() {
            config
                .external_ips
                .extend(parse_ip(&metadata.public_ipv4, "public address"));
        }

        config.metadata = Some(PlatformMetadata {
            platform: self.name().to_string(),
            hostname: metadata.hostname.clone(),
            region: metadata.region.clone(),
            zone: metadata.zone.clone(),
            instance_type: metadata.instance_type.clone(),
            instance_id: metadata.instance_id.clone(),
            provider_id: format!("{}.{}", metadata.region, metadata.instance_id),
        });

        Ok(config)
    }
}

impl Default for AlibabaCloud {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_ip(value: &str, what: &str) -> Option<IpAddr> {
    match value.parse() {
        Ok(ip) => Some(ip),
        Err(_) => {
            debug!("Ignoring unparseable {} {:?}", what, value);
            None
        }
    }
}

#[async_trait]
impl Platform for AlibabaCloud {
    fn name(&self) -> &'static str {
        "alibabacloud"
    }

    fn mode(&self) -> Mode {
        Mode::Cloud
    }

    async fn configuration(
        &self,
        ctx: &CancellationToken,
        readiness: &dyn NetworkReadiness,
    ) -> Result<Vec<u8>, PlatformError> {
        readiness.wait(ctx).await?;

        Download::new(&self.userdata_endpoint)
            .with_timeout(self.timeout)
            .with_error_on_not_found(|| PlatformError::NoConfigSource)
            .with_error_on_empty_response(|| PlatformError::NoConfigSource)
            .fetch(ctx)
            .await
    }

    fn kernel_args(&self) -> KernelParameters {
        KernelParameters::from(vec![
            KernelParameter::new("console").append("tty1").append("ttyS0"),
            KernelParameter::new(KERNEL_PARAM_NET_IFNAMES).append("0"),
        ])
    }

    async fn network_configuration(
        &self,
        ctx: &CancellationToken,
        tx: &mpsc::Sender<PlatformNetworkConfig>,
    ) -> Result<(), PlatformError> {
        info!("Fetching alibabacloud instance config");

        let metadata = self.fetch_metadata(ctx).await?;
        let config = self.parse_metadata(&metadata)?;

        publish(ctx, tx, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> MetadataConfig {
        MetadataConfig {
            hostname: "host1.example.com".to_string(),
            instance_id: "i-abc123".to_string(),
            instance_type: "ecs.g6.large".to_string(),
            public_ipv4: "8.8.8.8".to_string(),
            region: "cn-hangzhou".to_string(),
            zone: "cn-hangzhou-h".to_string(),
            ntp_servers: vec!["ntp1".to_string(), "ntp2".to_string()],
            nameservers: vec!["1.1.1.1".to_string(), "bad-ip".to_string()],
        }
    }

    #[test]
    fn test_parse_metadata_full() {
        let config = AlibabaCloud::new().parse_metadata(&sample_metadata()).unwrap();

        assert_eq!(config.time_servers.len(), 1);
        assert_eq!(config.time_servers[0].ntp_servers, vec!["ntp1", "ntp2"]);
        assert_eq!(config.time_servers[0].config_layer, ConfigLayer::Platform);

        assert_eq!(config.hostnames.len(), 1);
        assert_eq!(config.hostnames[0].hostname, "host1");
        assert_eq!(config.hostnames[0].domainname, "example.com");
        assert_eq!(config.hostnames[0].config_layer, ConfigLayer::Platform);

        assert_eq!(config.resolvers.len(), 1);
        assert_eq!(
            config.resolvers[0].dns_servers,
            vec!["1.1.1.1".parse::<IpAddr>().unwrap()]
        );
        assert_eq!(config.resolvers[0].config_layer, ConfigLayer::Platform);

        assert_eq!(config.external_ips, vec!["8.8.8.8".parse::<IpAddr>().unwrap()]);

        let metadata = config.metadata.unwrap();
        assert_eq!(metadata.platform, "alibabacloud");
        assert_eq!(metadata.hostname, "host1.example.com");
        assert_eq!(metadata.zone, "cn-hangzhou-h");
        assert_eq!(metadata.instance_type, "ecs.g6.large");
        assert_eq!(metadata.provider_id, "cn-hangzhou.i-abc123");
    }

    #[test]
    fn test_parse_metadata_empty_hostname() {
        let metadata = MetadataConfig {
            hostname: String::new(),
            ..sample_metadata()
        };

        let config = AlibabaCloud::new().parse_metadata(&metadata).unwrap();
        assert!(config.hostnames.is_empty());
    }

    #[test]
    fn test_parse_metadata_invalid_hostname_is_fatal() {
        let metadata = MetadataConfig {
            hostname: "x".repeat(64),
            ..sample_metadata()
        };

        let err = AlibabaCloud::new().parse_metadata(&metadata).unwrap_err();
        assert!(matches!(err, PlatformError::Parse(_)));
    }

    #[test]
    fn test_parse_metadata_nameserver_order_preserved() {
        let metadata = MetadataConfig {
            nameservers: vec![
                "100.100.2.138".to_string(),
                "".to_string(),
                "junk".to_string(),
                "2001:db8::1".to_string(),
                "100.100.2.136".to_string(),
            ],
            ..sample_metadata()
        };

        let config = AlibabaCloud::new().parse_metadata(&metadata).unwrap();
        let expected: Vec<IpAddr> = ["100.100.2.138", "2001:db8::1", "100.100.2.136"]
            .iter()
            .map(|ip| ip.parse().unwrap())
            .collect();
        assert_eq!(config.resolvers[0].dns_servers, expected);
    }

    #[test]
    fn test_parse_metadata_all_nameservers_invalid() {
        let metadata = MetadataConfig {
            nameservers: vec!["".to_string()],
            ..sample_metadata()
        };

        let config = AlibabaCloud::new().parse_metadata(&metadata).unwrap();
        assert_eq!(config.resolvers.len(), 1);
        assert!(config.resolvers[0].dns_servers.is_empty());
    }

    #[test]
    fn test_parse_metadata_sparse() {
        let metadata = MetadataConfig::default();

        let config = AlibabaCloud::new().parse_metadata(&metadata).unwrap();
        assert_eq!(config.time_servers.len(), 1);
        assert!(config.time_servers[0].ntp_servers.is_empty());
        assert!(config.hostnames.is_empty());
        assert!(config.resolvers.is_empty());
        assert!(config.external_ips.is_empty());
        assert_eq!(config.metadata.unwrap().provider_id, ".");
    }

    #[test]
    fn test_parse_metadata_bad_public_ip_skipped() {
        let metadata = MetadataConfig {
            public_ipv4: "300.1.1.1".to_string(),
            ..sample_metadata()
        };

        let config = AlibabaCloud::new().parse_metadata(&metadata).unwrap();
        assert!(config.external_ips.is_empty());
    }

    #[test]
    fn test_kernel_args() {
        let args = AlibabaCloud::new().kernel_args();
        assert_eq!(args.to_string(), "console=tty1 console=ttyS0 net.ifnames=0");
    }

    #[test]
    fn test_alibabacloud_default() {
        let platform = AlibabaCloud::default();
        assert_eq!(platform.name(), "alibabacloud");
        assert_eq!(platform.mode(), Mode::Cloud);
        assert_eq!(platform.metadata_endpoint, METADATA_ENDPOINT);
        assert_eq!(platform.timeout, Duration::from_secs(10));
    }
}
