//! Alibaba Cloud instance metadata
//!
//! <https://www.alibabacloud.com/help/doc-detail/49122.htm>

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::AlibabaCloud;
use crate::PlatformError;

const KEY_HOSTNAME: &str = "hostname";
const KEY_INSTANCE_TYPE: &str = "instance/instance-type";
const KEY_INSTANCE_ID: &str = "instance-id";
const KEY_PUBLIC_IPV4: &str = "public-ipv4";
const KEY_REGION: &str = "region-id";
const KEY_ZONE: &str = "zone-id";
const KEY_NTP_SERVERS: &str = "ntp-conf/ntp-servers";
const KEY_NAMESERVERS: &str = "dns-conf/nameservers";

/// Raw instance metadata as reported by the metadata service
///
/// Empty strings mean the service reported nothing for that key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetadataConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub instance_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_ipv4: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub ntp_servers: Vec<String>,
    #[serde(default, rename = "name-servers")]
    pub nameservers: Vec<String>,
}

/// Issues GETs for individual keys below the metadata base URL
struct KeyFetcher<'a> {
    client: Client,
    base_url: &'a str,
    ctx: &'a CancellationToken,
}

impl KeyFetcher<'_> {
    async fn get(&self, key: &str) -> Result<String, PlatformError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), key);
        debug!("Fetching metadata key {}", key);

        tokio::select! {
            result = self.request(&url) => result,
            _ = self.ctx.cancelled() => Err(PlatformError::Cancelled),
        }
    }

    async fn request(&self, url: &str) -> Result<String, PlatformError> {
        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(PlatformError::status(url, response.status()));
        }

        Ok(response.text().await?)
    }

    /// Multi-valued keys are newline separated; an empty body yields `[""]`
    async fn get_lines(&self, key: &str) -> Result<Vec<String>, PlatformError> {
        let body = self.get(key).await?;
        Ok(body.split('\n').map(str::to_string).collect())
    }
}

impl AlibabaCloud {
    /// Fetch all metadata keys, stopping at the first failure
    pub async fn fetch_metadata(
        &self,
        ctx: &CancellationToken,
    ) -> Result<MetadataConfig, PlatformError> {
        let fetcher = KeyFetcher {
            client: Client::builder().timeout(self.timeout).build()?,
            base_url: &self.metadata_endpoint,
            ctx,
        };

        let hostname = fetcher.get(KEY_HOSTNAME).await?;
        let instance_type = fetcher.get(KEY_INSTANCE_TYPE).await?;
        let instance_id = fetcher.get(KEY_INSTANCE_ID).await?;
        let public_ipv4 = fetcher.get(KEY_PUBLIC_IPV4).await?;
        let region = fetcher.get(KEY_REGION).await?;
        let zone = fetcher.get(KEY_ZONE).await?;
        let ntp_servers = fetcher.get_lines(KEY_NTP_SERVERS).await?;
        let nameservers = fetcher.get_lines(KEY_NAMESERVERS).await?;

        Ok(MetadataConfig {
            hostname,
            instance_id,
            instance_type,
            public_ipv4,
            region,
            zone,
            ntp_servers,
            nameservers,
        })
    }
}
