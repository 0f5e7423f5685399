//! Hostname configuration entity

use serde::{Deserialize, Serialize};

use super::ConfigLayer;
use crate::PlatformError;

const MAX_LABEL_LEN: usize = 63;
const MAX_FQDN_LEN: usize = 253;

/// Hostname and domain name of the node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostnameSpec {
    pub hostname: String,
    pub domainname: String,
    pub config_layer: ConfigLayer,
}

impl HostnameSpec {
    /// Create an empty spec tagged with the given layer
    pub fn new(config_layer: ConfigLayer) -> Self {
        Self {
            config_layer,
            ..Default::default()
        }
    }

    /// Split a fully qualified domain name into hostname and domain name
    ///
    /// The text before the first dot becomes the hostname, the rest the
    /// domain name. Only lengths are checked.
    pub fn parse_fqdn(&mut self, fqdn: &str) -> Result<(), PlatformError> {
        let (hostname, domainname) = fqdn.split_once('.').unwrap_or((fqdn, ""));

        if hostname.is_empty() {
            return Err(PlatformError::parse(format!(
                "hostname can't be empty in {:?}",
                fqdn
            )));
        }

        if hostname.len() > MAX_LABEL_LEN {
            return Err(PlatformError::parse(format!(
                "hostname can't be longer than {} characters: {:?}",
                MAX_LABEL_LEN, hostname
            )));
        }

        if fqdn.len() > MAX_FQDN_LEN {
            return Err(PlatformError::parse(format!(
                "fqdn can't be longer than {} characters: {} given",
                MAX_FQDN_LEN,
                fqdn.len()
            )));
        }

        self.hostname = hostname.to_string();
        self.domainname = domainname.to_string();
        Ok(())
    }

    /// Hostname joined with the domain name, if any
    pub fn fqdn(&self) -> String {
        if self.domainname.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}.{}", self.hostname, self.domainname)
        }
    }
}
