use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Endpoint name consumers relate to.
pub const DNS_PROVIDER: &str = "dns-provider";
/// Cluster domain advertised to consumers.
pub const CLUSTER_DOMAIN: &str = "cluster.local";
/// Port CoreDNS listens on.
pub const DNS_PORT: u16 = 53;

/// Key/value contents of one relation data bucket.
pub type RelationData = IndexMap<String, String>;

/// Numeric relation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(pub u32);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RelationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both `3` and the `dns-provider:3` form operators copy from status output.
        let raw = s.rsplit_once(':').map_or(s, |(_, id)| id);
        raw.parse().map(Self)
    }
}

/// A relation as seen from this unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationId,
    pub endpoint: String,
    pub remote_app: String,
    #[serde(default)]
    pub units: Vec<String>,
}

/// Payload published to `dns-provider` consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsProviderData {
    pub domain: String,
    #[serde(rename = "sdn-ip")]
    pub sdn_ip: IpAddr,
    pub port: u16,
}

impl DnsProviderData {
    pub fn new(sdn_ip: IpAddr) -> Self {
        Self {
            domain: CLUSTER_DOMAIN.into(),
            sdn_ip,
            port: DNS_PORT,
        }
    }

    /// Flatten into relation data; every value is a string on the wire.
    pub fn to_relation_data(&self) -> RelationData {
        IndexMap::from([
            ("domain".to_owned(), self.domain.clone()),
            ("sdn-ip".to_owned(), self.sdn_ip.to_string()),
            ("port".to_owned(), self.port.to_string()),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn relation_id_parses_endpoint_prefix() {
        assert_eq!("dns-provider:7".parse::<RelationId>().unwrap(), RelationId(7));
        assert_eq!("7".parse::<RelationId>().unwrap(), RelationId(7));
        assert!("dns-provider".parse::<RelationId>().is_err());
    }

    #[test]
    fn payload_uses_wire_keys_and_string_values() {
        let data = DnsProviderData::new(IpAddr::V4(Ipv4Addr::LOCALHOST)).to_relation_data();
        let pairs: Vec<_> = data.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            [("domain", "cluster.local"), ("sdn-ip", "127.0.0.1"), ("port", "53")]
        );
    }
}
