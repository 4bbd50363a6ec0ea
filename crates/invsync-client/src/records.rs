//! Lookup records returned by the store's filter endpoints

use invsync_inventory::MacAddress;
use serde::Deserialize;

/// Result row of `base-objects/?ip=`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BaseObjectRecord {
    pub id: u64,
}

/// Reference to the interface an IP address is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EthernetRef {
    pub id: u64,
    #[serde(default)]
    pub mac: Option<MacAddress>,
}

/// Result row of `ipaddresses/?...`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IpAddressRecord {
    #[serde(default)]
    pub id: u64,
    pub address: String,
    #[serde(default)]
    pub is_management: bool,
    #[serde(default)]
    pub dhcp_expose: bool,
    #[serde(default)]
    pub ethernet: Option<EthernetRef>,
}

/// Filter for `ipaddresses/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpAddressQuery {
    /// `?address=<ip>`
    Address(String),
    /// `?ethernet__mac=<mac>`
    EthernetMac(MacAddress),
}

impl IpAddressQuery {
    /// Query-string pair for this filter
    #[must_use]
    pub fn query_pair(&self) -> (&'static str, String) {
        match self {
            IpAddressQuery::Address(address) => ("address", address.clone()),
            IpAddressQuery::EthernetMac(mac) => ("ethernet__mac", mac.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_address_record() {
        let raw = r#"{
            "id": 10,
            "address": "10.0.0.1",
            "hostname": "host.dc",
            "is_management": true,
            "dhcp_expose": false,
            "ethernet": {"id": 7, "mac": "aa:bb:cc:dd:ee:ff", "url": "http://ralph/api/ethernets/7/"}
        }"#;
        let record: IpAddressRecord = serde_json::from_str(raw).unwrap();
        assert!(record.is_management);
        assert_eq!(record.ethernet.map(|e| e.id), Some(7));
    }

    #[test]
    fn test_ip_address_without_ethernet() {
        let record: IpAddressRecord =
            serde_json::from_str(r#"{"address": "10.0.0.2", "ethernet": null}"#).unwrap();
        assert!(record.ethernet.is_none());
        assert!(!record.dhcp_expose);
    }

    #[test]
    fn test_query_pairs() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(
            IpAddressQuery::EthernetMac(mac).query_pair(),
            ("ethernet__mac", "aa:bb:cc:dd:ee:ff".to_string())
        );
        assert_eq!(
            IpAddressQuery::Address("10.0.0.1".to_string()).query_pair(),
            ("address", "10.0.0.1".to_string())
        );
    }
}
