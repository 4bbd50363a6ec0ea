//! In-memory inventory store for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use invsync_client::{
    BaseObjectRecord, ClientError, EthernetRef, InventoryStore, IpAddressQuery, IpAddressRecord,
};
use invsync_inventory::{BaseObject, ComponentKind, DiffAction, MacAddress};
use serde_json::{Value, json};

/// A write request received by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub action: DiffAction,
    pub kind: ComponentKind,
    pub id: Option<u64>,
    pub payload: Value,
}

#[derive(Default)]
pub struct MockStore {
    pub components: HashMap<ComponentKind, Vec<Value>>,
    pub assets: HashMap<u64, Value>,
    pub base_objects: HashMap<String, Vec<u64>>,
    pub ip_addresses: Vec<IpAddressRecord>,
    /// Status returned for writes of this kind
    pub reject: Option<(ComponentKind, u16)>,
    /// IP address lookups answer with a server error
    pub fail_ip_lookups: bool,
    pub calls: Mutex<Vec<Call>>,
    pub requests: Mutex<usize>,
}

impl MockStore {
    /// Host 1 at 10.0.0.1 with an empty asset record
    pub fn with_host() -> Self {
        let mut store = Self::default();
        store
            .base_objects
            .insert("10.0.0.1".to_string(), vec![1]);
        store.assets.insert(1, json!({"id": 1, "sn": "SN1"}));
        store
    }

    pub fn stored(mut self, kind: ComponentKind, records: Vec<Value>) -> Self {
        self.components.insert(kind, records);
        self
    }

    pub fn ip(mut self, address: &str, ethernet: Option<(u64, &str)>, mgmt: bool, dhcp: bool) -> Self {
        self.ip_addresses.push(IpAddressRecord {
            id: self.ip_addresses.len() as u64 + 1,
            address: address.to_string(),
            is_management: mgmt,
            dhcp_expose: dhcp,
            ethernet: ethernet.map(|(id, mac)| EthernetRef {
                id,
                mac: Some(mac.parse::<MacAddress>().unwrap()),
            }),
        });
        self
    }

    pub fn failing_ip_lookups(mut self) -> Self {
        self.fail_ip_lookups = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        *self.requests.lock().unwrap()
    }

    fn count_request(&self) {
        *self.requests.lock().unwrap() += 1;
    }
}

#[async_trait]
impl InventoryStore for MockStore {
    async fn list_components(
        &self,
        kind: ComponentKind,
        _base_object: BaseObject,
    ) -> Result<Vec<Value>, ClientError> {
        self.count_request();
        Ok(self.components.get(&kind).cloned().unwrap_or_default())
    }

    async fn fetch(&self, kind: ComponentKind, id: u64) -> Result<Value, ClientError> {
        self.count_request();
        match (kind, self.assets.get(&id)) {
            (ComponentKind::DataCenterAsset, Some(asset)) => Ok(asset.clone()),
            _ => Err(ClientError::Api {
                status: 404,
                message: "Not found.".to_string(),
            }),
        }
    }

    async fn find_base_objects(&self, ip: &str) -> Result<Vec<BaseObjectRecord>, ClientError> {
        self.count_request();
        Ok(self
            .base_objects
            .get(ip)
            .map(|ids| ids.iter().map(|&id| BaseObjectRecord { id }).collect())
            .unwrap_or_default())
    }

    async fn find_ip_addresses(
        &self,
        query: &IpAddressQuery,
    ) -> Result<Vec<IpAddressRecord>, ClientError> {
        self.count_request();
        if self.fail_ip_lookups {
            return Err(ClientError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(self
            .ip_addresses
            .iter()
            .filter(|record| match query {
                IpAddressQuery::Address(address) => &record.address == address,
                IpAddressQuery::EthernetMac(mac) => record
                    .ethernet
                    .as_ref()
                    .and_then(|eth| eth.mac)
                    .is_some_and(|m| m == *mac),
            })
            .cloned()
            .collect())
    }

    async fn apply(
        &self,
        action: DiffAction,
        kind: ComponentKind,
        id: Option<u64>,
        payload: &Value,
    ) -> Result<u16, ClientError> {
        self.count_request();
        if let Some((rejected, status)) = self.reject {
            if rejected == kind {
                return Err(ClientError::Api {
                    status,
                    message: "rejected".to_string(),
                });
            }
        }
        self.calls.lock().unwrap().push(Call {
            action,
            kind,
            id,
            payload: payload.clone(),
        });
        Ok(match action {
            DiffAction::Create => 201,
            DiffAction::Update => 200,
            DiffAction::Delete => 204,
        })
    }

    fn store_type(&self) -> &'static str {
        "mock"
    }
}
