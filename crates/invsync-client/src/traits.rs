//! Store abstraction

use async_trait::async_trait;
use invsync_inventory::{BaseObject, ComponentKind, DiffAction, HostPart};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::records::{BaseObjectRecord, IpAddressQuery, IpAddressRecord};

/// Trait for inventory store backends
///
/// Records cross this seam as raw JSON; typed access goes through the free
/// functions in this module so the trait stays object-safe.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All components of `kind` attached to `base_object`
    async fn list_components(
        &self,
        kind: ComponentKind,
        base_object: BaseObject,
    ) -> Result<Vec<Value>>;

    /// A single record by id
    async fn fetch(&self, kind: ComponentKind, id: u64) -> Result<Value>;

    /// Hosts owning `ip`
    async fn find_base_objects(&self, ip: &str) -> Result<Vec<BaseObjectRecord>>;

    /// IP address records matching `query`
    async fn find_ip_addresses(&self, query: &IpAddressQuery) -> Result<Vec<IpAddressRecord>>;

    /// Create, update or delete one record; returns the HTTP status
    ///
    /// `id` is required for update and delete. Delete sends no body.
    async fn apply(
        &self,
        action: DiffAction,
        kind: ComponentKind,
        id: Option<u64>,
        payload: &Value,
    ) -> Result<u16>;

    /// Get the store type name (for logging)
    fn store_type(&self) -> &'static str;
}

/// Typed [`InventoryStore::list_components`]
///
/// # Errors
/// Returns the store's error, or `ClientError::Json` if a record does not
/// decode as `T`.
pub async fn list_stored<T: HostPart>(
    store: &dyn InventoryStore,
    base_object: BaseObject,
) -> Result<Vec<T>> {
    let records = store.list_components(T::KIND, base_object).await?;
    decode_all(records)
}

/// Typed [`InventoryStore::fetch`]
///
/// # Errors
/// Returns the store's error, or `ClientError::Json` if the record does not
/// decode as `T`.
pub async fn fetch_one<T: DeserializeOwned>(
    store: &dyn InventoryStore,
    kind: ComponentKind,
    id: u64,
) -> Result<T> {
    let record = store.fetch(kind, id).await?;
    Ok(serde_json::from_value(record)?)
}

fn decode_all<T: DeserializeOwned>(records: Vec<Value>) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(Into::into))
        .collect()
}
