//! Exceptions to plain diffing of network interfaces
//!
//! The interface carrying the management address is not reported by every
//! scan, so it is never considered for deletion. Interfaces whose address is
//! exposed in DHCP can only be removed through a store-side transition and
//! are dropped from the delete set with a warning.

use invsync_client::{InventoryStore, IpAddressQuery};
use invsync_inventory::{AnyComponent, Diff, Ethernet, MacAddress};
use tracing::{debug, instrument};

use crate::error::{CoreError, DiffError};

/// A delete the DHCP filter refused to pass on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpExclusion {
    pub mac: MacAddress,
    pub address: String,
}

impl DhcpExclusion {
    /// Operator-facing explanation
    #[must_use]
    pub fn warning(&self) -> String {
        format!(
            "Ethernet with MAC address {} cannot be deleted, because IP address associated \
             with it ({}) is marked as \"exposed in DHCP\" in the inventory. Please use a \
             suitable transition for that.",
            self.mac, self.address
        )
    }
}

/// Drop from `stored` the interface owning `address` if it is a management
/// address
///
/// # Errors
/// Returns the store error if the lookup fails.
#[instrument(skip(store, stored), fields(stored = stored.len()))]
pub async fn exclude_management(
    store: &dyn InventoryStore,
    stored: Vec<Ethernet>,
    address: &str,
) -> Result<Vec<Ethernet>, CoreError> {
    let records = store
        .find_ip_addresses(&IpAddressQuery::Address(address.to_string()))
        .await?;

    // Addresses are unique in the store.
    let Some(record) = records.into_iter().next() else {
        return Ok(stored);
    };
    if !record.is_management {
        return Ok(stored);
    }
    let Some(owner) = record.ethernet else {
        return Ok(stored);
    };

    debug!(ethernet_id = owner.id, "excluding management interface");
    Ok(stored
        .into_iter()
        .filter(|eth| eth.id != Some(owner.id))
        .collect())
}

/// Remove Ethernet deletes whose MAC has an address exposed in DHCP
///
/// # Errors
/// Returns the store error if a lookup fails and
/// `DiffError::UnexpectedKind` if the delete set holds a non-Ethernet entry.
#[instrument(skip(store, diff), fields(delete = diff.delete.len()))]
pub async fn exclude_exposed_in_dhcp(
    store: &dyn InventoryStore,
    mut diff: Diff,
) -> Result<(Diff, Vec<DhcpExclusion>), CoreError> {
    let mut kept = Vec::with_capacity(diff.delete.len());
    let mut excluded = Vec::new();

    for entry in diff.delete {
        let mac = match &entry.component {
            AnyComponent::Ethernet(eth) => eth.mac,
            other => {
                return Err(DiffError::UnexpectedKind { kind: other.kind() }.into());
            }
        };

        let records = store
            .find_ip_addresses(&IpAddressQuery::EthernetMac(mac))
            .await?;

        match records.into_iter().find(|record| record.dhcp_expose) {
            Some(record) => {
                let exclusion = DhcpExclusion {
                    mac,
                    address: record.address,
                };
                debug!(
                    mac = %mac,
                    address = %exclusion.address,
                    "delete held back, address exposed in DHCP"
                );
                excluded.push(exclusion);
            }
            None => kept.push(entry),
        }
    }

    diff.delete = kept;
    Ok((diff, excluded))
}
