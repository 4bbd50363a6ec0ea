//! Observed snapshot as produced by a scan script

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::components::{Disk, Ethernet, FibreChannelCard, Memory, Processor};
use crate::error::InventoryError;
use crate::types::{BaseObject, HostPart};
use crate::wire::null_as_default;

/// Hardware state of one host as seen by the scan
///
/// Every key is optional in the script output; anything missing defaults to
/// empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservedSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub serial_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub firmware_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bios_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ethernets: Vec<Ethernet>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: Vec<Memory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processors: Vec<Processor>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disks: Vec<Disk>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fibre_channel_cards: Vec<FibreChannelCard>,
    /// When the scan finished
    #[serde(skip, default = "Utc::now")]
    pub collected_at: DateTime<Utc>,
}

impl ObservedSnapshot {
    /// Parse script stdout
    ///
    /// # Errors
    /// Returns `InventoryError::ScanOutput` if the text is not a snapshot.
    pub fn from_json(raw: &str) -> Result<Self, InventoryError> {
        serde_json::from_str(raw).map_err(|e| InventoryError::ScanOutput(e.to_string()))
    }

    /// Total number of hardware components across all kinds
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.ethernets.len()
            + self.memory.len()
            + self.processors.len()
            + self.disks.len()
            + self.fibre_channel_cards.len()
    }
}

/// Copies of `observed` attached to `base_object`
///
/// The scan knows nothing about the store, so observed components are
/// stamped with the host before they are compared against stored ones.
#[must_use]
pub fn attach_all<T: HostPart>(observed: &[T], base_object: BaseObject) -> Vec<T> {
    observed
        .iter()
        .cloned()
        .map(|mut component| {
            component.attach_to(base_object);
            component
        })
        .collect()
}
