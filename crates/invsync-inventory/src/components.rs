//! Hardware component records
//!
//! Field order in each struct is the wire order. Observed components come
//! from the scan without `id` or `base_object`; stored ones come from the
//! store with both.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::choices::{self, unknown_speed};
use crate::types::{
    AnyComponent, BaseObject, Component, ComponentKind, HostPart, MacAddress, UniquelyKeyed,
    ValueMatched,
};
use crate::wire::{self, null_as_default};

fn fmt_id(id: Option<u64>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

// ============================================================================
// Ethernet
// ============================================================================

/// Network interface, unique per MAC address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ethernet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub base_object: BaseObject,
    pub mac: MacAddress,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    #[serde(default = "unknown_speed", with = "choices::ethernet_speed")]
    pub speed: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub firmware_version: String,
}

impl fmt::Display for Ethernet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ethernet{{id: {}, base_object_id: {}, mac: {}, model_name: {}, speed: {}, firmware_version: {}}}",
            fmt_id(self.id),
            self.base_object,
            self.mac,
            self.model_name,
            self.speed,
            self.firmware_version
        )
    }
}

impl Component for Ethernet {
    const KIND: ComponentKind = ComponentKind::Ethernet;
    type Fields = (BaseObject, MacAddress, String, String, String);

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    fn fields(&self) -> Self::Fields {
        (
            self.base_object,
            self.mac,
            self.model_name.clone(),
            self.speed.clone(),
            self.firmware_version.clone(),
        )
    }

    fn into_any(self) -> AnyComponent {
        AnyComponent::Ethernet(self)
    }
}

impl HostPart for Ethernet {
    fn base_object(&self) -> BaseObject {
        self.base_object
    }

    fn attach_to(&mut self, base_object: BaseObject) {
        self.base_object = base_object;
    }
}

impl UniquelyKeyed for Ethernet {
    type Key = MacAddress;

    fn unique_key(&self) -> MacAddress {
        self.mac
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Memory module; identical modules are indistinguishable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub base_object: BaseObject,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    /// Size in MiB
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    /// Speed in MHz
    #[serde(default, deserialize_with = "null_as_default")]
    pub speed: u32,
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Memory{{id: {}, base_object_id: {}, model_name: {}, size: {}, speed: {}}}",
            fmt_id(self.id),
            self.base_object,
            self.model_name,
            self.size,
            self.speed
        )
    }
}

impl Component for Memory {
    const KIND: ComponentKind = ComponentKind::Memory;
    type Fields = (BaseObject, String, u64, u32);

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    fn fields(&self) -> Self::Fields {
        (self.base_object, self.model_name.clone(), self.size, self.speed)
    }

    fn into_any(self) -> AnyComponent {
        AnyComponent::Memory(self)
    }
}

impl HostPart for Memory {
    fn base_object(&self) -> BaseObject {
        self.base_object
    }

    fn attach_to(&mut self, base_object: BaseObject) {
        self.base_object = base_object;
    }
}

impl ValueMatched for Memory {}

// ============================================================================
// Processor
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub base_object: BaseObject,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    /// Speed in MHz
    #[serde(default, deserialize_with = "null_as_default")]
    pub speed: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cores: u32,
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processor{{id: {}, base_object_id: {}, model_name: {}, speed: {}, cores: {}}}",
            fmt_id(self.id),
            self.base_object,
            self.model_name,
            self.speed,
            self.cores
        )
    }
}

impl Component for Processor {
    const KIND: ComponentKind = ComponentKind::Processor;
    type Fields = (BaseObject, String, u32, u32);

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    fn fields(&self) -> Self::Fields {
        (self.base_object, self.model_name.clone(), self.speed, self.cores)
    }

    fn into_any(self) -> AnyComponent {
        AnyComponent::Processor(self)
    }
}

impl HostPart for Processor {
    fn base_object(&self) -> BaseObject {
        self.base_object
    }

    fn attach_to(&mut self, base_object: BaseObject) {
        self.base_object = base_object;
    }
}

impl ValueMatched for Processor {}

// ============================================================================
// Disk
// ============================================================================

/// Physical disk
///
/// Serial numbers are not trusted as a key: controllers behind RAID often
/// report empty or repeated values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub base_object: BaseObject,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    /// Size in GiB
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub serial_number: String,
    #[serde(default, with = "wire::slot")]
    pub slot: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub firmware_version: String,
}

impl fmt::Display for Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.map_or_else(|| "-".to_string(), |s| s.to_string());
        write!(
            f,
            "Disk{{id: {}, base_object_id: {}, model_name: {}, size: {}, serial_number: {}, slot: {}, firmware_version: {}}}",
            fmt_id(self.id),
            self.base_object,
            self.model_name,
            self.size,
            self.serial_number,
            slot,
            self.firmware_version
        )
    }
}

impl Component for Disk {
    const KIND: ComponentKind = ComponentKind::Disk;
    type Fields = (BaseObject, String, u64, String, Option<u32>, String);

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    fn fields(&self) -> Self::Fields {
        (
            self.base_object,
            self.model_name.clone(),
            self.size,
            self.serial_number.clone(),
            self.slot,
            self.firmware_version.clone(),
        )
    }

    fn into_any(self) -> AnyComponent {
        AnyComponent::Disk(self)
    }
}

impl HostPart for Disk {
    fn base_object(&self) -> BaseObject {
        self.base_object
    }

    fn attach_to(&mut self, base_object: BaseObject) {
        self.base_object = base_object;
    }
}

impl ValueMatched for Disk {}

// ============================================================================
// Fibre channel card
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibreChannelCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub base_object: BaseObject,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    #[serde(default = "unknown_speed", with = "choices::fibre_channel_speed")]
    pub speed: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wwn: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub firmware_version: String,
}

impl fmt::Display for FibreChannelCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FibreChannelCard{{id: {}, base_object_id: {}, model_name: {}, speed: {}, wwn: {}, firmware_version: {}}}",
            fmt_id(self.id),
            self.base_object,
            self.model_name,
            self.speed,
            self.wwn,
            self.firmware_version
        )
    }
}

impl Component for FibreChannelCard {
    const KIND: ComponentKind = ComponentKind::FibreChannelCard;
    type Fields = (BaseObject, String, String, String, String);

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    fn fields(&self) -> Self::Fields {
        (
            self.base_object,
            self.model_name.clone(),
            self.speed.clone(),
            self.wwn.clone(),
            self.firmware_version.clone(),
        )
    }

    fn into_any(self) -> AnyComponent {
        AnyComponent::FibreChannelCard(self)
    }
}

impl HostPart for FibreChannelCard {
    fn base_object(&self) -> BaseObject {
        self.base_object
    }

    fn attach_to(&mut self, base_object: BaseObject) {
        self.base_object = base_object;
    }
}

impl ValueMatched for FibreChannelCard {}

// ============================================================================
// Data center asset (host singleton)
// ============================================================================

/// Host-level record carrying firmware/BIOS versions, remarks and serial.
///
/// Every field is optional: `None` is left out of the payload entirely so
/// the store keeps its current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCenterAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bios_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, rename = "sn", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

impl fmt::Display for DataCenterAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "DataCenterAsset{{id: {}, firmware_version: {}, bios_version: {}, remarks: {:?}, sn: {}}}",
            fmt_id(self.id),
            show(&self.firmware_version),
            show(&self.bios_version),
            show(&self.remarks),
            show(&self.serial_number)
        )
    }
}

impl Component for DataCenterAsset {
    const KIND: ComponentKind = ComponentKind::DataCenterAsset;
    type Fields = (
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    );

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    fn fields(&self) -> Self::Fields {
        (
            self.firmware_version.clone(),
            self.bios_version.clone(),
            self.remarks.clone(),
            self.serial_number.clone(),
        )
    }

    fn into_any(self) -> AnyComponent {
        AnyComponent::DataCenterAsset(self)
    }
}
