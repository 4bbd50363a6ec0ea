//! Core inventory types: host references, MAC addresses, component kinds and
//! the traits the diff engine is generic over.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::components::{DataCenterAsset, Disk, Ethernet, FibreChannelCard, Memory, Processor};
use crate::error::InventoryError;

// ============================================================================
// Host reference
// ============================================================================

/// Reference to the store object (host) that owns a component.
///
/// Always serialized as a bare numeric id. Store responses may nest the
/// object instead, so both `1` and `{"id": 1, ...}` are accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BaseObject(pub u64);

impl BaseObject {
    /// Numeric id of the host
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BaseObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for BaseObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for BaseObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Id(u64),
            Nested { id: u64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Id(id) | Repr::Nested { id } => Ok(BaseObject(id)),
        }
    }
}

// ============================================================================
// MAC address
// ============================================================================

/// 48-bit hardware address, rendered as lower-case `aa:bb:cc:dd:ee:ff`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Build from raw octets
    #[must_use]
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl FromStr for MacAddress {
    type Err = InventoryError;

    /// Accepts `:` or `-` separated octets, or twelve bare hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InventoryError::InvalidMac(s.to_string());
        let trimmed = s.trim();

        let parts: Vec<&str> = if trimmed.contains(':') {
            trimmed.split(':').collect()
        } else if trimmed.contains('-') {
            trimmed.split('-').collect()
        } else if trimmed.len() == 12 && trimmed.is_ascii() {
            (0..6).map(|i| &trimmed[i * 2..i * 2 + 2]).collect()
        } else {
            return Err(invalid());
        };

        if parts.len() != 6 {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(parts) {
            if part.len() != 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Component kinds
// ============================================================================

/// Closed set of component kinds known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Ethernet,
    Memory,
    Processor,
    Disk,
    FibreChannelCard,
    DataCenterAsset,
}

impl ComponentKind {
    /// Collection endpoint of this kind, relative to the API root
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            ComponentKind::Ethernet => "ethernets",
            ComponentKind::Memory => "memory",
            ComponentKind::Processor => "processors",
            ComponentKind::Disk => "disks",
            ComponentKind::FibreChannelCard => "fibre-channel-cards",
            ComponentKind::DataCenterAsset => "data-center-assets",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Ethernet => write!(f, "Ethernet"),
            ComponentKind::Memory => write!(f, "Memory"),
            ComponentKind::Processor => write!(f, "Processor"),
            ComponentKind::Disk => write!(f, "Disk"),
            ComponentKind::FibreChannelCard => write!(f, "FibreChannelCard"),
            ComponentKind::DataCenterAsset => write!(f, "DataCenterAsset"),
        }
    }
}

// ============================================================================
// Component traits
// ============================================================================

/// Behaviour shared by every record the diff engine handles
pub trait Component: Clone + fmt::Debug + fmt::Display + Serialize + Send + Sync + 'static {
    /// Kind tag of this type
    const KIND: ComponentKind;

    /// Every field except the store-assigned id
    type Fields: Clone + fmt::Debug + Eq + Ord + Hash;

    /// Store-assigned id, `None` until the record exists in the store
    fn id(&self) -> Option<u64>;

    fn set_id(&mut self, id: Option<u64>);

    fn fields(&self) -> Self::Fields;

    /// Value equality ignoring the store-assigned id
    fn is_equal_to(&self, other: &Self) -> bool {
        self.fields() == other.fields()
    }

    fn into_any(self) -> AnyComponent;

    /// Store wire representation
    ///
    /// # Errors
    /// Returns `InventoryError::Serialization` if a field has no wire form
    /// (e.g. an unmapped speed label).
    fn to_payload(&self) -> Result<serde_json::Value, InventoryError> {
        serde_json::to_value(self).map_err(|e| InventoryError::Serialization {
            kind: Self::KIND,
            message: e.to_string(),
        })
    }
}

/// A hardware component attached to a host
pub trait HostPart: Component + DeserializeOwned {
    fn base_object(&self) -> BaseObject;

    /// Attach to a host (observed components arrive without one)
    fn attach_to(&mut self, base_object: BaseObject);
}

/// Kinds with a natural unique key, matched by identity
pub trait UniquelyKeyed: HostPart {
    type Key: Clone + fmt::Debug + fmt::Display + Eq + Ord;

    fn unique_key(&self) -> Self::Key;
}

/// Kinds with no unique key, matched as multisets of their field values
pub trait ValueMatched: HostPart {}

// ============================================================================
// Closed sum over all kinds
// ============================================================================

/// Any component, for code that handles every kind uniformly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyComponent {
    Ethernet(Ethernet),
    Memory(Memory),
    Processor(Processor),
    Disk(Disk),
    FibreChannelCard(FibreChannelCard),
    DataCenterAsset(DataCenterAsset),
}

impl AnyComponent {
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            AnyComponent::Ethernet(_) => ComponentKind::Ethernet,
            AnyComponent::Memory(_) => ComponentKind::Memory,
            AnyComponent::Processor(_) => ComponentKind::Processor,
            AnyComponent::Disk(_) => ComponentKind::Disk,
            AnyComponent::FibreChannelCard(_) => ComponentKind::FibreChannelCard,
            AnyComponent::DataCenterAsset(_) => ComponentKind::DataCenterAsset,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<u64> {
        match self {
            AnyComponent::Ethernet(c) => c.id(),
            AnyComponent::Memory(c) => c.id(),
            AnyComponent::Processor(c) => c.id(),
            AnyComponent::Disk(c) => c.id(),
            AnyComponent::FibreChannelCard(c) => c.id(),
            AnyComponent::DataCenterAsset(c) => c.id(),
        }
    }

    /// Value equality ignoring ids; components of different kinds are never
    /// equal.
    #[must_use]
    pub fn is_equal_to(&self, other: &AnyComponent) -> bool {
        match (self, other) {
            (AnyComponent::Ethernet(a), AnyComponent::Ethernet(b)) => a.is_equal_to(b),
            (AnyComponent::Memory(a), AnyComponent::Memory(b)) => a.is_equal_to(b),
            (AnyComponent::Processor(a), AnyComponent::Processor(b)) => a.is_equal_to(b),
            (AnyComponent::Disk(a), AnyComponent::Disk(b)) => a.is_equal_to(b),
            (AnyComponent::FibreChannelCard(a), AnyComponent::FibreChannelCard(b)) => {
                a.is_equal_to(b)
            }
            (AnyComponent::DataCenterAsset(a), AnyComponent::DataCenterAsset(b)) => {
                a.is_equal_to(b)
            }
            _ => false,
        }
    }

    /// Store wire representation of the wrapped component
    ///
    /// # Errors
    /// See [`Component::to_payload`].
    pub fn to_payload(&self) -> Result<serde_json::Value, InventoryError> {
        match self {
            AnyComponent::Ethernet(c) => c.to_payload(),
            AnyComponent::Memory(c) => c.to_payload(),
            AnyComponent::Processor(c) => c.to_payload(),
            AnyComponent::Disk(c) => c.to_payload(),
            AnyComponent::FibreChannelCard(c) => c.to_payload(),
            AnyComponent::DataCenterAsset(c) => c.to_payload(),
        }
    }

    /// The wrapped Ethernet, if that is what this is
    #[must_use]
    pub fn as_ethernet(&self) -> Option<&Ethernet> {
        match self {
            AnyComponent::Ethernet(eth) => Some(eth),
            _ => None,
        }
    }
}

impl fmt::Display for AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyComponent::Ethernet(c) => c.fmt(f),
            AnyComponent::Memory(c) => c.fmt(f),
            AnyComponent::Processor(c) => c.fmt(f),
            AnyComponent::Disk(c) => c.fmt(f),
            AnyComponent::FibreChannelCard(c) => c.fmt(f),
            AnyComponent::DataCenterAsset(c) => c.fmt(f),
        }
    }
}
