//! Choice-code tables for speed fields
//!
//! The store models link speeds as integer "choices". The scan and the
//! human-facing side speak in labels ("10 Gbps"), so every speed crosses the
//! wire through one of these tables.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// Label used when the scan could not determine a speed
pub const UNKNOWN_SPEED: &str = "unknown speed";

/// A fixed label <-> code table
#[derive(Debug)]
pub struct ChoiceTable {
    name: &'static str,
    codes: HashMap<&'static str, u32>,
    labels: HashMap<u32, &'static str>,
}

impl ChoiceTable {
    fn new(name: &'static str, entries: &[(&'static str, u32)]) -> Self {
        Self {
            name,
            codes: entries.iter().copied().collect(),
            labels: entries.iter().map(|&(label, code)| (code, label)).collect(),
        }
    }

    /// Table name, used in error messages
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Code for a label
    #[must_use]
    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    /// Label for a code
    #[must_use]
    pub fn label(&self, code: u32) -> Option<&'static str> {
        self.labels.get(&code).copied()
    }
}

/// Ethernet link speeds
pub static ETHERNET_SPEEDS: LazyLock<ChoiceTable> = LazyLock::new(|| {
    ChoiceTable::new(
        "ethernet speed",
        &[
            ("10 Mbps", 1),
            ("100 Mbps", 2),
            ("1 Gbps", 3),
            ("10 Gbps", 4),
            ("40 Gbps", 5),
            ("100 Gbps", 6),
            (UNKNOWN_SPEED, 11),
        ],
    )
});

/// Fibre-channel link speeds
pub static FIBRE_CHANNEL_SPEEDS: LazyLock<ChoiceTable> = LazyLock::new(|| {
    ChoiceTable::new(
        "fibre channel speed",
        &[
            ("1 Gbit", 1),
            ("2 Gbit", 2),
            ("4 Gbit", 3),
            ("8 Gbit", 4),
            ("16 Gbit", 5),
            ("32 Gbit", 6),
            (UNKNOWN_SPEED, 11),
        ],
    )
});

pub(crate) fn unknown_speed() -> String {
    UNKNOWN_SPEED.to_string()
}

fn serialize_choice<S: Serializer>(
    table: &ChoiceTable,
    label: &str,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match table.code(label) {
        Some(code) => serializer.serialize_u32(code),
        None => Err(serde::ser::Error::custom(format!(
            "unknown {} choice: {label:?}",
            table.name()
        ))),
    }
}

struct ChoiceVisitor(&'static ChoiceTable);

impl Visitor<'_> for ChoiceVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {} label or its integer code", self.0.name())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        u32::try_from(v)
            .ok()
            .and_then(|code| self.0.label(code))
            .map(str::to_string)
            .ok_or_else(|| E::custom(format!("unknown {} code: {v}", self.0.name())))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::custom(format!("unknown {} code: {v}", self.0.name()))),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(unknown_speed())
    }
}

/// serde adapter for `Ethernet::speed`
pub mod ethernet_speed {
    use super::*;

    pub fn serialize<S: Serializer>(label: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_choice(&ETHERNET_SPEEDS, label, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(ChoiceVisitor(&ETHERNET_SPEEDS))
    }
}

/// serde adapter for `FibreChannelCard::speed`
pub mod fibre_channel_speed {
    use super::*;

    pub fn serialize<S: Serializer>(label: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_choice(&FIBRE_CHANNEL_SPEEDS, label, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(ChoiceVisitor(&FIBRE_CHANNEL_SPEEDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookups() {
        assert_eq!(ETHERNET_SPEEDS.code("10 Gbps"), Some(4));
        assert_eq!(ETHERNET_SPEEDS.code("1 Gbps"), Some(3));
        assert_eq!(ETHERNET_SPEEDS.code(UNKNOWN_SPEED), Some(11));
        assert_eq!(ETHERNET_SPEEDS.code("2.5 Gbps"), None);
        assert_eq!(ETHERNET_SPEEDS.label(4), Some("10 Gbps"));

        assert_eq!(FIBRE_CHANNEL_SPEEDS.code("4 Gbit"), Some(3));
        assert_eq!(FIBRE_CHANNEL_SPEEDS.code("1 Gbit"), Some(1));
        assert_eq!(FIBRE_CHANNEL_SPEEDS.label(11), Some(UNKNOWN_SPEED));
    }
}
