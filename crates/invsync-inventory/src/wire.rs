//! Lenient decoding helpers for store responses
//!
//! The store nests related objects and uses `null` freely; the scan emits
//! flat values. These adapters accept both shapes so one set of types serves
//! both sides.

use serde::{Deserialize, Deserializer, Serializer};

/// Decode `null` as the type's default value
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// serde adapter for disk slots: `0` and `null` both mean "unset", and unset
/// goes out as `null`.
pub mod slot {
    use super::*;

    pub fn serialize<S: Serializer>(slot: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match slot {
            Some(slot) => serializer.serialize_u32(*slot),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        Ok(Option::<u32>::deserialize(deserializer)?.filter(|slot| *slot != 0))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::null_as_default")]
        name: String,
        #[serde(default, with = "super::slot")]
        slot: Option<u32>,
    }

    #[test]
    fn test_null_fields() {
        let row: Row = serde_json::from_str(r#"{"name": null, "slot": null}"#).unwrap();
        assert_eq!(row.name, "");
        assert_eq!(row.slot, None);
    }

    #[test]
    fn test_zero_slot_is_unset() {
        let row: Row = serde_json::from_str(r#"{"name": "a", "slot": 0}"#).unwrap();
        assert_eq!(row.slot, None);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"name":"a","slot":null}"#);
    }

    #[test]
    fn test_missing_slot() {
        let row: Row = serde_json::from_str(r#"{"name": "a"}"#).unwrap();
        assert_eq!(row.slot, None);
    }
}
