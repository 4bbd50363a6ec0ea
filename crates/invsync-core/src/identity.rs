//! Diffing of components with a natural unique key

use std::collections::{BTreeMap, BTreeSet};

use invsync_inventory::{Diff, DiffEntry, UniquelyKeyed};
use tracing::debug;

use crate::error::{CoreError, DiffError};

fn index<'a, T: UniquelyKeyed>(
    components: &'a [T],
    side: &'static str,
) -> Result<BTreeMap<T::Key, &'a T>, DiffError> {
    let mut index = BTreeMap::new();
    for component in components {
        let key = component.unique_key();
        if index.insert(key.clone(), component).is_some() {
            return Err(DiffError::DuplicateKey {
                kind: T::KIND,
                key: key.to_string(),
                side,
            });
        }
    }
    Ok(index)
}

/// Diff `stored` against `observed`, pairing components by unique key
///
/// Keys only observed are created, keys only stored are deleted. A key in
/// both takes the stored id and is updated unless the two are equal. Entries
/// come out in key order.
///
/// # Errors
/// Returns `DiffError::DuplicateKey` if a key repeats within one input and
/// `InventoryError::Serialization` if an entry has no wire form.
pub fn diff_by_identity<T: UniquelyKeyed>(stored: &[T], observed: &[T]) -> Result<Diff, CoreError> {
    let stored_index = index(stored, "stored")?;
    let observed_index = index(observed, "observed")?;

    let keys: BTreeSet<&T::Key> = stored_index.keys().chain(observed_index.keys()).collect();

    let mut diff = Diff::new();
    for key in keys {
        match (stored_index.get(key), observed_index.get(key)) {
            (None, Some(new)) => diff.create.push(DiffEntry::from_component(*new)?),
            (Some(old), None) => diff.delete.push(DiffEntry::from_component(*old)?),
            (Some(old), Some(new)) => {
                let mut new = (*new).clone();
                new.set_id(old.id());
                if !new.is_equal_to(old) {
                    diff.update.push(DiffEntry::from_component(&new)?);
                }
            }
            (None, None) => {
                return Err(DiffError::MissingStoredComponent {
                    kind: T::KIND,
                    key: key.to_string(),
                }
                .into());
            }
        }
    }

    debug!(
        kind = %T::KIND,
        create = diff.create.len(),
        update = diff.update.len(),
        delete = diff.delete.len(),
        "identity diff computed"
    );
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use invsync_inventory::{BaseObject, Ethernet, MacAddress};
    use proptest::prelude::*;

    use super::*;

    fn eth(id: Option<u64>, mac: &str, firmware: &str) -> Ethernet {
        Ethernet {
            id,
            base_object: BaseObject(1),
            mac: mac.parse().unwrap(),
            model_name: String::new(),
            speed: "10 Gbps".to_string(),
            firmware_version: firmware.to_string(),
        }
    }

    #[test]
    fn test_firmware_change_is_update_with_stored_id() {
        let stored = vec![eth(Some(1), "aa:bb:cc:dd:ee:ff", "1.1.1")];
        let observed = vec![eth(None, "aa:bb:cc:dd:ee:ff", "2.2.2")];

        let diff = diff_by_identity(&stored, &observed).unwrap();
        assert!(diff.create.is_empty());
        assert!(diff.delete.is_empty());
        assert_eq!(diff.update.len(), 1);
        assert_eq!(diff.update[0].id, Some(1));
        assert_eq!(diff.update[0].payload["firmware_version"], "2.2.2");
        assert_eq!(diff.update[0].payload["id"], 1);
    }

    #[test]
    fn test_create_and_delete() {
        let stored = vec![
            eth(Some(1), "aa:bb:cc:dd:ee:ff", ""),
            eth(Some(2), "aa:aa:aa:aa:aa:aa", ""),
        ];
        let observed = vec![
            eth(None, "aa:bb:cc:dd:ee:ff", ""),
            eth(None, "bb:bb:bb:bb:bb:bb", ""),
        ];

        let diff = diff_by_identity(&stored, &observed).unwrap();
        assert_eq!(diff.create.len(), 1);
        assert_eq!(diff.create[0].id, None);
        assert_eq!(diff.create[0].payload["mac"], "bb:bb:bb:bb:bb:bb");
        assert_eq!(diff.delete.len(), 1);
        assert_eq!(diff.delete[0].id, Some(2));
        assert!(diff.update.is_empty());
    }

    #[test]
    fn test_all_stored_deleted_when_nothing_observed() {
        let stored = vec![eth(Some(1), "aa:bb:cc:dd:ee:ff", "")];
        let diff = diff_by_identity(&stored, &[]).unwrap();
        assert_eq!(diff.delete.len(), 1);
        assert!(diff.create.is_empty());
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let observed = vec![
            eth(None, "aa:bb:cc:dd:ee:ff", "1"),
            eth(None, "AA:BB:CC:DD:EE:FF", "2"),
        ];
        let err = diff_by_identity(&[], &observed).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Diff(DiffError::DuplicateKey { side: "observed", .. })
        ));
    }

    #[test]
    fn test_unmapped_speed_surfaces() {
        let mut new = eth(None, "aa:bb:cc:dd:ee:ff", "");
        new.speed = "25 Gbps".to_string();
        let err = diff_by_identity(&[], &[new]).unwrap_err();
        assert!(matches!(err, CoreError::Inventory(_)));
    }

    fn arb_ethernets() -> impl Strategy<Value = Vec<Ethernet>> {
        prop::collection::btree_map(
            any::<[u8; 6]>(),
            (prop::option::of(1u64..1000), "[a-z0-9.]{0,6}"),
            0..12,
        )
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(octets, (id, firmware))| Ethernet {
                    id,
                    base_object: BaseObject(1),
                    mac: MacAddress::new(octets),
                    model_name: String::new(),
                    speed: "1 Gbps".to_string(),
                    firmware_version: firmware,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_identical_inputs_give_empty_diff(observed in arb_ethernets()) {
            let diff = diff_by_identity(&observed, &observed).unwrap();
            prop_assert!(diff.is_empty());
        }

        #[test]
        fn prop_every_key_lands_in_at_most_one_set(
            stored in arb_ethernets(),
            observed in arb_ethernets(),
        ) {
            let diff = diff_by_identity(&stored, &observed).unwrap();

            let mut seen = BTreeSet::new();
            for (_, entry) in diff.entries() {
                let mac = entry.component.as_ethernet().map(|e| e.mac);
                prop_assert!(seen.insert(mac), "key appears twice: {:?}", mac);
            }

            let stored_keys: BTreeSet<_> = stored.iter().map(|e| e.mac).collect();
            let observed_keys: BTreeSet<_> = observed.iter().map(|e| e.mac).collect();
            prop_assert_eq!(
                diff.create.len(),
                observed_keys.difference(&stored_keys).count()
            );
            prop_assert_eq!(
                diff.delete.len(),
                stored_keys.difference(&observed_keys).count()
            );
        }
    }
}
