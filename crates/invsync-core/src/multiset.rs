//! Diffing of components without a unique key
//!
//! Indistinguishable components (two identical DIMMs, say) are compared as
//! multisets of their field values. A field change therefore shows up as a
//! delete of the old value plus a create of the new one, never as an update.

use std::collections::HashMap;

use invsync_inventory::{Diff, DiffEntry, ValueMatched};
use tracing::debug;

use crate::error::{CoreError, DiffError};

/// Instances grouped by value, keys in first-seen order
struct Groups<'a, T: ValueMatched> {
    order: Vec<T::Fields>,
    members: HashMap<T::Fields, Vec<&'a T>>,
}

impl<'a, T: ValueMatched> Groups<'a, T> {
    fn new(components: &'a [T]) -> Self {
        let mut order = Vec::new();
        let mut members: HashMap<T::Fields, Vec<&'a T>> = HashMap::new();
        for component in components {
            let key = component.fields();
            members
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(component);
        }
        Self { order, members }
    }

    fn count(&self, key: &T::Fields) -> usize {
        self.members.get(key).map_or(0, Vec::len)
    }
}

/// Push delete entries for `count` of `candidates`, lowest ids first
fn delete_lowest<T: ValueMatched>(
    diff: &mut Diff,
    candidates: &[&T],
    count: usize,
) -> Result<(), CoreError> {
    if candidates.len() < count {
        return Err(DiffError::RepresentativesExhausted { kind: T::KIND }.into());
    }
    let mut sorted = candidates.to_vec();
    sorted.sort_by_key(|c| c.id().unwrap_or(u64::MAX));
    for component in sorted.into_iter().take(count) {
        diff.delete.push(DiffEntry::from_component(component)?);
    }
    Ok(())
}

/// Diff `stored` against `observed` by value multiplicity
///
/// For each distinct value the surplus of observed over stored instances is
/// created, and a deficit deletes stored instances, lowest ids first. An
/// empty observation deletes everything stored.
///
/// # Errors
/// Returns `InventoryError::Serialization` if an entry has no wire form.
pub fn diff_by_value<T: ValueMatched>(stored: &[T], observed: &[T]) -> Result<Diff, CoreError> {
    let mut diff = Diff::new();

    if observed.is_empty() {
        for component in stored {
            diff.delete.push(DiffEntry::from_component(component)?);
        }
        return Ok(diff);
    }

    let old = Groups::new(stored);
    let new = Groups::new(observed);

    for key in &new.order {
        let count_new = new.count(key);
        let count_old = old.count(key);

        if count_new > count_old {
            let representatives = new.members.get(key).map_or(&[][..], Vec::as_slice);
            for component in representatives.iter().take(count_new - count_old) {
                diff.create.push(DiffEntry::from_component(*component)?);
            }
        } else if count_old > count_new {
            let candidates = old.members.get(key).map_or(&[][..], Vec::as_slice);
            delete_lowest(&mut diff, candidates, count_old - count_new)?;
        }
    }

    for key in &old.order {
        if new.count(key) == 0 {
            let candidates = old.members.get(key).map_or(&[][..], Vec::as_slice);
            delete_lowest(&mut diff, candidates, candidates.len())?;
        }
    }

    debug!(
        kind = %T::KIND,
        create = diff.create.len(),
        delete = diff.delete.len(),
        "multiset diff computed"
    );
    Ok(diff)
}
