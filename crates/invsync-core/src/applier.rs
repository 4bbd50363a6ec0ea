//! Applying a diff to the store

use std::fmt;

use invsync_client::InventoryStore;
use invsync_inventory::{ComponentKind, Diff, DiffAction, DiffEntry};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{CoreError, DiffError};

/// One applied (or, in dry-run mode, skipped) entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    pub action: DiffAction,
    pub kind: ComponentKind,
    pub id: Option<u64>,
    /// Rendering of the component
    pub description: String,
    /// HTTP status; `None` in dry-run mode
    pub status: Option<u16>,
}

impl fmt::Display for AppliedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} successfully.", self.description, self.action.past_tense())
    }
}

/// Every entry processed by [`apply_diff`], in application order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub dry_run: bool,
    pub changes: Vec<AppliedChange>,
}

impl ApplyReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes with the given action
    #[must_use]
    pub fn count(&self, action: DiffAction) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }

    pub fn extend(&mut self, other: ApplyReport) {
        self.changes.extend(other.changes);
    }
}

fn check_id(action: DiffAction, entry: &DiffEntry) -> Result<(), DiffError> {
    if action != DiffAction::Create && entry.id.is_none() {
        return Err(DiffError::MissingIdentifier {
            action: match action {
                DiffAction::Update => "update",
                _ => "delete",
            },
            kind: entry.kind,
        });
    }
    Ok(())
}

/// Apply `diff`: creates, then updates, then deletes
///
/// In dry-run mode no request is made but every entry is still validated and
/// reported. The first failure aborts the run; earlier changes stay applied.
///
/// # Errors
/// Returns `DiffError::MissingIdentifier` for an update or delete without an
/// id, and the store error if a request fails.
#[instrument(skip(store, diff), fields(entries = diff.len()))]
pub async fn apply_diff(
    store: &dyn InventoryStore,
    diff: &Diff,
    dry_run: bool,
) -> Result<ApplyReport, CoreError> {
    let mut report = ApplyReport {
        dry_run,
        changes: Vec::with_capacity(diff.len()),
    };

    for (action, entry) in diff.entries() {
        check_id(action, entry)?;

        let status = if dry_run {
            None
        } else {
            Some(
                store
                    .apply(action, entry.kind, entry.id, &entry.payload)
                    .await?,
            )
        };

        let change = AppliedChange {
            action,
            kind: entry.kind,
            id: entry.id,
            description: entry.to_string(),
            status,
        };
        info!(kind = %entry.kind, id = ?entry.id, %action, dry_run, "{change}");
        report.changes.push(change);
    }

    Ok(report)
}
