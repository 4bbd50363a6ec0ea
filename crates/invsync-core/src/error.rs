//! Core error types for invsync-core

use invsync_client::ClientError;
use invsync_inventory::{ComponentKind, InventoryError};
use thiserror::Error;

/// Broken internal contracts of the diff engine
///
/// None of these can be caused by store or scan data alone except
/// `DuplicateKey`; the rest indicate a bug in the caller or the matcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// A key seen in both sets vanished from the stored index
    #[error("{kind} with key {key} is present in both sets but missing from stored components")]
    MissingStoredComponent { kind: ComponentKind, key: String },

    /// A unique key occurs more than once in one input
    #[error("duplicate {kind} key {key} in {side} components")]
    DuplicateKey {
        kind: ComponentKind,
        key: String,
        side: &'static str,
    },

    /// Fewer stored instances than the counts promised
    #[error("ran out of stored {kind} instances while deleting surplus")]
    RepresentativesExhausted { kind: ComponentKind },

    /// A non-Ethernet entry reached an Ethernet-only filter
    #[error("unexpected {kind} entry in Ethernet context")]
    UnexpectedKind { kind: ComponentKind },

    /// Update or delete of a record that has no id
    #[error("cannot {action} {kind} without an id")]
    MissingIdentifier {
        action: &'static str,
        kind: ComponentKind,
    },
}

/// Errors that can occur during a reconciliation run
#[derive(Error, Debug)]
pub enum CoreError {
    /// Store request failed
    #[error("inventory store error: {0}")]
    Client(#[from] ClientError),

    /// Component modelling or scan failure
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Diff engine contract violation
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    /// Scanned address does not map to exactly one host
    #[error("IP address {address} doesn't have any base objects")]
    NoBaseObject { address: String },

    #[error("IP address {address} has more than one base objects ({count})")]
    AmbiguousBaseObject { address: String, count: usize },

    /// Invalid `--components` value
    #[error("{0}")]
    InvalidSelection(String),

    /// Remarks marker pattern failed to compile
    #[error("invalid remarks pattern: {0}")]
    Pattern(#[from] regex::Error),
}
