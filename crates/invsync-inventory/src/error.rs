//! Error types for invsync-inventory

use invsync_exec::ExecError;
use thiserror::Error;

use crate::types::ComponentKind;

/// Errors that can occur while modelling or collecting inventory
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// Not a 48-bit MAC address
    #[error("invalid MAC address: {0:?}")]
    InvalidMac(String),

    /// A component has no store wire form
    #[error("cannot serialize {kind}: {message}")]
    Serialization {
        kind: ComponentKind,
        message: String,
    },

    /// Scan script could not be launched or timed out
    #[error("scan script error: {0}")]
    Exec(#[from] ExecError),

    /// Scan script exited non-zero
    #[error("scan script exited with status {status}: {stderr}")]
    ScanFailed { status: i32, stderr: String },

    /// Scan script output is not a valid snapshot
    #[error("cannot parse scan output: {0}")]
    ScanOutput(String),

    /// Scan target is neither an IP address nor a resolvable host name
    #[error("invalid scan target: {0}")]
    InvalidTarget(String),
}

impl InventoryError {
    /// Whether the error originates from the scan script rather than the data
    #[must_use]
    pub fn is_scan_failure(&self) -> bool {
        matches!(
            self,
            InventoryError::Exec(_)
                | InventoryError::ScanFailed { .. }
                | InventoryError::ScanOutput(_)
        )
    }
}
