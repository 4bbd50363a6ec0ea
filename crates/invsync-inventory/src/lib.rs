//! invsync-inventory: hardware inventory model
//!
//! Component types and their store wire format, the diff data structures,
//! and collection of observed snapshots through scan scripts.

pub mod choices;
pub mod components;
pub mod diff;
pub mod error;
pub mod scan;
pub mod snapshot;
pub mod types;
pub mod wire;

pub use components::{DataCenterAsset, Disk, Ethernet, FibreChannelCard, Memory, Processor};
pub use diff::{Diff, DiffAction, DiffEntry};
pub use error::InventoryError;
pub use scan::{ManagementCredentials, ScanRunner, ScanScript, ScanTarget};
pub use snapshot::ObservedSnapshot;
pub use types::{
    AnyComponent, BaseObject, Component, ComponentKind, HostPart, MacAddress, UniquelyKeyed,
    ValueMatched,
};
