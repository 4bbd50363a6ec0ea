//! invsync-core: reconciliation engine
//!
//! Computes the create/update/delete operations that converge the inventory
//! store to a scan, applies the store's exceptions (management interface,
//! DHCP-exposed addresses) and sends the result through an
//! [`invsync_client::InventoryStore`].

pub mod applier;
pub mod config;
pub mod error;
pub mod filters;
pub mod identity;
pub mod multiset;
pub mod reconcile;
pub mod singleton;

pub use applier::{AppliedChange, ApplyReport, apply_diff};
pub use config::{ComponentSelection, ReconcileOptions};
pub use error::{CoreError, DiffError};
pub use filters::{DhcpExclusion, exclude_exposed_in_dhcp, exclude_management};
pub use identity::diff_by_identity;
pub use multiset::diff_by_value;
pub use reconcile::{ReconcileReport, Reconciler};
pub use singleton::{SingletonOptions, SingletonPatch, SingletonPatcher, model_marker};
