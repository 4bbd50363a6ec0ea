//! Per-host reconciliation run

use std::sync::Arc;

use invsync_client::{InventoryStore, fetch_one, list_stored};
use invsync_inventory::snapshot::attach_all;
use invsync_inventory::{
    BaseObject, ComponentKind, DataCenterAsset, Diff, DiffEntry, Ethernet, ObservedSnapshot,
    ScanTarget, ValueMatched,
};
use tracing::{debug, info, instrument};

use crate::applier::{ApplyReport, apply_diff};
use crate::config::ReconcileOptions;
use crate::error::CoreError;
use crate::filters::{DhcpExclusion, exclude_exposed_in_dhcp, exclude_management};
use crate::identity::diff_by_identity;
use crate::multiset::diff_by_value;
use crate::singleton::SingletonPatcher;

/// What a run found and did
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub base_object: BaseObject,
    /// Whether the store differed from the scan in anything examined
    pub changes_detected: bool,
    pub applied: ApplyReport,
    /// Ethernet deletes held back because of DHCP exposure
    pub dhcp_excluded: Vec<DhcpExclusion>,
    /// Stored serial number, when it differs from the scan
    pub serial_mismatch: Option<String>,
}

/// Converges the store's record of one host to a scan
pub struct Reconciler {
    store: Arc<dyn InventoryStore>,
    options: ReconcileOptions,
    patcher: SingletonPatcher,
}

impl Reconciler {
    /// # Errors
    /// Returns `CoreError::Pattern` if the remarks marker cannot be compiled.
    pub fn new(store: Arc<dyn InventoryStore>, options: ReconcileOptions) -> Result<Self, CoreError> {
        let patcher = SingletonPatcher::new(options.singleton)?;
        Ok(Self {
            store,
            options,
            patcher,
        })
    }

    /// Resolve the host owning `address`; exactly one must exist
    ///
    /// # Errors
    /// Returns `NoBaseObject` or `AmbiguousBaseObject` when the lookup does
    /// not yield exactly one host, and the store error if it fails.
    pub async fn resolve_base_object(&self, address: &str) -> Result<BaseObject, CoreError> {
        let records = self.store.find_base_objects(address).await?;
        match records.as_slice() {
            [record] => Ok(BaseObject(record.id)),
            [] => Err(CoreError::NoBaseObject {
                address: address.to_string(),
            }),
            _ => Err(CoreError::AmbiguousBaseObject {
                address: address.to_string(),
                count: records.len(),
            }),
        }
    }

    /// Reconcile the store with `snapshot`, taken from `target`
    ///
    /// Stops at the first error; changes already applied stay applied.
    ///
    /// # Errors
    /// Returns any store, serialization or diff error encountered.
    #[instrument(skip(self, target, snapshot), fields(host = %target, dry_run = self.options.dry_run))]
    pub async fn run(
        &self,
        target: &ScanTarget,
        snapshot: &ObservedSnapshot,
    ) -> Result<ReconcileReport, CoreError> {
        if self.options.dry_run {
            info!("running in dry-run mode, no changes will be saved");
        }

        let address = target.ip().to_string();
        let base_object = self.resolve_base_object(&address).await?;
        info!(%base_object, "resolved host");

        let mut report = ReconcileReport {
            base_object,
            ..ReconcileReport::default()
        };

        self.reconcile_asset(base_object, snapshot, &mut report)
            .await?;

        for kind in self.options.components.kinds() {
            let changed = match kind {
                ComponentKind::Ethernet => {
                    self.reconcile_ethernets(&address, base_object, &snapshot.ethernets, &mut report)
                        .await?
                }
                ComponentKind::Memory => {
                    self.reconcile_values(base_object, &snapshot.memory, &mut report)
                        .await?
                }
                ComponentKind::FibreChannelCard => {
                    self.reconcile_values(base_object, &snapshot.fibre_channel_cards, &mut report)
                        .await?
                }
                ComponentKind::Processor => {
                    self.reconcile_values(base_object, &snapshot.processors, &mut report)
                        .await?
                }
                ComponentKind::Disk => {
                    self.reconcile_values(base_object, &snapshot.disks, &mut report)
                        .await?
                }
                ComponentKind::DataCenterAsset => false,
            };
            report.changes_detected |= changed;
        }

        info!(
            changes_detected = report.changes_detected,
            applied = report.applied.changes.len(),
            "reconciliation finished"
        );
        Ok(report)
    }

    async fn reconcile_asset(
        &self,
        base_object: BaseObject,
        snapshot: &ObservedSnapshot,
        report: &mut ReconcileReport,
    ) -> Result<(), CoreError> {
        let stored: DataCenterAsset = fetch_one(
            self.store.as_ref(),
            ComponentKind::DataCenterAsset,
            base_object.id(),
        )
        .await?;

        let patch = self.patcher.build(&stored, snapshot);
        report.changes_detected |= patch.changes_detected();
        report.serial_mismatch = patch.serial_mismatch.clone();

        if patch.dirty {
            let mut diff = Diff::new();
            diff.update.push(DiffEntry::from_component(&patch.patch)?);
            let applied = apply_diff(self.store.as_ref(), &diff, self.options.dry_run).await?;
            report.applied.extend(applied);
        }
        Ok(())
    }

    /// Returns whether the raw diff was non-empty
    async fn reconcile_ethernets(
        &self,
        address: &str,
        base_object: BaseObject,
        observed: &[Ethernet],
        report: &mut ReconcileReport,
    ) -> Result<bool, CoreError> {
        let stored: Vec<Ethernet> = list_stored(self.store.as_ref(), base_object).await?;
        let stored = exclude_management(self.store.as_ref(), stored, address).await?;
        let observed = attach_all(observed, base_object);

        let mut diff = diff_by_identity(&stored, &observed)?;
        if diff.is_empty() {
            debug!(kind = %ComponentKind::Ethernet, "no changes");
            return Ok(false);
        }

        if !diff.delete.is_empty() {
            let (filtered, excluded) = exclude_exposed_in_dhcp(self.store.as_ref(), diff).await?;
            diff = filtered;
            report.dhcp_excluded.extend(excluded);
        }

        let applied = apply_diff(self.store.as_ref(), &diff, self.options.dry_run).await?;
        report.applied.extend(applied);
        Ok(true)
    }

    /// Returns whether the diff was non-empty
    async fn reconcile_values<T: ValueMatched>(
        &self,
        base_object: BaseObject,
        observed: &[T],
        report: &mut ReconcileReport,
    ) -> Result<bool, CoreError> {
        let stored: Vec<T> = list_stored(self.store.as_ref(), base_object).await?;
        let observed = attach_all(observed, base_object);

        let diff = diff_by_value(&stored, &observed)?;
        if diff.is_empty() {
            debug!(kind = %T::KIND, "no changes");
            return Ok(false);
        }

        let applied = apply_diff(self.store.as_ref(), &diff, self.options.dry_run).await?;
        report.applied.extend(applied);
        Ok(true)
    }
}
