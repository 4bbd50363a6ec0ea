//! Partial updates of the per-host data center asset record
//!
//! Firmware and BIOS versions are copied from the scan; the detected model
//! name lives in a marker line inside the free-text remarks, which are
//! otherwise left alone. The serial number is only ever checked, never
//! written.

use invsync_inventory::{DataCenterAsset, ObservedSnapshot};
use regex::Regex;
use tracing::debug;

use crate::error::CoreError;

const MARKER_PATTERN: &str = r">>> invsync: detected model name:.*<<<";

/// Model name as it goes into the single-line marker
fn normalize_model_name(model_name: &str) -> String {
    model_name.replace(['\n', '\r'], " ").trim().to_string()
}

/// Marker line recording the detected model name
#[must_use]
pub fn model_marker(model_name: &str) -> String {
    format!(
        ">>> invsync: detected model name: {} <<<",
        normalize_model_name(model_name)
    )
}

/// Which parts of the asset record a run may touch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingletonOptions {
    pub firmware_and_bios: bool,
    pub model_name: bool,
}

/// Outcome of comparing the stored asset with the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingletonPatch {
    /// Partial record to send; only `id` and dirty fields are set
    pub patch: DataCenterAsset,
    /// Whether any writable field changed
    pub dirty: bool,
    /// Stored serial number, when it differs from the observed one
    pub serial_mismatch: Option<String>,
}

impl SingletonPatch {
    /// Whether anything differs, including a serial number mismatch
    #[must_use]
    pub fn changes_detected(&self) -> bool {
        self.dirty || self.serial_mismatch.is_some()
    }
}

/// New value for a version field, or `None` to leave it out of the patch
fn version_update(stored: Option<&str>, observed: &str) -> Option<String> {
    match stored {
        None if !observed.is_empty() => Some(observed.to_string()),
        Some(stored) if stored != observed => Some(observed.to_string()),
        _ => None,
    }
}

/// Builds [`SingletonPatch`]es
#[derive(Debug, Clone)]
pub struct SingletonPatcher {
    options: SingletonOptions,
    marker: Regex,
}

impl SingletonPatcher {
    /// # Errors
    /// Returns `CoreError::Pattern` if the marker pattern does not compile.
    pub fn new(options: SingletonOptions) -> Result<Self, CoreError> {
        Ok(Self {
            options,
            marker: Regex::new(MARKER_PATTERN)?,
        })
    }

    /// Remarks with the model marker injected, replaced or removed
    ///
    /// Returns `None` when the remarks need no change.
    #[must_use]
    pub fn update_remarks(&self, remarks: &str, model_name: &str) -> Option<String> {
        let model_name = normalize_model_name(model_name);
        let marker = model_marker(&model_name);
        if !model_name.is_empty() && remarks.contains(&marker) {
            return None;
        }

        match self.marker.find(remarks) {
            Some(_) if model_name.is_empty() => {
                Some(self.marker.replace_all(remarks, "").into_owned())
            }
            Some(_) => Some(
                self.marker
                    .replace_all(remarks, regex::NoExpand(&marker))
                    .into_owned(),
            ),
            None if !model_name.is_empty() => {
                if remarks.is_empty() {
                    Some(marker)
                } else {
                    Some(format!("{remarks}\n{marker}"))
                }
            }
            None => None,
        }
    }

    /// Compare `stored` with `observed` and build the patch
    #[must_use]
    pub fn build(&self, stored: &DataCenterAsset, observed: &ObservedSnapshot) -> SingletonPatch {
        let mut patch = DataCenterAsset {
            id: stored.id,
            ..DataCenterAsset::default()
        };

        if self.options.firmware_and_bios {
            patch.firmware_version =
                version_update(stored.firmware_version.as_deref(), &observed.firmware_version);
            patch.bios_version =
                version_update(stored.bios_version.as_deref(), &observed.bios_version);
        }

        if self.options.model_name {
            let remarks = stored.remarks.as_deref().unwrap_or_default();
            patch.remarks = self.update_remarks(remarks, &observed.model_name);
        }

        let dirty = patch.firmware_version.is_some()
            || patch.bios_version.is_some()
            || patch.remarks.is_some();

        let stored_sn = stored.serial_number.as_deref().unwrap_or_default();
        let serial_mismatch = (stored_sn != observed.serial_number).then(|| {
            debug!(
                detected = %observed.serial_number,
                stored = %stored_sn,
                "detected serial number differs from the one stored in the inventory"
            );
            stored_sn.to_string()
        });

        debug!(dirty, patch = %patch, "asset patch built");
        SingletonPatch {
            patch,
            dirty,
            serial_mismatch,
        }
    }
}
