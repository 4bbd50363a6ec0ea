//! Options for a reconciliation run

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use invsync_inventory::ComponentKind;
use crate::error::CoreError;
use crate::singleton::SingletonOptions;

/// Component kinds a run reconciles
///
/// Parsed from `none`, `all` or a comma-separated list of `eth`, `mem`,
/// `fcc`, `cpu` and `disk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSelection(BTreeSet<ComponentKind>);

impl ComponentSelection {
    /// Kinds selectable on the command line, in processing order
    pub const SELECTABLE: [(&'static str, ComponentKind); 5] = [
        ("eth", ComponentKind::Ethernet),
        ("mem", ComponentKind::Memory),
        ("fcc", ComponentKind::FibreChannelCard),
        ("cpu", ComponentKind::Processor),
        ("disk", ComponentKind::Disk),
    ];

    #[must_use]
    pub fn all() -> Self {
        Self(Self::SELECTABLE.iter().map(|&(_, kind)| kind).collect())
    }

    #[must_use]
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    #[must_use]
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.0.contains(&kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected kinds in processing order
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        Self::SELECTABLE
            .iter()
            .map(|&(_, kind)| kind)
            .filter(|kind| self.0.contains(kind))
    }
}

/// Only the asset record is touched unless components are asked for
impl Default for ComponentSelection {
    fn default() -> Self {
        Self::none()
    }
}

impl FromStr for ComponentSelection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        if names.iter().any(|name| matches!(*name, "none" | "all")) {
            if names.len() > 1 {
                return Err(CoreError::InvalidSelection(
                    "invalid combination: \"none\"/\"all\" option should be used exclusively"
                        .to_string(),
                ));
            }
            return Ok(if names[0] == "all" {
                Self::all()
            } else {
                Self::none()
            });
        }

        let mut kinds = BTreeSet::new();
        for name in names {
            let kind = Self::SELECTABLE
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|&(_, kind)| kind)
                .ok_or_else(|| CoreError::InvalidSelection(format!("unknown component: {name}")))?;
            kinds.insert(kind);
        }
        Ok(Self(kinds))
    }
}

impl fmt::Display for ComponentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        if *self == Self::all() {
            return write!(f, "all");
        }
        let names: Vec<&str> = Self::SELECTABLE
            .iter()
            .filter(|(_, kind)| self.0.contains(kind))
            .map(|&(name, _)| name)
            .collect();
        write!(f, "{}", names.join(","))
    }
}

/// Everything that shapes a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub components: ComponentSelection,
    pub singleton: SingletonOptions,
    /// Compute and report, but send nothing
    pub dry_run: bool,
}
