//! Diff between stored and observed inventory

use std::fmt;

use serde::Serialize;

use crate::error::InventoryError;
use crate::types::{AnyComponent, Component, ComponentKind};

/// What applying an entry does to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAction {
    Create,
    Update,
    Delete,
}

impl DiffAction {
    /// Past tense, as used in operator notices
    #[must_use]
    pub fn past_tense(self) -> &'static str {
        match self {
            DiffAction::Create => "created",
            DiffAction::Update => "updated",
            DiffAction::Delete => "deleted",
        }
    }
}

impl fmt::Display for DiffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffAction::Create => write!(f, "create"),
            DiffAction::Update => write!(f, "update"),
            DiffAction::Delete => write!(f, "delete"),
        }
    }
}

/// One pending store operation
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    /// Store id; `None` for creates
    pub id: Option<u64>,
    pub kind: ComponentKind,
    /// Wire form sent as the request body
    pub payload: serde_json::Value,
    /// Component the entry was built from
    pub component: AnyComponent,
}

impl DiffEntry {
    /// Build an entry, serializing the component up front so wire errors
    /// surface before anything is sent.
    ///
    /// # Errors
    /// Returns `InventoryError::Serialization` if the component has no wire
    /// form.
    pub fn from_component<C: Component>(component: &C) -> Result<Self, InventoryError> {
        Ok(Self {
            id: component.id(),
            kind: C::KIND,
            payload: component.to_payload()?,
            component: component.clone().into_any(),
        })
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.component.fmt(f)
    }
}

/// Create/Update/Delete sets converging the store to the observation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    pub create: Vec<DiffEntry>,
    pub update: Vec<DiffEntry>,
    pub delete: Vec<DiffEntry>,
}

impl Diff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    /// Total number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    /// Entries paired with their action, in application order
    pub fn entries(&self) -> impl Iterator<Item = (DiffAction, &DiffEntry)> {
        self.create
            .iter()
            .map(|e| (DiffAction::Create, e))
            .chain(self.update.iter().map(|e| (DiffAction::Update, e)))
            .chain(self.delete.iter().map(|e| (DiffAction::Delete, e)))
    }

    /// Append all entries of `other`, keeping their order
    pub fn extend(&mut self, other: Diff) {
        self.create.extend(other.create);
        self.update.extend(other.update);
        self.delete.extend(other.delete);
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Diff{{")?;
        for (label, entries) in [
            ("Create", &self.create),
            ("Update", &self.update),
            ("Delete", &self.delete),
        ] {
            writeln!(f, "  {label}: [")?;
            for entry in entries {
                writeln!(f, "    {entry}")?;
            }
            writeln!(f, "  ]")?;
        }
        write!(f, "}}")
    }
}
