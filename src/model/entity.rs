//! Entity — a slot-bearing object in the synthesis graph.

use serde::{Deserialize, Serialize};

use crate::slot::PropertySlot;
use super::PropertyId;

/// Opaque entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared entity type — the schema key an entity is spawned as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Kind(String);

impl Kind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for Kind {
    fn from(s: String) -> Self { Self(s) }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity in the synthesis graph.
///
/// Unlike an eager record, an entity holds no plain property map: every
/// declared property is a [`PropertySlot`] that materializes its value on
/// first observation. Slots are created when the entity is spawned and live
/// exactly as long as it — there is one slot per declared property for the
/// entity's lifetime.
#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: Kind,
    /// Declaration order from the schema; also the export order.
    slots: Vec<PropertySlot>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: Kind, slots: Vec<PropertySlot>) -> Self {
        Self { id, kind, slots }
    }

    /// The slot responsible for `prop`, if this entity declares it.
    ///
    /// Slot counts are small (a handful per kind), so resolution is a
    /// linear scan over the declaration-ordered list.
    pub fn slot(&self, prop: &PropertyId) -> Option<&PropertySlot> {
        self.slots.iter().find(|s| s.prop() == prop)
    }

    pub(crate) fn slot_mut(&mut self, prop: &PropertyId) -> Option<&mut PropertySlot> {
        self.slots.iter_mut().find(|s| s.prop() == prop)
    }

    /// All slots in declaration order.
    pub fn slots(&self) -> impl Iterator<Item = &PropertySlot> {
        self.slots.iter()
    }
}
