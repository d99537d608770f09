//! Property identifiers and plain property storage.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::Value;

/// Identifies one property of an entity kind.
///
/// An explicit string key chosen at schema-definition time — carried by
/// every slot for resolution and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(String);

impl PropertyId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropertyId {
    fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for PropertyId {
    fn from(s: String) -> Self { Self(s) }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A map of property identifiers to values.
pub type PropertyMap = HashMap<PropertyId, Value>;

/// A plain host: an assignment target with ordinary fields and no slots.
///
/// Writes land directly in the map with overwrite semantics — no laziness,
/// no constraint rebinding. Used for objects that do not participate in
/// the slot system but still flow through the assignment dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub fields: PropertyMap,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: PropertyMap::new() }
    }

    pub fn with_field(mut self, prop: impl Into<PropertyId>, value: impl Into<Value>) -> Self {
        self.fields.insert(prop.into(), value.into());
        self
    }

    pub fn get(&self, prop: &PropertyId) -> Option<&Value> {
        self.fields.get(prop)
    }
}
