//! One-to-many back-reference sync: a collection keeps its members' references current.

use crate::graph::GraphOps;
use crate::model::{EntityId, PropertyId, Value};
use crate::{Error, Result};

use super::RelationshipConstraint;

/// Attached to a `RefList`-typed property whose member kind declares
/// `reference` as a `Ref` back to the host's kind. Members added to the
/// collection get their back-reference set to the host; members removed
/// get it cleared (when it still points at the host).
///
/// Setting a member's back-reference fires that slot's own constraints
/// (typically [`ManyToOne`](super::ManyToOne) pointing back at this
/// collection); the membership pre-checks on both sides make the mutual
/// recursion bottom out.
#[derive(Debug)]
pub struct OneToMany {
    reference: PropertyId,
}

impl OneToMany {
    pub fn new(reference: impl Into<PropertyId>) -> Self {
        Self { reference: reference.into() }
    }
}

impl RelationshipConstraint for OneToMany {
    fn name(&self) -> &str {
        "one_to_many"
    }

    fn rebind(
        &self,
        graph: &dyn GraphOps,
        host: EntityId,
        old: &Value,
        new: &Value,
    ) -> Result<()> {
        let old_items: &[Value] = match old {
            Value::List(items) => items,
            _ => &[],
        };
        let new_items: &[Value] = match new {
            Value::List(items) => items,
            Value::Null => &[],
            other => {
                return Err(Error::TypeError {
                    expected: "LIST".into(),
                    got: other.type_name().into(),
                });
            }
        };

        // Removed members lose their back-reference when it still points here.
        for item in old_items.iter().filter(|&v| !new_items.contains(v)) {
            if let Value::Ref(member) = item {
                if graph.try_get(*member, &self.reference)? == Some(Value::Ref(host)) {
                    graph.set(*member, &self.reference, Value::Null)?;
                }
            }
        }

        // Added members point back at the host.
        for item in new_items.iter().filter(|&v| !old_items.contains(v)) {
            if let Value::Ref(member) = item {
                if graph.try_get(*member, &self.reference)? != Some(Value::Ref(host)) {
                    graph.set(*member, &self.reference, Value::Ref(host))?;
                }
            }
        }

        Ok(())
    }
}
