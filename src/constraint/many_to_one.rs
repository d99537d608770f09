//! Many-to-one membership sync: a reference keeps the target's collection current.

use crate::graph::GraphOps;
use crate::model::{EntityId, PropertyId, Value};
use crate::{Error, Result};

use super::RelationshipConstraint;

/// Attached to a `Ref`-typed property whose target kind declares
/// `collection` as a `RefList` of the host's kind. The host is removed
/// from the old target's collection and appended to the new target's.
///
/// The old side is read with `try_get`: a collection nobody ever observed
/// has no membership to remove, and removal must not force generation.
/// The new side is read with `get`: membership has to exist even before
/// anyone observes the collection, so an unmaterialized collection is
/// materialized (empty, by the default factory) and then appended to.
#[derive(Debug)]
pub struct ManyToOne {
    collection: PropertyId,
}

impl ManyToOne {
    pub fn new(collection: impl Into<PropertyId>) -> Self {
        Self { collection: collection.into() }
    }
}

impl RelationshipConstraint for ManyToOne {
    fn name(&self) -> &str {
        "many_to_one"
    }

    fn rebind(
        &self,
        graph: &dyn GraphOps,
        host: EntityId,
        old: &Value,
        new: &Value,
    ) -> Result<()> {
        let me = Value::Ref(host);

        if let Value::Ref(old_id) = old {
            if let Some(Value::List(items)) = graph.try_get(*old_id, &self.collection)? {
                let pruned: Vec<Value> = items.iter().filter(|v| **v != me).cloned().collect();
                if pruned.len() != items.len() {
                    graph.set(*old_id, &self.collection, Value::List(pruned))?;
                }
            }
        }

        match new {
            Value::Null => Ok(()),
            Value::Ref(new_id) => {
                match graph.get(*new_id, &self.collection)? {
                    Value::List(mut items) => {
                        if !items.contains(&me) {
                            items.push(me);
                            graph.set(*new_id, &self.collection, Value::List(items))?;
                        }
                        Ok(())
                    }
                    other => Err(Error::TypeError {
                        expected: "LIST".into(),
                        got: other.type_name().into(),
                    }),
                }
            }
            other => Err(Error::TypeError {
                expected: "REF".into(),
                got: other.type_name().into(),
            }),
        }
    }
}
