//! One-to-one inverse reference sync.

use crate::graph::GraphOps;
use crate::model::{EntityId, PropertyId, Value};
use crate::{Error, Result};

use super::RelationshipConstraint;

/// Keeps a pair of single references mutually consistent.
///
/// Attached to a `Ref`-typed property whose target kind declares `inverse`
/// as a `Ref` back to the host's kind. On every transition the stale
/// inverse on the old target is cleared (when it still points at the host)
/// and the inverse on the new target is installed (unless it already
/// does). Those two equality pre-checks are what stops the mutual rebind
/// recursion: the far side's constraint observes an already-consistent
/// near side and stops.
#[derive(Debug)]
pub struct OneToOne {
    inverse: PropertyId,
    exclusive: bool,
}

impl OneToOne {
    pub fn new(inverse: impl Into<PropertyId>) -> Self {
        Self { inverse: inverse.into(), exclusive: false }
    }

    /// Refuse to steal: fail with `ConstraintViolation` when the new
    /// target is already bound to a different host.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }
}

impl RelationshipConstraint for OneToOne {
    fn name(&self) -> &str {
        "one_to_one"
    }

    fn rebind(
        &self,
        graph: &dyn GraphOps,
        host: EntityId,
        old: &Value,
        new: &Value,
    ) -> Result<()> {
        // Clear the stale inverse on the old target first.
        if let Value::Ref(old_id) = old {
            if graph.try_get(*old_id, &self.inverse)? == Some(Value::Ref(host)) {
                graph.set(*old_id, &self.inverse, Value::Null)?;
            }
        }

        match new {
            Value::Null => Ok(()),
            Value::Ref(new_id) => {
                match graph.try_get(*new_id, &self.inverse)? {
                    // Already points here: the recursion terminator.
                    Some(Value::Ref(h)) if h == host => Ok(()),
                    Some(Value::Ref(other)) if self.exclusive => {
                        Err(Error::ConstraintViolation(format!(
                            "entity {new_id} is already bound to {other} via '{}'",
                            self.inverse
                        )))
                    }
                    _ => graph.set(*new_id, &self.inverse, Value::Ref(host)),
                }
            }
            other => Err(Error::TypeError {
                expected: "REF".into(),
                got: other.type_name().into(),
            }),
        }
    }
}
