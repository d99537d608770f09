//! Property slots — deferred value containers with constraint rebinding.
//!
//! A slot is the lazy container for one property's value on one entity.
//! It starts *unmaterialized*: no value exists until the property is first
//! observed (which drives the value factory) or explicitly set. Once
//! materialized it never goes back; re-assignment stays materialized.
//!
//! The slot itself only records state transitions. The surrounding store
//! ([`crate::graph::EntityGraph`]) orchestrates the full protocol: it calls
//! [`PropertySlot::store`] under its table lock, releases the lock, and
//! only then runs the returned constraint list — so a constraint that
//! re-enters the store during rebind observes the already-updated slot.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::constraint::RelationshipConstraint;
use crate::model::{PropertyId, Value};
use crate::schema::PropertyType;

/// Ordered constraint list bound to one slot. Almost always 0–2 entries.
pub(crate) type ConstraintList = SmallVec<[Arc<dyn RelationshipConstraint>; 2]>;

/// Lazy, per-entity-per-property value container.
///
/// Two states: `Unmaterialized` (initial, `peek()` returns `None`) and
/// `Materialized` (terminal with respect to having a value; re-entered by
/// every subsequent store).
#[derive(Debug)]
pub struct PropertySlot {
    prop: PropertyId,
    ty: PropertyType,
    /// Current value. `Value::Null` until first stored; the `materialized`
    /// flag — not the value — distinguishes "absent" from "set to null".
    value: Value,
    materialized: bool,
    constraints: ConstraintList,
}

/// What [`PropertySlot::store`] decided.
#[derive(Debug)]
pub(crate) enum StoreOutcome {
    /// The slot already held an equal materialized value; no rebinding.
    Unchanged,
    /// The value was swapped in. `previous` is the true prior value —
    /// `Value::Null` when the slot was unmaterialized, never a value a
    /// factory would have produced.
    Swapped { previous: Value },
}

impl PropertySlot {
    pub(crate) fn new(prop: PropertyId, ty: PropertyType, constraints: ConstraintList) -> Self {
        Self {
            prop,
            ty,
            value: Value::Null,
            materialized: false,
            constraints,
        }
    }

    pub fn prop(&self) -> &PropertyId {
        &self.prop
    }

    pub fn ty(&self) -> &PropertyType {
        &self.ty
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Non-generating read: `Some` only once materialized.
    pub fn peek(&self) -> Option<&Value> {
        self.materialized.then_some(&self.value)
    }

    pub(crate) fn constraints(&self) -> &ConstraintList {
        &self.constraints
    }

    /// Record a value, reporting whether constraints must be rebound.
    ///
    /// Equal re-assignment onto a materialized slot is suppressed. An
    /// unmaterialized slot never suppresses — even storing `Null`
    /// materializes it and counts as an effective transition.
    pub(crate) fn store(&mut self, value: Value) -> StoreOutcome {
        if self.materialized && self.value == value {
            return StoreOutcome::Unchanged;
        }
        let previous = std::mem::replace(&mut self.value, value);
        self.materialized = true;
        StoreOutcome::Swapped { previous }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphOps;
    use crate::model::EntityId;
    use crate::Result;

    #[derive(Debug)]
    struct Noop;

    impl RelationshipConstraint for Noop {
        fn name(&self) -> &str { "noop" }
        fn rebind(&self, _: &dyn GraphOps, _: EntityId, _: &Value, _: &Value) -> Result<()> {
            Ok(())
        }
    }

    fn slot() -> PropertySlot {
        PropertySlot::new("age".into(), PropertyType::Int, ConstraintList::new())
    }

    #[test]
    fn test_starts_unmaterialized() {
        let s = slot();
        assert!(!s.is_materialized());
        assert_eq!(s.peek(), None);
    }

    #[test]
    fn test_first_store_reports_null_previous() {
        let mut s = slot();
        match s.store(Value::Int(1)) {
            StoreOutcome::Swapped { previous } => assert_eq!(previous, Value::Null),
            StoreOutcome::Unchanged => panic!("first store must swap"),
        }
        assert!(s.is_materialized());
        assert_eq!(s.peek(), Some(&Value::Int(1)));
    }

    #[test]
    fn test_equal_restore_is_suppressed() {
        let mut s = slot();
        s.store(Value::Int(1));
        assert!(matches!(s.store(Value::Int(1)), StoreOutcome::Unchanged));
        // A different value swaps again and reports the true previous.
        match s.store(Value::Int(2)) {
            StoreOutcome::Swapped { previous } => assert_eq!(previous, Value::Int(1)),
            StoreOutcome::Unchanged => panic!("distinct value must swap"),
        }
    }

    #[test]
    fn test_storing_null_on_virgin_slot_materializes() {
        let mut s = slot();
        assert!(matches!(
            s.store(Value::Null),
            StoreOutcome::Swapped { previous: Value::Null }
        ));
        assert!(s.is_materialized());
        assert_eq!(s.peek(), Some(&Value::Null));
        // Now the slot is materialized-to-null, so re-storing null suppresses.
        assert!(matches!(s.store(Value::Null), StoreOutcome::Unchanged));
    }

    #[test]
    fn test_constraints_are_declaration_ordered() {
        let list: ConstraintList =
            [Arc::new(Noop) as Arc<dyn RelationshipConstraint>, Arc::new(Noop)]
                .into_iter()
                .collect();
        let s = PropertySlot::new("blog".into(), PropertyType::Int, list);
        assert_eq!(s.constraints().len(), 2);
    }
}
