//! # Relationship Constraints
//!
//! This is THE contract between a property slot and the relationship
//! invariants declared on it. A constraint reacts to a slot's value change
//! (`rebind`) to keep a related entity's state consistent — clearing a
//! stale inverse reference on the old value, installing a reference or
//! collection membership on the new one.
//!
//! ## Contract obligations
//!
//! - `rebind` is called exactly once per effective (non-suppressed) set,
//!   in declaration order, *after* the host's slot has transitioned: a
//!   `try_get` on the host's own slot during rebind sees the new value.
//! - `old` is the true previous value — `Value::Null` for a slot that was
//!   never materialized, never a factory default.
//! - Rebinding may recursively set or get other slots, including ones
//!   that transitively reach back to the originating host. The slot layer
//!   places **no reentrancy guard**: constraint authors must bound their
//!   own recursion, typically by checking the far side's current value
//!   before re-triggering (see the shipped constraints).
//! - Failure is fail-fast, no rollback: return
//!   [`Error::ConstraintViolation`](crate::Error::ConstraintViolation) and
//!   the enclosing set aborts. The value swap and the side effects of
//!   constraints earlier in declaration order stand.
//!
//! ## Implementations
//!
//! | Constraint | Module | Relationship shape |
//! |------------|--------|--------------------|
//! | `OneToOne` | `one_to_one` | reference ↔ inverse reference |
//! | `ManyToOne` | `many_to_one` | reference → inverse collection membership |
//! | `OneToMany` | `one_to_many` | collection → members' back-references |

pub mod one_to_one;
pub mod many_to_one;
pub mod one_to_many;

pub use one_to_one::OneToOne;
pub use many_to_one::ManyToOne;
pub use one_to_many::OneToMany;

use crate::graph::GraphOps;
use crate::model::{EntityId, Value};
use crate::Result;

/// Reacts to a slot's value change to keep a related entity consistent.
///
/// Instances are stateless with respect to any particular slot and are
/// shared (`Arc`) across every slot of the declared relationship kind.
pub trait RelationshipConstraint: Send + Sync + std::fmt::Debug {
    /// Short tag for trace output.
    fn name(&self) -> &str;

    /// React to the host's property changing from `old` to `new`.
    fn rebind(
        &self,
        graph: &dyn GraphOps,
        host: EntityId,
        old: &Value,
        new: &Value,
    ) -> Result<()>;
}
