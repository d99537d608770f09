//! Entity store, host accessor, and the assignment dispatcher.
//!
//! `EntityGraph` is the reference host accessor: it owns every spawned
//! entity and resolves `(entity, property)` to the one slot responsible
//! for that pair — the same slot for every call, for the entity's whole
//! lifetime, which is what makes the dispatcher's idempotence check
//! meaningful.
//!
//! ## Locking discipline
//!
//! The entity table sits behind a single `RwLock` purely for interior
//! mutability; the execution model is single-threaded and synchronous.
//! The lock is **never held across a constraint or factory callback**:
//! a slot transition is recorded under the lock, the lock is released,
//! and only then do rebinds (or value generation) run. Reentrant calls
//! from inside a callback — including ones that transitively reach back
//! to the originating entity — therefore cannot deadlock, and observe
//! the already-updated slot.

use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::factory::{DefaultFactory, ValueFactory};
use crate::model::{Entity, EntityId, Kind, PropertyId, Record, Value};
use crate::schema::Schema;
use crate::slot::{PropertySlot, StoreOutcome};
use crate::{Error, Result};

// ============================================================================
// GraphOps — the object-safe store surface
// ============================================================================

/// What constraints and value factories program against.
///
/// Object-safe so that `rebind` and `create` callbacks can hold
/// `&dyn GraphOps` regardless of the store's factory parameter.
pub trait GraphOps {
    /// Create an entity of `kind` with every declared slot unmaterialized.
    fn spawn(&self, kind: &Kind) -> Result<EntityId>;

    /// Observe a property, generating its value on first read.
    ///
    /// Never returns an "absent" value: an unmaterialized slot drives the
    /// value factory exactly once and runs the full set protocol with the
    /// generated value before returning it.
    fn get(&self, host: EntityId, prop: &PropertyId) -> Result<Value>;

    /// Store a property value, rebinding constraints on every effective
    /// transition. Setting an equal value onto a materialized slot is a
    /// suppressed no-op.
    fn set(&self, host: EntityId, prop: &PropertyId, value: Value) -> Result<()>;

    /// Non-generating read: `Some` only once materialized.
    fn try_get(&self, host: EntityId, prop: &PropertyId) -> Result<Option<Value>>;

    /// Whether `(host, prop)` resolves to a slot at all.
    fn has_slot(&self, host: EntityId, prop: &PropertyId) -> bool;

    /// The kind `host` was spawned as.
    fn kind_of(&self, host: EntityId) -> Result<Kind>;
}

// ============================================================================
// Host — the assignment-target capability probe
// ============================================================================

/// An assignment target for [`EntityGraph::assign`].
///
/// Slot-bearing hosts report their backing entity via `slot_entity`;
/// plain hosts leave the default `None` and take direct field writes.
/// The dispatcher only ever calls `write_direct` when `slot_entity`
/// returned `None`.
pub trait Host {
    /// The backing entity when this host participates in the slot system.
    fn slot_entity(&self) -> Option<EntityId> {
        None
    }

    /// Direct field write fallback for hosts without slots: ordinary
    /// overwrite semantics, no constraint side effects.
    fn write_direct(&mut self, _prop: &PropertyId, _value: Value) {}
}

impl Host for EntityId {
    fn slot_entity(&self) -> Option<EntityId> {
        Some(*self)
    }
}

impl Host for Record {
    fn write_direct(&mut self, prop: &PropertyId, value: Value) {
        self.fields.insert(prop.clone(), value);
    }
}

// ============================================================================
// EntityGraph
// ============================================================================

/// The in-memory entity store and public entry point.
///
/// Generic over the value factory the way test fixtures want to swap it;
/// `EntityGraph::new` uses the deterministic [`DefaultFactory`].
pub struct EntityGraph<F: ValueFactory = DefaultFactory> {
    entities: RwLock<HashMap<EntityId, Entity>>,
    next_id: AtomicU64,
    schema: Schema,
    factory: F,
}

impl EntityGraph<DefaultFactory> {
    pub fn new(schema: Schema) -> Self {
        Self::with_factory(schema, DefaultFactory::new())
    }
}

impl<F: ValueFactory> EntityGraph<F> {
    pub fn with_factory(schema: Schema, factory: F) -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            schema,
            factory,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Access the underlying value factory (for advanced use).
    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    /// All entity ids, ascending (spawn order).
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.read().keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// The materialized properties of one entity, in declaration order.
    /// Unmaterialized slots are skipped, never forced.
    pub fn materialized_properties(&self, host: EntityId) -> Result<Vec<(PropertyId, Value)>> {
        let entities = self.entities.read();
        let entity = entities
            .get(&host)
            .ok_or_else(|| Error::NotFound(format!("entity {host}")))?;
        Ok(entity
            .slots()
            .filter_map(|s| s.peek().map(|v| (s.prop().clone(), v.clone())))
            .collect())
    }

    // ========================================================================
    // Assignment dispatcher
    // ========================================================================

    /// The single funnel through which callers mutate properties.
    ///
    /// 1. A host without the slot capability takes a direct field write —
    ///    no constraint logic.
    /// 2. A slot-bearing host whose `(entity, prop)` resolves to nothing
    ///    is a silent no-op: unknown properties are ignorable here, not
    ///    errors (multi-pass builders assign properties some kinds don't
    ///    declare). The strict [`GraphOps::set`] path errors instead.
    /// 3. Re-assigning the value a slot already holds is a no-op — no
    ///    spurious rebind cascade, and no generation merely to compare.
    /// 4. Anything else runs the full set protocol.
    pub fn assign<H: Host + ?Sized>(
        &self,
        host: &mut H,
        prop: impl Into<PropertyId>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let prop = prop.into();
        let value = value.into();

        let Some(id) = host.slot_entity() else {
            trace!(%prop, "direct write to plain host");
            host.write_direct(&prop, value);
            return Ok(());
        };

        if !self.has_slot(id, &prop) {
            trace!(%id, %prop, "no slot resolved, ignoring assignment");
            return Ok(());
        }
        if let Some(current) = self.try_get(id, &prop)? {
            if current == value {
                trace!(%id, %prop, "already holds this value, skipping");
                return Ok(());
            }
        }
        self.set_impl(id, &prop, value)
    }

    // ========================================================================
    // Slot protocol
    // ========================================================================

    fn spawn_impl(&self, kind: &Kind) -> Result<EntityId> {
        let def = self
            .schema
            .kind(kind)
            .ok_or_else(|| Error::NotFound(format!("kind '{kind}'")))?;

        let id = EntityId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let slots: Vec<PropertySlot> = def
            .properties()
            .iter()
            .map(|p| PropertySlot::new(p.prop.clone(), p.ty.clone(), p.constraints.clone()))
            .collect();

        debug!(%id, %kind, slots = slots.len(), "spawned entity");
        self.entities
            .write()
            .insert(id, Entity::new(id, kind.clone(), slots));
        Ok(id)
    }

    fn set_impl(&self, host: EntityId, prop: &PropertyId, value: Value) -> Result<()> {
        let (previous, constraints) = {
            let mut entities = self.entities.write();
            let entity = entities
                .get_mut(&host)
                .ok_or_else(|| Error::NotFound(format!("entity {host}")))?;
            let slot = entity.slot_mut(prop).ok_or_else(|| {
                Error::NotFound(format!("property '{prop}' on entity {host}"))
            })?;

            match slot.store(value.clone()) {
                StoreOutcome::Unchanged => {
                    trace!(%host, %prop, "equal value, rebind suppressed");
                    return Ok(());
                }
                StoreOutcome::Swapped { previous } => (previous, slot.constraints().clone()),
            }
        }; // table lock released before any rebind runs

        trace!(%host, %prop, %previous, new = %value, "slot transition");
        for c in &constraints {
            trace!(%host, %prop, constraint = c.name(), "rebind");
            c.rebind(self, host, &previous, &value)?;
        }
        Ok(())
    }

    fn get_impl(&self, host: EntityId, prop: &PropertyId) -> Result<Value> {
        let ty = {
            let entities = self.entities.read();
            let entity = entities
                .get(&host)
                .ok_or_else(|| Error::NotFound(format!("entity {host}")))?;
            let slot = entity.slot(prop).ok_or_else(|| {
                Error::NotFound(format!("property '{prop}' on entity {host}"))
            })?;
            if let Some(v) = slot.peek() {
                return Ok(v.clone());
            }
            slot.ty().clone()
        }; // release before the factory runs; it may spawn recursively

        trace!(%host, %prop, ty = ty.type_name(), "materializing via factory");
        let generated = self.factory.create(self, &ty)?;
        self.set_impl(host, prop, generated.clone())?;

        // A reentrant rebind may have overwritten the generated value;
        // return what the slot holds now.
        Ok(self.try_get_impl(host, prop)?.unwrap_or(generated))
    }

    fn try_get_impl(&self, host: EntityId, prop: &PropertyId) -> Result<Option<Value>> {
        let entities = self.entities.read();
        let entity = entities
            .get(&host)
            .ok_or_else(|| Error::NotFound(format!("entity {host}")))?;
        let slot = entity
            .slot(prop)
            .ok_or_else(|| Error::NotFound(format!("property '{prop}' on entity {host}")))?;
        Ok(slot.peek().cloned())
    }
}

impl<F: ValueFactory> GraphOps for EntityGraph<F> {
    fn spawn(&self, kind: &Kind) -> Result<EntityId> {
        self.spawn_impl(kind)
    }

    fn get(&self, host: EntityId, prop: &PropertyId) -> Result<Value> {
        self.get_impl(host, prop)
    }

    fn set(&self, host: EntityId, prop: &PropertyId, value: Value) -> Result<()> {
        self.set_impl(host, prop, value)
    }

    fn try_get(&self, host: EntityId, prop: &PropertyId) -> Result<Option<Value>> {
        self.try_get_impl(host, prop)
    }

    fn has_slot(&self, host: EntityId, prop: &PropertyId) -> bool {
        self.entities
            .read()
            .get(&host)
            .is_some_and(|e| e.slot(prop).is_some())
    }

    fn kind_of(&self, host: EntityId) -> Result<Kind> {
        let entities = self.entities.read();
        let entity = entities
            .get(&host)
            .ok_or_else(|| Error::NotFound(format!("entity {host}")))?;
        Ok(entity.kind.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PropertyType, Schema};

    fn person_schema() -> Schema {
        Schema::builder()
            .kind("Person", |k| {
                k.property("name", PropertyType::String)
                    .property("age", PropertyType::Int)
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_spawn_and_lazy_get() {
        let graph = EntityGraph::new(person_schema());
        let p = graph.spawn(&"Person".into()).unwrap();

        // Nothing materialized yet.
        assert_eq!(graph.try_get(p, &"name".into()).unwrap(), None);

        // First get generates; second returns the same value.
        let name = graph.get(p, &"name".into()).unwrap();
        assert_eq!(graph.get(p, &"name".into()).unwrap(), name);
        assert_eq!(graph.try_get(p, &"name".into()).unwrap(), Some(name));
    }

    #[test]
    fn test_set_wins_over_generation() {
        let graph = EntityGraph::new(person_schema());
        let p = graph.spawn(&"Person".into()).unwrap();

        graph.set(p, &"age".into(), Value::Int(30)).unwrap();
        assert_eq!(graph.get(p, &"age".into()).unwrap(), Value::Int(30));
    }

    #[test]
    fn test_unknown_kind_is_not_found() {
        let graph = EntityGraph::new(person_schema());
        assert!(matches!(
            graph.spawn(&"Robot".into()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_strict_set_on_unknown_property_errors() {
        let graph = EntityGraph::new(person_schema());
        let p = graph.spawn(&"Person".into()).unwrap();
        assert!(matches!(
            graph.set(p, &"salary".into(), Value::Int(1)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_assign_ignores_unknown_property() {
        let graph = EntityGraph::new(person_schema());
        let mut p = graph.spawn(&"Person".into()).unwrap();
        graph.assign(&mut p, "salary", Value::Int(1)).unwrap();
        assert!(!graph.has_slot(p, &"salary".into()));
    }

    #[test]
    fn test_assign_to_plain_record_writes_directly() {
        let graph = EntityGraph::new(person_schema());
        let mut rec = Record::new();
        graph.assign(&mut rec, "name", "Ada").unwrap();
        assert_eq!(rec.get(&"name".into()), Some(&Value::String("Ada".into())));

        // Overwrite semantics, no slots involved.
        graph.assign(&mut rec, "name", "Bob").unwrap();
        assert_eq!(rec.get(&"name".into()), Some(&Value::String("Bob".into())));
        assert_eq!(graph.entity_count(), 0);
    }

    #[test]
    fn test_materialized_properties_skip_untouched_slots() {
        let graph = EntityGraph::new(person_schema());
        let p = graph.spawn(&"Person".into()).unwrap();
        graph.set(p, &"age".into(), Value::Int(3)).unwrap();

        let props = graph.materialized_properties(p).unwrap();
        assert_eq!(props, vec![("age".into(), Value::Int(3))]);
    }
}
