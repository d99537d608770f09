//! Property-based tests over the slot protocol: for arbitrary assignment
//! sequences, constraints rebind exactly once per distinct transition.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use proptest::prelude::*;

use lazygraph::{
    DefaultFactory, EntityGraph, EntityId, GraphOps, PropertyType, RelationshipConstraint,
    Result, Schema, Value, ValueFactory,
};

type RebindLog = Arc<Mutex<Vec<(Value, Value)>>>;

#[derive(Debug, Clone)]
struct Recording {
    log: RebindLog,
}

impl RelationshipConstraint for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn rebind(
        &self,
        _graph: &dyn GraphOps,
        _host: EntityId,
        old: &Value,
        new: &Value,
    ) -> Result<()> {
        self.log.lock().push((old.clone(), new.clone()));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CountingFactory {
    inner: DefaultFactory,
    calls: AtomicUsize,
}

impl ValueFactory for CountingFactory {
    fn create(&self, graph: &dyn GraphOps, ty: &PropertyType) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.create(graph, ty)
    }
}

fn counter_graph(log: &RebindLog) -> EntityGraph {
    let schema = Schema::builder()
        .kind("Counter", |k| {
            k.property("n", PropertyType::Int)
                .constraint(Recording { log: log.clone() })
        })
        .build()
        .unwrap();
    EntityGraph::new(schema)
}

/// The transitions an assignment sequence should produce: one per value
/// that differs from the previous effective one, starting from absent.
fn expected_transitions(values: &[i64]) -> Vec<(Value, Value)> {
    let mut out = Vec::new();
    let mut current: Option<Value> = None;
    for v in values {
        let next = Value::Int(*v);
        if current.as_ref() != Some(&next) {
            out.push((current.clone().unwrap_or(Value::Null), next.clone()));
            current = Some(next);
        }
    }
    out
}

proptest! {
    #[test]
    fn set_rebinds_once_per_distinct_transition(values in prop::collection::vec(0i64..4, 1..40)) {
        let log: RebindLog = Arc::new(Mutex::new(Vec::new()));
        let graph = counter_graph(&log);
        let c = graph.spawn(&"Counter".into()).unwrap();

        for v in &values {
            graph.set(c, &"n".into(), Value::Int(*v)).unwrap();
        }

        prop_assert_eq!(log.lock().clone(), expected_transitions(&values));
    }

    #[test]
    fn assign_matches_set_semantics(values in prop::collection::vec(0i64..4, 1..40)) {
        let log: RebindLog = Arc::new(Mutex::new(Vec::new()));
        let graph = counter_graph(&log);
        let mut c = graph.spawn(&"Counter".into()).unwrap();

        for v in &values {
            graph.assign(&mut c, "n", Value::Int(*v)).unwrap();
        }

        prop_assert_eq!(log.lock().clone(), expected_transitions(&values));
    }

    #[test]
    fn repeated_gets_generate_exactly_once(reads in 1usize..10) {
        let schema = Schema::builder()
            .kind("Person", |k| k.property("name", PropertyType::String))
            .build()
            .unwrap();
        let graph = EntityGraph::with_factory(schema, CountingFactory::default());
        let p = graph.spawn(&"Person".into()).unwrap();

        let first = graph.get(p, &"name".into()).unwrap();
        for _ in 1..reads {
            prop_assert_eq!(graph.get(p, &"name".into()).unwrap(), first.clone());
        }

        prop_assert_eq!(graph.factory().calls.load(Ordering::Relaxed), 1);
    }
}
