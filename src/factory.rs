//! Value synthesis — the factory seam and the deterministic default.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::graph::GraphOps;
use crate::model::Value;
use crate::schema::PropertyType;
use crate::Result;

/// Synthesizes a property's value on first observation.
///
/// A slot invokes `create` at most once in its lifetime — only on the
/// first `get` while unmaterialized; an explicit set beforehand suppresses
/// generation entirely. Implementations receive the store so that
/// reference-typed properties can spawn further lazily-backed entities;
/// such recursion is expected and bottoms out because spawning never
/// materializes the new entity's own slots.
///
/// A factory that cannot synthesize the requested type fails with
/// [`Error::UnsupportedType`](crate::Error::UnsupportedType), which
/// propagates to the caller of `get`.
pub trait ValueFactory: Send + Sync {
    fn create(&self, graph: &dyn GraphOps, ty: &PropertyType) -> Result<Value>;
}

/// Deterministic counter-based factory.
///
/// Every created value embeds the next value of a single shared counter,
/// so generated graphs are reproducible run to run:
///
/// | Type | Value for counter `n` |
/// |------|----------------------|
/// | Bool | `n % 2 == 1` |
/// | Int | `n` |
/// | Float | `n + 0.5` |
/// | String | `"value-{n}"` |
/// | Date | epoch + `n` days |
/// | DateTime | epoch + `n` seconds |
/// | Ref | a freshly spawned entity of the target kind |
/// | RefList | empty — membership arrives via constraints |
#[derive(Debug, Default)]
pub struct DefaultFactory {
    seq: AtomicU64,
}

impl DefaultFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ValueFactory for DefaultFactory {
    fn create(&self, graph: &dyn GraphOps, ty: &PropertyType) -> Result<Value> {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        Ok(match ty {
            PropertyType::Bool => Value::Bool(n % 2 == 1),
            PropertyType::Int => Value::Int(n as i64),
            PropertyType::Float => Value::Float(n as f64 + 0.5),
            PropertyType::String => Value::String(format!("value-{n}")),
            PropertyType::Date => {
                let base = NaiveDate::default();
                Value::Date(base.checked_add_days(Days::new(n)).unwrap_or(base))
            }
            PropertyType::DateTime => {
                let base = DateTime::<Utc>::default();
                Value::DateTime(
                    base.checked_add_signed(chrono::Duration::seconds(n as i64))
                        .unwrap_or(base),
                )
            }
            PropertyType::Ref(kind) => Value::Ref(graph.spawn(kind)?),
            PropertyType::RefList(_) => Value::List(Vec::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntityGraph;
    use crate::schema::Schema;

    fn empty_graph() -> EntityGraph {
        EntityGraph::new(Schema::builder().build().unwrap())
    }

    #[test]
    fn test_scalar_sequence_is_deterministic() {
        let graph = empty_graph();
        let f = DefaultFactory::new();

        assert_eq!(f.create(&graph, &PropertyType::Int).unwrap(), Value::Int(0));
        assert_eq!(f.create(&graph, &PropertyType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(
            f.create(&graph, &PropertyType::String).unwrap(),
            Value::String("value-2".into())
        );
        assert_eq!(f.create(&graph, &PropertyType::Float).unwrap(), Value::Float(3.5));
    }

    #[test]
    fn test_ref_list_starts_empty() {
        let graph = empty_graph();
        let f = DefaultFactory::new();
        assert_eq!(
            f.create(&graph, &PropertyType::ref_list("Post")).unwrap(),
            Value::List(vec![])
        );
    }

    #[test]
    fn test_dates_advance_with_the_counter() {
        let graph = empty_graph();
        let f = DefaultFactory::new();
        let d0 = f.create(&graph, &PropertyType::Date).unwrap();
        let d1 = f.create(&graph, &PropertyType::Date).unwrap();
        assert_ne!(d0, d1);
    }
}
