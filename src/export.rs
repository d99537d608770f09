//! JSON snapshot export — serialize the materialized portion of a graph.
//!
//! Produces a JSON document of every entity's kind plus the properties
//! that have actually materialized. Unmaterialized slots are skipped, and
//! never forced: exporting a graph must not change it.
//!
//! ```text
//! EntityGraph → export_json() → {"entities": [{id, kind, properties}, ...]}
//!   → fixture files, golden-data assertions
//! ```

use std::io::Write;

use crate::factory::ValueFactory;
use crate::graph::{EntityGraph, GraphOps};
use crate::model::Value;
use crate::Result;

/// Export a graph's materialized state as a JSON document.
///
/// Entities appear in spawn order; each entity's properties appear in
/// schema declaration order. Entity references serialize as
/// `{"ref": <id>}` so they stay distinguishable from plain integers.
pub fn export_json<F: ValueFactory>(
    graph: &EntityGraph<F>,
    writer: &mut dyn Write,
) -> Result<()> {
    let mut entities = Vec::new();
    for id in graph.entity_ids() {
        let kind = graph.kind_of(id)?;
        let mut props = serde_json::Map::new();
        for (prop, value) in graph.materialized_properties(id)? {
            props.insert(prop.to_string(), json_value(&value));
        }
        entities.push(serde_json::json!({
            "id": id.0,
            "kind": kind.as_str(),
            "properties": props,
        }));
    }

    let doc = serde_json::json!({ "entities": entities });
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)?;
    Ok(())
}

/// Map a property value onto its JSON representation.
fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::from(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Value::from(*f),
        Value::String(s) => serde_json::Value::from(s.clone()),
        Value::Date(d) => serde_json::Value::from(d.to_string()),
        Value::DateTime(dt) => serde_json::Value::from(dt.to_rfc3339()),
        Value::Ref(id) => serde_json::json!({ "ref": id.0 }),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(json_value).collect())
        }
    }
}
