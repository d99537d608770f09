//! Universal value type for synthesized property graphs.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;

/// A property value on a synthesized entity.
///
/// Covers every type the schema layer can declare:
/// - Scalars: Bool, Int, Float, String
/// - Temporal: Date, DateTime
/// - References: Ref (single entity), List (reference collections)
///
/// `Value::Null` doubles as the "absent" sentinel reported to relationship
/// constraints for a slot that was never materialized. `Value::Ref` carries
/// an [`EntityId`], so equality on reference-typed values is identity
/// equality — the notion the slot protocol's idempotence check relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),

    // Temporal types
    Date(NaiveDate),
    DateTime(DateTime<Utc>),

    // Graph types
    Ref(EntityId),
    List(Vec<Value>),
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Date(_) => "DATE",
            Value::DateTime(_) => "DATETIME",
            Value::Ref(_) => "REF",
            Value::List(_) => "LIST",
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
    pub fn is_ref(&self) -> bool { matches!(self, Value::Ref(_)) }

    /// Attempt to extract as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Attempt to extract as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempt to extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempt to extract as an entity reference
    pub fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Attempt to extract as a list slice
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// True if this value is `Ref(id)` or a list containing `Ref(id)`.
    pub fn contains_ref(&self, id: EntityId) -> bool {
        match self {
            Value::Ref(r) => *r == id,
            Value::List(items) => items.iter().any(|v| v == &Value::Ref(id)),
            _ => false,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl From<EntityId> for Value { fn from(v: EntityId) -> Self { Value::Ref(v) } }
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self { Value::List(v.into_iter().map(Into::into).collect()) }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Value::Date(d) => write!(f, "{d}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::Ref(id) => write!(f, "@{id}"),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(3.14), Value::Float(3.14));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(EntityId(7)), Value::Ref(EntityId(7)));
    }

    #[test]
    fn test_ref_equality_is_identity() {
        assert_eq!(Value::Ref(EntityId(1)), Value::Ref(EntityId(1)));
        assert_ne!(Value::Ref(EntityId(1)), Value::Ref(EntityId(2)));
    }

    #[test]
    fn test_contains_ref() {
        let a = EntityId(1);
        let b = EntityId(2);
        assert!(Value::Ref(a).contains_ref(a));
        assert!(!Value::Ref(a).contains_ref(b));
        assert!(Value::List(vec![Value::Ref(a), Value::Ref(b)]).contains_ref(b));
        assert!(!Value::List(vec![Value::Int(1)]).contains_ref(a));
        assert!(!Value::Null.contains_ref(a));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Ref(EntityId(3)).to_string(), "@3");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Null]).to_string(),
            "[1, null]"
        );
    }
}
