//! # lazygraph — Lazy Object-Graph Synthesis
//!
//! Builds synthetic object graphs (test data) whose properties are
//! materialized lazily and kept mutually consistent through declared
//! relationship constraints. A property is not eagerly filled: it holds a
//! deferred slot that produces a value only when first observed, and every
//! effective assignment rebinds the declared constraints against both the
//! previous and new value — so bidirectional relationships never
//! desynchronize.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `RelationshipConstraint` and `ValueFactory` are the
//!    contracts between the slot protocol and everything pluggable
//! 2. **Explicit capabilities**: no proxies, no reflection — hosts expose
//!    slots through the `Host` probe, property keys are schema-declared
//! 3. **Slots own the laziness**: generation happens on first read, never
//!    on write, and at most once per slot
//! 4. **Fail loud, no rollback**: a refusing constraint aborts the set
//!    mid-cascade; callers wanting atomicity validate first
//!
//! ## Quick Start
//!
//! ```rust
//! use lazygraph::{EntityGraph, GraphOps, ManyToOne, OneToMany, PropertyType, Schema, Value};
//!
//! # fn main() -> lazygraph::Result<()> {
//! let schema = Schema::builder()
//!     .kind("Blog", |k| {
//!         k.property("title", PropertyType::String)
//!             .property("posts", PropertyType::ref_list("Post"))
//!             .constraint(OneToMany::new("blog"))
//!     })
//!     .kind("Post", |k| {
//!         k.property("blog", PropertyType::reference("Blog"))
//!             .constraint(ManyToOne::new("posts"))
//!     })
//!     .build()?;
//!
//! let graph = EntityGraph::new(schema);
//! let blog = graph.spawn(&"Blog".into())?;
//! let post = graph.spawn(&"Post".into())?;
//!
//! // Setting one side of the relationship keeps the other side in sync.
//! graph.set(post, &"blog".into(), Value::Ref(blog))?;
//! assert!(graph.get(blog, &"posts".into())?.contains_ref(post));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod slot;
pub mod constraint;
pub mod schema;
pub mod factory;
pub mod graph;
pub mod export;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Entity, EntityId, Kind, PropertyId, PropertyMap, Record, Value,
};

// ============================================================================
// Re-exports: Slot protocol
// ============================================================================

pub use slot::PropertySlot;

// ============================================================================
// Re-exports: Constraints
// ============================================================================

pub use constraint::{ManyToOne, OneToMany, OneToOne, RelationshipConstraint};

// ============================================================================
// Re-exports: Schema & factory
// ============================================================================

pub use schema::{KindBuilder, KindDef, PropertyDef, PropertyType, Schema, SchemaBuilder};
pub use factory::{DefaultFactory, ValueFactory};

// ============================================================================
// Re-exports: Store & dispatch
// ============================================================================

pub use graph::{EntityGraph, GraphOps, Host};
pub use export::export_json;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
