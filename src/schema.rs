//! Entity schemas — kinds, property types, and attached constraints.
//!
//! The schema replaces runtime reflection: which properties an entity kind
//! has, what type each one synthesizes to, and which relationship
//! constraints watch it are all declared explicitly, once, before any
//! entity is spawned. Constraint attachment order is rebind order.

use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::constraint::RelationshipConstraint;
use crate::model::{Kind, PropertyId};
use crate::slot::ConstraintList;
use crate::{Error, Result};

// ============================================================================
// Property types
// ============================================================================

/// The type a property's value factory synthesizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Bool,
    Int,
    Float,
    String,
    Date,
    DateTime,
    /// Reference to a single entity of the given kind.
    Ref(Kind),
    /// Collection of references to entities of the given kind.
    RefList(Kind),
}

impl PropertyType {
    /// Reference to a single entity of `kind`.
    pub fn reference(kind: impl Into<Kind>) -> Self {
        PropertyType::Ref(kind.into())
    }

    /// Collection of references to entities of `kind`.
    pub fn ref_list(kind: impl Into<Kind>) -> Self {
        PropertyType::RefList(kind.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyType::Bool => "BOOLEAN",
            PropertyType::Int => "INTEGER",
            PropertyType::Float => "FLOAT",
            PropertyType::String => "STRING",
            PropertyType::Date => "DATE",
            PropertyType::DateTime => "DATETIME",
            PropertyType::Ref(_) => "REF",
            PropertyType::RefList(_) => "LIST",
        }
    }

    /// The target kind for reference-shaped types.
    pub fn target_kind(&self) -> Option<&Kind> {
        match self {
            PropertyType::Ref(k) | PropertyType::RefList(k) => Some(k),
            _ => None,
        }
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// One declared property of an entity kind.
#[derive(Debug)]
pub struct PropertyDef {
    pub prop: PropertyId,
    pub ty: PropertyType,
    pub(crate) constraints: ConstraintList,
}

/// One declared entity kind: an ordered property list.
///
/// Declaration order is preserved — it is both the slot layout order of
/// spawned entities and the export order.
#[derive(Debug)]
pub struct KindDef {
    pub kind: Kind,
    properties: Vec<PropertyDef>,
}

impl KindDef {
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    pub fn property(&self, prop: &PropertyId) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| &p.prop == prop)
    }
}

/// The full entity schema: one [`KindDef`] per kind.
#[derive(Debug)]
pub struct Schema {
    kinds: HashMap<Kind, KindDef>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { kinds: Vec::new(), errors: Vec::new() }
    }

    pub fn kind(&self, kind: &Kind) -> Option<&KindDef> {
        self.kinds.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &KindDef> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent schema construction. Misdeclarations are collected and surfaced
/// as one `SchemaError` from [`SchemaBuilder::build`].
pub struct SchemaBuilder {
    kinds: Vec<KindDef>,
    errors: Vec<String>,
}

impl SchemaBuilder {
    /// Declare an entity kind.
    pub fn kind(
        mut self,
        kind: impl Into<Kind>,
        f: impl FnOnce(KindBuilder) -> KindBuilder,
    ) -> Self {
        let kb = f(KindBuilder {
            def: KindDef { kind: kind.into(), properties: Vec::new() },
            errors: Vec::new(),
        });
        self.errors.extend(kb.errors);
        self.kinds.push(kb.def);
        self
    }

    /// Validate and freeze the schema.
    pub fn build(self) -> Result<Schema> {
        let mut errors = self.errors;
        let mut kinds: HashMap<Kind, KindDef> = HashMap::with_capacity(self.kinds.len());

        let declared: Vec<Kind> = self.kinds.iter().map(|k| k.kind.clone()).collect();

        for def in self.kinds {
            let mut seen: Vec<&PropertyId> = Vec::new();
            for p in &def.properties {
                if seen.contains(&&p.prop) {
                    errors.push(format!(
                        "kind '{}' declares property '{}' twice",
                        def.kind, p.prop
                    ));
                }
                seen.push(&p.prop);

                if let Some(target) = p.ty.target_kind() {
                    if !declared.contains(target) {
                        errors.push(format!(
                            "property '{}.{}' references undeclared kind '{target}'",
                            def.kind, p.prop
                        ));
                    }
                }
            }
            let name = def.kind.clone();
            if kinds.insert(name.clone(), def).is_some() {
                errors.push(format!("kind '{name}' is declared twice"));
            }
        }

        if errors.is_empty() {
            Ok(Schema { kinds })
        } else {
            Err(Error::SchemaError(errors.join("; ")))
        }
    }
}

/// Builds one kind's property list.
pub struct KindBuilder {
    def: KindDef,
    errors: Vec<String>,
}

impl KindBuilder {
    /// Declare a property.
    pub fn property(mut self, prop: impl Into<PropertyId>, ty: PropertyType) -> Self {
        self.def.properties.push(PropertyDef {
            prop: prop.into(),
            ty,
            constraints: ConstraintList::new(),
        });
        self
    }

    /// Attach a relationship constraint to the most recently declared
    /// property. Attachment order is rebind declaration order.
    pub fn constraint(mut self, c: impl RelationshipConstraint + 'static) -> Self {
        match self.def.properties.last_mut() {
            Some(def) => def.constraints.push(Arc::new(c)),
            None => self.errors.push(format!(
                "kind '{}' attaches a constraint before declaring any property",
                self.def.kind
            )),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{ManyToOne, OneToMany};

    #[test]
    fn test_build_blog_post_schema() {
        let schema = Schema::builder()
            .kind("Blog", |k| {
                k.property("title", PropertyType::String)
                    .property("posts", PropertyType::ref_list("Post"))
                    .constraint(OneToMany::new("blog"))
            })
            .kind("Post", |k| {
                k.property("blog", PropertyType::reference("Blog"))
                    .constraint(ManyToOne::new("posts"))
            })
            .build()
            .unwrap();

        assert_eq!(schema.len(), 2);
        let blog = schema.kind(&"Blog".into()).unwrap();
        assert_eq!(blog.properties().len(), 2);
        let posts = blog.property(&"posts".into()).unwrap();
        assert_eq!(posts.ty, PropertyType::ref_list("Post"));
        assert_eq!(posts.constraints.len(), 1);
    }

    #[test]
    fn test_duplicate_property_is_rejected() {
        let err = Schema::builder()
            .kind("Blog", |k| {
                k.property("title", PropertyType::String)
                    .property("title", PropertyType::Int)
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_undeclared_ref_target_is_rejected() {
        let err = Schema::builder()
            .kind("Post", |k| k.property("blog", PropertyType::reference("Blog")))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("undeclared kind 'Blog'"));
    }

    #[test]
    fn test_constraint_before_property_is_rejected() {
        let err = Schema::builder()
            .kind("Post", |k| k.constraint(ManyToOne::new("posts")))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("before declaring any property"));
    }
}
