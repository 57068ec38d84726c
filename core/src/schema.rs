//! Entity type descriptors and the registry that resolves them by name.
//!
//! # Design
//! Target types are looked up by name in an explicit `TypeRegistry` rather
//! than discovered at runtime. Every type a transformation will touch is
//! resolved up front, so an unknown name fails the call before any entity
//! has been built.

use std::collections::HashMap;

use crate::error::TransformError;
use crate::relations::{Relation, RelationTree};

/// Fields every entity type accepts in addition to its declared ones.
pub const IMPLICIT_FIELDS: [&str; 2] = ["created_at", "updated_at"];

/// Describes one target type: its name and the fields projection may fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    fillable: Vec<String>,
}

impl EntityType {
    /// Declared fields keep their order; repeated names are dropped.
    pub fn new<I, S>(name: impl Into<String>, fillable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = Vec::new();
        for field in fillable {
            let field = field.into();
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Self {
            name: name.into(),
            fillable: fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fillable(&self) -> &[String] {
        &self.fillable
    }

    /// Ordered union of declared, implicit and extra fields, without
    /// duplicates. This is the exact field set of every entity projected
    /// onto this type.
    pub fn assignable_fields(&self, extra: &[&str]) -> Vec<String> {
        let mut fields = self.fillable.clone();
        let rest = IMPLICIT_FIELDS.iter().chain(extra.iter());
        for field in rest {
            if !fields.iter().any(|f| f == field) {
                fields.push((*field).to_string());
            }
        }
        fields
    }
}

/// Name-keyed collection of entity types.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, EntityType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any earlier type with the same name.
    pub fn register(&mut self, entity_type: EntityType) -> &mut Self {
        self.types.insert(entity_type.name.clone(), entity_type);
        self
    }

    /// Builder-style `register`.
    pub fn with(mut self, entity_type: EntityType) -> Self {
        self.register(entity_type);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&EntityType, TransformError> {
        self.types
            .get(name)
            .ok_or_else(|| TransformError::UnknownType(name.to_string()))
    }

    /// Resolve every type named anywhere in `tree`.
    pub fn validate(&self, tree: &RelationTree) -> Result<(), TransformError> {
        for (_, relation) in tree.iter() {
            match relation {
                Relation::Leaf(type_name) => {
                    self.resolve(type_name)?;
                }
                Relation::Nested { entity, children } => {
                    self.resolve(entity)?;
                    self.validate(children)?;
                }
            }
        }
        Ok(())
    }
}
