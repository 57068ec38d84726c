//! Relation trees and the resolver that attaches related entities.
//!
//! # Design
//! A relation tree is an ordered list of `(name, Relation)` entries. A leaf
//! names the entity type found under `name`; a nested entry names that type
//! and carries its own subtree, evaluated against the sub-node. The resolver
//! walks the tree and the JSON side by side, so recursion depth is bounded by
//! the authored tree and never by the payload.
//!
//! Trees can also be written as JSON:
//!
//! ```json
//! {"author": {"User": {"profile": "Profile"}}, "comments": "Comment"}
//! ```
//!
//! A string value is a leaf. An object value must hold exactly one key, the
//! entity type, whose value is the nested tree.

use serde_json::Value;
use tracing::trace;

use crate::entity::{Entity, Projection};
use crate::error::TransformError;
use crate::projection::{json_kind, project};
use crate::schema::TypeRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Leaf(String),
    Nested { entity: String, children: RelationTree },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTree {
    entries: Vec<(String, Relation)>,
}

impl RelationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(mut self, name: impl Into<String>, entity: impl Into<String>) -> Self {
        self.entries.push((name.into(), Relation::Leaf(entity.into())));
        self
    }

    pub fn nested(
        mut self,
        name: impl Into<String>,
        entity: impl Into<String>,
        children: RelationTree,
    ) -> Self {
        self.entries.push((
            name.into(),
            Relation::Nested {
                entity: entity.into(),
                children,
            },
        ));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of levels below the root entity; an empty tree has depth 0.
    pub fn depth(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, relation)| match relation {
                Relation::Leaf(_) => 1,
                Relation::Nested { children, .. } => 1 + children.depth(),
            })
            .max()
            .unwrap_or(0)
    }

    fn from_json_at(value: &Value, path: &str) -> Result<Self, TransformError> {
        let object = value
            .as_object()
            .ok_or_else(|| invalid(path, format!("expected an object, found {}", json_kind(value))))?;

        let mut tree = RelationTree::new();
        for (name, entry) in object {
            let here = join(path, name);
            match entry {
                Value::String(entity) => tree = tree.leaf(name.as_str(), entity.as_str()),
                Value::Object(inner) if inner.len() == 1 => {
                    let Some((entity, children)) = inner.iter().next() else {
                        continue;
                    };
                    let children = Self::from_json_at(children, &join(&here, entity))?;
                    tree = tree.nested(name.as_str(), entity.as_str(), children);
                }
                Value::Object(inner) => {
                    return Err(invalid(
                        &here,
                        format!("nested relation needs exactly one entity type key, found {}", inner.len()),
                    ));
                }
                other => {
                    return Err(invalid(
                        &here,
                        format!("expected a type name or nested tree, found {}", json_kind(other)),
                    ));
                }
            }
        }
        Ok(tree)
    }
}

impl TryFrom<&Value> for RelationTree {
    type Error = TransformError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json_at(value, "")
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn invalid(path: &str, reason: String) -> TransformError {
    TransformError::InvalidRelationTree {
        path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
        reason,
    }
}

/// Attach every relation in `tree` to `entity`, reading sub-nodes of `node`.
///
/// Entries whose key is missing from `node` are skipped. A nested entry
/// reuses a relation already attached under the same name, so a tree may
/// name `author` once as a leaf and again with children.
pub fn attach_relations(
    registry: &TypeRegistry,
    mut entity: Entity,
    tree: &RelationTree,
    node: &Value,
) -> Result<Entity, TransformError> {
    for (name, relation) in tree.iter() {
        let Some(sub) = node.get(name) else {
            trace!(relation = name, "relation key absent from payload");
            continue;
        };

        let projection = match relation {
            Relation::Leaf(type_name) => project(registry, type_name, Some(sub), &[])?,
            Relation::Nested { entity: type_name, children } => {
                registry.resolve(type_name)?;
                let base = match entity.relation(name) {
                    Some(existing) => Some(existing.clone()),
                    None => project(registry, type_name, Some(sub), &[])?,
                };
                match base {
                    Some(base) => Some(attach(registry, base, children, sub)?),
                    None => None,
                }
            }
        };

        if let Some(projection) = projection {
            trace!(relation = name, "attached relation");
            entity.set_relation(name, projection);
        }
    }
    Ok(entity)
}

/// `attach_relations` over a projection. Collection members take their
/// relations from the array element at the same position.
pub fn attach(
    registry: &TypeRegistry,
    projection: Projection,
    tree: &RelationTree,
    node: &Value,
) -> Result<Projection, TransformError> {
    if tree.is_empty() {
        return Ok(projection);
    }
    match projection {
        Projection::One(entity) => Ok(Projection::One(attach_relations(registry, entity, tree, node)?)),
        Projection::Many(entities) => {
            let items = node.as_array().map(Vec::as_slice).unwrap_or_default();
            let mut attached = Vec::with_capacity(entities.len());
            for (idx, entity) in entities.into_iter().enumerate() {
                match items.get(idx) {
                    Some(item) => attached.push(attach_relations(registry, entity, tree, item)?),
                    None => attached.push(entity),
                }
            }
            Ok(Projection::Many(attached))
        }
    }
}
