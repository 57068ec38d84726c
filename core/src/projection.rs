//! Projection of JSON nodes onto entity types.
//!
//! An object becomes one entity. An array whose every element is an object
//! becomes an ordered collection of entities. Anything else is not
//! entity-shaped and projects to nothing.

use serde_json::{Map, Value};
use tracing::debug;

use crate::entity::{Entity, Projection};
use crate::error::TransformError;
use crate::schema::{EntityType, TypeRegistry};

/// True when `items` can be projected element by element. An empty array
/// qualifies.
pub fn is_entity_collection(items: &[Value]) -> bool {
    items.iter().all(Value::is_object)
}

/// Project `node` onto the type registered as `type_name`.
///
/// The type is resolved before the node is inspected, so an unknown type
/// fails even when the node is `None`.
pub fn project(
    registry: &TypeRegistry,
    type_name: &str,
    node: Option<&Value>,
    extra: &[&str],
) -> Result<Option<Projection>, TransformError> {
    let entity_type = registry.resolve(type_name)?;
    let projection = match node {
        None | Some(Value::Null) => None,
        Some(Value::Object(object)) => Some(Projection::One(project_object(entity_type, object, extra))),
        Some(Value::Array(items)) if is_entity_collection(items) => {
            Some(Projection::Many(project_items(entity_type, items, extra)))
        }
        Some(other) => {
            debug!(
                entity = type_name,
                kind = json_kind(other),
                "node is not entity-shaped, skipping projection"
            );
            None
        }
    };
    Ok(projection)
}

/// Project every element of an array of objects.
///
/// Returns `None` when `items` holds anything besides objects.
pub fn project_collection(
    registry: &TypeRegistry,
    type_name: &str,
    items: &[Value],
    extra: &[&str],
) -> Result<Option<Vec<Entity>>, TransformError> {
    let entity_type = registry.resolve(type_name)?;
    if !is_entity_collection(items) {
        return Ok(None);
    }
    Ok(Some(project_items(entity_type, items, extra)))
}

/// Copy the assignable fields of `object` into a fresh entity.
pub fn project_object(entity_type: &EntityType, object: &Map<String, Value>, extra: &[&str]) -> Entity {
    let mut entity = Entity::new(entity_type.name());
    for field in entity_type.assignable_fields(extra) {
        let value = object.get(&field).cloned().unwrap_or(Value::Null);
        entity.set_attribute(field, value);
    }
    entity
}

fn project_items(entity_type: &EntityType, items: &[Value], extra: &[&str]) -> Vec<Entity> {
    let entities: Vec<Entity> = items
        .iter()
        .filter_map(Value::as_object)
        .map(|object| project_object(entity_type, object, extra))
        .collect();
    debug!(entity = entity_type.name(), count = entities.len(), "projected collection");
    entities
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
