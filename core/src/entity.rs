//! Projected entity instances.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Result of projecting one JSON node onto an entity type.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    One(Entity),
    Many(Vec<Entity>),
}

impl Projection {
    pub fn as_one(&self) -> Option<&Entity> {
        match self {
            Projection::One(entity) => Some(entity),
            Projection::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Entity]> {
        match self {
            Projection::One(_) => None,
            Projection::Many(entities) => Some(entities),
        }
    }

    pub fn into_one(self) -> Option<Entity> {
        match self {
            Projection::One(entity) => Some(entity),
            Projection::Many(_) => None,
        }
    }

    pub fn into_many(self) -> Option<Vec<Entity>> {
        match self {
            Projection::One(_) => None,
            Projection::Many(entities) => Some(entities),
        }
    }
}

/// A record of field values copied from JSON, plus attached relations.
///
/// Every assignable field is present; fields missing from the source hold
/// `Value::Null`. Relations keep the order they were attached in.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    type_name: String,
    attributes: Map<String, Value>,
    relations: Vec<(String, Projection)>,
}

impl Entity {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Map::new(),
            relations: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn set_attribute(&mut self, field: impl Into<String>, value: Value) {
        self.attributes.insert(field.into(), value);
    }

    /// `None` when the field is not part of this entity at all; `Some(Null)`
    /// when it is but the payload had no value for it.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.attributes.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Attach `projection` under `name`, replacing an earlier one in place.
    pub fn set_relation(&mut self, name: impl Into<String>, projection: Projection) {
        let name = name.into();
        match self.relations.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = projection,
            None => self.relations.push((name, projection)),
        }
    }

    pub fn relation(&self, name: &str) -> Option<&Projection> {
        self.relations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn has_relation(&self, name: &str) -> bool {
        self.relation(name).is_some()
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &Projection)> {
        self.relations.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Attributes followed by relations, each relation nested under its name.
    /// A relation sharing its name with an attribute takes that attribute's
    /// place.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let detached = self
            .relations
            .iter()
            .filter(|(name, _)| !self.attributes.contains_key(name))
            .count();
        let mut map = serializer.serialize_map(Some(self.attributes.len() + detached))?;
        for (field, value) in &self.attributes {
            match self.relation(field) {
                Some(projection) => map.serialize_entry(field, projection)?,
                None => map.serialize_entry(field, value)?,
            }
        }
        for (name, projection) in &self.relations {
            if !self.attributes.contains_key(name) {
                map.serialize_entry(name, projection)?;
            }
        }
        map.end()
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Projection::One(entity) => entity.serialize(serializer),
            Projection::Many(entities) => entities.serialize(serializer),
        }
    }
}
