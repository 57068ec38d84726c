//! Conversions from a response body into JSON, collections and entities.
//!
//! # Design
//! `ResponseTransformer` owns one `HttpResponse` and reads only its body.
//! Every `to_*` call decodes the body again and shares nothing with earlier
//! calls, so a transformer can be used from several threads at once.
//!
//! A body that is absent or not valid JSON is a routine outcome for an HTTP
//! client; the conversions report it as `None`. Only structural problems
//! (unknown entity types, incomplete pagination payloads) are errors.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::entity::{Entity, Projection};
use crate::error::TransformError;
use crate::http::HttpResponse;
use crate::pagination::Paginated;
use crate::projection::{is_entity_collection, project, project_collection};
use crate::relations::{attach, RelationTree};
use crate::schema::TypeRegistry;

#[derive(Debug, Clone)]
pub struct ResponseTransformer {
    response: HttpResponse,
}

impl ResponseTransformer {
    pub fn new(response: HttpResponse) -> Self {
        Self { response }
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn into_response(self) -> HttpResponse {
        self.response
    }

    /// Decode the body. `None` when there is no body or it is not JSON.
    pub fn to_json(&self) -> Option<Value> {
        let body = self.response.body.as_deref()?;
        match serde_json::from_str(body) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(status = self.response.status, error = %e, "response body is not JSON");
                None
            }
        }
    }

    /// The body as a key-ordered mapping. A top-level array is keyed by
    /// element index; a scalar body yields `None`.
    pub fn to_mapping(&self) -> Option<Map<String, Value>> {
        match self.to_json()? {
            Value::Object(map) => Some(map),
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| (idx.to_string(), item))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// The body as a list of members. An array of objects contributes its
    /// elements; any other decodable body becomes a single member.
    pub fn to_collection(&self) -> Option<Vec<Value>> {
        match self.to_json()? {
            Value::Array(items) if is_entity_collection(&items) => Some(items),
            other => Some(vec![other]),
        }
    }

    /// `to_collection` with every member projected onto `type_name`.
    ///
    /// `None` when the body does not decode or a member is not an object.
    pub fn to_entities(
        &self,
        registry: &TypeRegistry,
        type_name: &str,
        extra: &[&str],
    ) -> Result<Option<Vec<Entity>>, TransformError> {
        registry.resolve(type_name)?;
        match self.to_collection() {
            Some(members) => project_collection(registry, type_name, &members, extra),
            None => Ok(None),
        }
    }

    /// Project the body onto `type_name` and attach `relations`.
    ///
    /// All types are resolved before the body is touched. A body that is an
    /// array of objects yields `Projection::Many`, each member carrying its
    /// own relations.
    pub fn to_entity(
        &self,
        registry: &TypeRegistry,
        type_name: &str,
        extra: &[&str],
        relations: &RelationTree,
    ) -> Result<Option<Projection>, TransformError> {
        registry.resolve(type_name)?;
        registry.validate(relations)?;

        let Some(payload) = self.to_json() else {
            return Ok(None);
        };
        match project(registry, type_name, Some(&payload), extra)? {
            Some(projection) => Ok(Some(attach(registry, projection, relations, &payload)?)),
            None => Ok(None),
        }
    }

    /// Page metadata and items from a paginated payload.
    ///
    /// The payload's own `per_page` is authoritative; `per_page` here is what
    /// the caller asked for and only checked against it.
    pub fn to_paginated(&self, per_page: u64) -> Result<Paginated, TransformError> {
        let payload = self.to_json();
        let page = Paginated::from_payload(payload.as_ref())?;
        if page.per_page != per_page {
            warn!(
                requested = per_page,
                returned = page.per_page,
                "server page size differs from requested page size"
            );
        }
        Ok(page)
    }
}

impl From<HttpResponse> for ResponseTransformer {
    fn from(response: HttpResponse) -> Self {
        Self::new(response)
    }
}
