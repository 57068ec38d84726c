//! Synchronous HTTP client core with a JSON-to-entity transformation engine.
//!
//! # Overview
//! Builds `HttpRequest` values and converts `HttpResponse` bodies without
//! touching the network (host-does-IO pattern). The caller executes the
//! round-trip; this crate decides what to send and what the answer means.
//!
//! # Design
//! - `SimpleClient` is stateless apart from its `ClientConfig`.
//! - `ResponseTransformer` turns a body into JSON, a key-ordered mapping, a
//!   collection, a paginated view, or entities of a registered type.
//! - Entity types live in a `TypeRegistry` and are resolved by name before
//!   any projection starts.
//! - Related entities are described by a `RelationTree` and attached
//!   recursively, one tree level per recursion step.
//! - Undecodable bodies come back as `None`; unknown types and incomplete
//!   pagination payloads are `TransformError`s.

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod pagination;
pub mod projection;
pub mod relations;
pub mod schema;
pub mod transformer;

pub use client::{RequestData, SimpleClient};
pub use config::ClientConfig;
pub use entity::{Entity, Projection};
pub use error::{ClientError, TransformError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Outcome, TransportMeta};
pub use pagination::Paginated;
pub use relations::{attach_relations, Relation, RelationTree};
pub use schema::{EntityType, TypeRegistry, IMPLICIT_FIELDS};
pub use transformer::ResponseTransformer;
