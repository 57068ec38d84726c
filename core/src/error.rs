//! Error types for the client core.
//!
//! # Design
//! Only structural problems are errors. A response body that does not decode,
//! or a field missing from the payload, is routine for an HTTP client and is
//! reported as `None` by the transformer instead of landing here.

use thiserror::Error;

/// Hard failures raised while transforming a response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// No entity type is registered under this name.
    #[error("entity type `{0}` not found")]
    UnknownType(String),

    /// The payload lacks one or more of the keys a paginated view needs.
    #[error("missing required fields for pagination: {}", .0.join(", "))]
    MissingPaginationFields(Vec<String>),

    /// A relation tree decoded from JSON does not have a usable shape.
    #[error("invalid relation tree at `{path}`: {reason}")]
    InvalidRelationTree { path: String, reason: String },
}

/// Failures raised while building a request or loading client configuration.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL and request URL are both empty.
    #[error("no URL given")]
    MissingUrl,

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The configuration document could not be parsed.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}
