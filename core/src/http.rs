//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and reads `HttpResponse` values without touching the network; the
//! caller (host) executes the round-trip with whatever transport it likes and
//! fills in the transport metadata it has.
//!
//! All fields use owned types so values move freely between threads and
//! across language boundaries.

use std::time::Duration;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `SimpleClient`. Timeouts and the redirect policy come from the
/// client configuration and are meant to be applied by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub connect_timeout: Duration,
    pub data_timeout: Duration,
    pub follow_redirects: bool,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Whatever the transport knows about the round-trip besides status and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportMeta {
    pub content_type: Option<String>,
    pub effective_url: Option<String>,
    pub total_time: Option<Duration>,
    pub request_size: Option<u64>,
    /// Transport-level failure (DNS, TLS, timeout). Set when no HTTP exchange
    /// completed.
    pub error: Option<String>,
}

/// Coarse classification of a finished round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered 200.
    Success,
    /// The server answered with any other status.
    Failed,
    /// The transport never got a status back.
    Error,
}

/// An HTTP response described as plain data.
///
/// `body` is `None` when the transport produced no text, for example after a
/// connection failure. The transformer treats that the same as an
/// undecodable body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub meta: TransportMeta,
}

impl HttpResponse {
    /// Convenience constructor for a completed exchange with a text body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Some(body.into()),
            meta: TransportMeta::default(),
        }
    }

    /// A round-trip that failed before any status was received.
    pub fn transport_error(error: impl Into<String>) -> Self {
        Self {
            status: 0,
            headers: Vec::new(),
            body: None,
            meta: TransportMeta {
                error: Some(error.into()),
                ..TransportMeta::default()
            },
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.status == 0 || self.meta.error.is_some() {
            Outcome::Error
        } else if self.status == 200 {
            Outcome::Success
        } else {
            Outcome::Failed
        }
    }
}
