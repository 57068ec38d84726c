//! Client configuration.
//!
//! `ClientConfig` can be built in code with the `with_*` setters or loaded
//! from a JSON document. Keys missing from the document keep their defaults,
//! and timeouts are expressed in whole seconds.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/4.0 (compatible; MSIE 6.0; Windows NT 5.1)";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(rename = "connect_timeout_secs", with = "seconds")]
    pub connect_timeout: Duration,
    #[serde(rename = "data_timeout_secs", with = "seconds")]
    pub data_timeout: Duration,
    pub user_agent: String,
    /// Prefix joined verbatim with every request URL.
    pub base_url: String,
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            data_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: String::new(),
            default_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, ClientError> {
        serde_json::from_str(raw).map_err(|e| ClientError::InvalidConfig(e.to_string()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_data_timeout(mut self, timeout: Duration) -> Self {
        self.data_timeout = timeout;
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
