//! Stateless HTTP request builder.
//!
//! # Design
//! `SimpleClient` holds only its `ClientConfig`. Each verb method produces an
//! `HttpRequest` value; the caller performs the round-trip and hands the
//! resulting `HttpResponse` to `transform` to get at the body. No method
//! touches the network.

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transformer::ResponseTransformer;

/// Request payload: top-level keys become form fields, query parameters, or
/// the members of a JSON body.
pub type RequestData = Map<String, Value>;

const CONTENT_TYPE: &str = "content-type";
const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Default)]
pub struct SimpleClient {
    config: ClientConfig,
}

impl SimpleClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.config.base_url = base_url.into();
    }

    /// Build a GET request; `data` is appended to the URL as a query string.
    pub fn get(
        &self,
        url: &str,
        data: &RequestData,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Get, url, data, headers)
    }

    /// Build a POST request. `data` is sent as JSON when the merged headers
    /// declare a JSON content type, otherwise form-encoded. PUT and DELETE
    /// pick their body the same way.
    pub fn post(
        &self,
        url: &str,
        data: &RequestData,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Post, url, data, headers)
    }

    pub fn put(
        &self,
        url: &str,
        data: &RequestData,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Put, url, data, headers)
    }

    pub fn delete(
        &self,
        url: &str,
        data: &RequestData,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Delete, url, data, headers)
    }

    /// Wrap a finished round-trip for body conversion.
    pub fn transform(&self, response: HttpResponse) -> ResponseTransformer {
        ResponseTransformer::new(response)
    }

    fn build(
        &self,
        method: HttpMethod,
        url: &str,
        data: &RequestData,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ClientError> {
        let mut full_url = self.full_url(url)?;
        let mut headers = self.merge_headers(headers);

        let body = match method {
            _ if data.is_empty() => None,
            HttpMethod::Get => {
                let separator = if full_url.contains('?') { '&' } else { '?' };
                full_url.push(separator);
                full_url.push_str(&form_encode(data));
                None
            }
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete if is_json(&headers) => {
                let body = serde_json::to_string(data).map_err(|e| ClientError::Serialization(e.to_string()))?;
                Some(body)
            }
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete => {
                set_header(&mut headers, CONTENT_TYPE, FORM_CONTENT_TYPE, false);
                Some(form_encode(data))
            }
        };

        Ok(HttpRequest {
            method,
            url: full_url,
            headers,
            body,
            connect_timeout: self.config.connect_timeout,
            data_timeout: self.config.data_timeout,
            follow_redirects: true,
        })
    }

    fn full_url(&self, url: &str) -> Result<String, ClientError> {
        let full = format!("{}{}", self.config.base_url, url);
        if full.trim().is_empty() {
            return Err(ClientError::MissingUrl);
        }
        Ok(full)
    }

    /// Default headers, then `user-agent`, then per-request headers. Later
    /// entries replace earlier ones with the same name, ignoring case.
    fn merge_headers(&self, extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        for (name, value) in &self.config.default_headers {
            set_header(&mut headers, name, value, true);
        }
        set_header(&mut headers, "user-agent", &self.config.user_agent, false);
        for (name, value) in extra {
            set_header(&mut headers, name, value, true);
        }
        headers
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str, replace: bool) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(slot) if replace => slot.1 = value.to_string(),
        Some(_) => {}
        None => headers.push((name.to_string(), value.to_string())),
    }
}

fn is_json(headers: &[(String, String)]) -> bool {
    headers.iter().any(|(k, v)| {
        k.eq_ignore_ascii_case(CONTENT_TYPE) && v.to_ascii_lowercase().starts_with(JSON_CONTENT_TYPE)
    })
}

/// Form-encode the top-level members of `data`. Strings go in raw, nulls
/// become empty, and everything else is written as compact JSON.
fn form_encode(data: &RequestData) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in data {
        match value {
            Value::String(s) => serializer.append_pair(key, s),
            Value::Null => serializer.append_pair(key, ""),
            other => serializer.append_pair(key, &other.to_string()),
        };
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client() -> SimpleClient {
        SimpleClient::new(ClientConfig::default().with_base_url("http://localhost:3000"))
    }

    fn data(value: Value) -> RequestData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn get_without_data_produces_plain_request() {
        let req = client().get("/posts", &RequestData::new(), &[]).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/posts");
        assert!(req.body.is_none());
        assert!(req.follow_redirects);
        assert_eq!(req.connect_timeout, ClientConfig::default().connect_timeout);
    }

    #[test]
    fn get_appends_query_string() {
        let req = client()
            .get("/posts?sort=desc", &data(json!({"page": 2, "q": "a b"})), &[])
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/posts?sort=desc&page=2&q=a+b");
        assert!(req.body.is_none());
    }

    #[test]
    fn post_form_encodes_by_default() {
        let req = client()
            .post("/posts", &data(json!({"title": "Hi", "draft": true})), &[])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some("title=Hi&draft=true"));
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn post_sends_json_when_declared() {
        let req = client()
            .post(
                "/posts",
                &data(json!({"title": "Hi", "tags": ["a"]})),
                &[("Content-Type", "application/json")],
            )
            .unwrap();
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"title": "Hi", "tags": ["a"]}));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn put_and_delete_form_encode() {
        let payload = data(json!({"title": "New"}));
        let put = client().put("/posts/1", &payload, &[]).unwrap();
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(put.body.as_deref(), Some("title=New"));

        let delete = client().delete("/posts/1", &RequestData::new(), &[]).unwrap();
        assert_eq!(delete.method, HttpMethod::Delete);
        assert!(delete.body.is_none());
    }

    #[test]
    fn put_and_delete_send_json_when_declared() {
        let payload = data(json!({"title": "New", "tags": ["a"]}));
        let headers = [("Content-Type", "application/json; charset=utf-8")];

        for req in [
            client().put("/posts/1", &payload, &headers).unwrap(),
            client().delete("/posts/1", &payload, &headers).unwrap(),
        ] {
            let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(body, json!({"title": "New", "tags": ["a"]}));
            assert_eq!(req.header("content-type"), Some("application/json; charset=utf-8"));
        }
    }

    #[test]
    fn json_default_header_applies_to_put() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:3000")
            .with_default_header("Content-Type", "application/json");
        let req = SimpleClient::new(config)
            .put("/posts/1", &data(json!({"title": "New"})), &[])
            .unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"title":"New"}"#));
        assert_eq!(req.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("content-type")).count(), 1);
    }

    #[test]
    fn headers_merge_case_insensitively() {
        let config = ClientConfig::default()
            .with_default_header("Accept", "text/html")
            .with_default_header("X-Trace", "1");
        let req = SimpleClient::new(config)
            .get("http://example.com", &RequestData::new(), &[("accept", "application/json")])
            .unwrap();
        assert_eq!(
            req.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
                ("user-agent".to_string(), crate::config::DEFAULT_USER_AGENT.to_string()),
            ]
        );
    }

    #[test]
    fn request_user_agent_header_overrides_config() {
        let req = client()
            .get("/", &RequestData::new(), &[("User-Agent", "custom")])
            .unwrap();
        assert_eq!(req.header("user-agent"), Some("custom"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = SimpleClient::default().get("", &RequestData::new(), &[]).unwrap_err();
        assert!(matches!(err, ClientError::MissingUrl));
    }

    #[test]
    fn null_values_encode_as_empty() {
        let req = client().put("/posts/1", &data(json!({"title": null})), &[]).unwrap();
        assert_eq!(req.body.as_deref(), Some("title="));
    }

    #[test]
    fn transform_wraps_response() {
        let t = client().transform(HttpResponse::new(200, r#"{"id":1}"#));
        assert_eq!(t.to_json(), Some(json!({"id": 1})));
    }
}
