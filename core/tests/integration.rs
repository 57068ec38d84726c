//! End-to-end checks against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, executes requests built by the
//! core over real HTTP with ureq, then runs every transformer conversion on
//! the responses the server actually produced.

use std::time::Instant;

use simplecurl_core::{
    ClientConfig, EntityType, HttpMethod, HttpRequest, HttpResponse, Outcome, Projection,
    RelationTree, RequestData, SimpleClient, TransportMeta, TypeRegistry,
};

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Execute an `HttpRequest` using ureq and describe the outcome as an
/// `HttpResponse`.
///
/// Status codes are returned as data rather than `Err`, and transport
/// failures become `HttpResponse::transport_error`, so the core sees exactly
/// what a host would hand it. DELETE requests are sent without a body.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(req.data_timeout))
        .build()
        .new_agent();

    let started = Instant::now();
    let result = match (req.method, req.body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&req.url), &req.headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&req.url), &req.headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&req.url), &req.headers).send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(&req.url), &req.headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(&req.url), &req.headers).send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(&req.url), &req.headers).send_empty(),
    };

    let mut response = match result {
        Ok(response) => response,
        Err(e) => return HttpResponse::transport_error(e.to_string()),
    };

    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let content_type = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.clone());
    let body = response.body_mut().read_to_string().ok();

    HttpResponse {
        status,
        headers,
        body,
        meta: TransportMeta {
            content_type,
            effective_url: Some(req.url),
            total_time: Some(started.elapsed()),
            request_size: None,
            error: None,
        },
    }
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client(base_url: &str) -> SimpleClient {
    SimpleClient::new(ClientConfig::default().with_base_url(base_url))
}

fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(EntityType::new("Post", ["id", "title", "body"]))
        .with(EntityType::new("User", ["id", "name"]))
        .with(EntityType::new("Profile", ["bio", "website"]))
        .with(EntityType::new("Comment", ["id", "text"]))
}

fn post_relations() -> RelationTree {
    RelationTree::new()
        .nested("author", "User", RelationTree::new().leaf("profile", "Profile"))
        .nested("comments", "Comment", RelationTree::new().leaf("author", "User"))
}

#[test]
fn single_post_projects_with_nested_relations() {
    let client = client(&start_server());

    let req = client.get("/posts/3", &RequestData::new(), &[]).unwrap();
    let response = execute(req);
    assert_eq!(response.outcome(), Outcome::Success);
    assert_eq!(response.meta.content_type.as_deref(), Some("application/json"));

    let post = client
        .transform(response)
        .to_entity(&registry(), "Post", &[], &post_relations())
        .unwrap()
        .and_then(Projection::into_one)
        .expect("post entity");

    assert_eq!(post.get("id"), Some(&serde_json::json!(3)));
    assert_eq!(post.get("body"), Some(&serde_json::Value::Null));
    assert_eq!(post.get("created_at"), Some(&serde_json::json!(mock_server::SEEDED_AT)));
    assert!(!post.has_field("author"));

    let author = post.relation("author").and_then(Projection::as_one).unwrap();
    assert_eq!(author.get("name"), Some(&serde_json::json!("Alice")));
    assert!(!author.has_field("email"));
    let profile = author.relation("profile").and_then(Projection::as_one).unwrap();
    assert_eq!(profile.get("website"), Some(&serde_json::json!("https://alice.example.com")));

    let comments = post.relation("comments").and_then(Projection::as_many).unwrap();
    assert_eq!(comments.len(), 2);
    let commenter = comments[1].relation("author").and_then(Projection::as_one).unwrap();
    assert_eq!(commenter.get("name"), Some(&serde_json::json!("Bob")));
}

#[test]
fn post_list_becomes_collection_and_entities() {
    let client = client(&start_server());

    let req = client.get("/posts", &RequestData::new(), &[]).unwrap();
    let transformer = client.transform(execute(req));

    let members = transformer.to_collection().unwrap();
    assert_eq!(members.len(), 3);

    let posts = transformer.to_entities(&registry(), "Post", &[]).unwrap().unwrap();
    let titles: Vec<&serde_json::Value> = posts.iter().map(|p| p.get("title").unwrap()).collect();
    assert_eq!(titles, [&serde_json::json!("Post 1"), &serde_json::json!("Post 2"), &serde_json::json!("Post 3")]);

    let mapping = transformer.to_mapping().unwrap();
    assert_eq!(mapping.len(), 3);
    assert!(mapping.contains_key("0"));
}

#[test]
fn paged_listing_becomes_paginated_view() {
    let client = client(&start_server());

    let mut query = RequestData::new();
    query.insert("page".to_string(), serde_json::json!(2));
    query.insert("per_page".to_string(), serde_json::json!(2));
    let req = client.get("/posts/paged", &query, &[]).unwrap();
    let page = client.transform(execute(req)).to_paginated(2).unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.per_page, 2);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.last_page, 2);
    assert_eq!(page.len(), 1);
    assert!(!page.has_more_pages());
}

#[test]
fn form_and_json_posts_round_trip() {
    let client = client(&start_server());

    let mut data = RequestData::new();
    data.insert("title".to_string(), serde_json::json!("Form post"));
    let req = client.post("/posts", &data, &[]).unwrap();
    let response = execute(req);
    assert_eq!(response.status, 201);
    assert_eq!(response.outcome(), Outcome::Failed);
    let created = client
        .transform(response)
        .to_entity(&registry(), "Post", &[], &RelationTree::new())
        .unwrap()
        .and_then(Projection::into_one)
        .unwrap();
    assert_eq!(created.get("title"), Some(&serde_json::json!("Form post")));

    data.insert("body".to_string(), serde_json::json!("From JSON"));
    let req = client
        .post("/posts", &data, &[("Content-Type", "application/json")])
        .unwrap();
    let created = client
        .transform(execute(req))
        .to_entity(&registry(), "Post", &[], &RelationTree::new())
        .unwrap()
        .and_then(Projection::into_one)
        .unwrap();
    assert_eq!(created.get("body"), Some(&serde_json::json!("From JSON")));
    assert_eq!(created.get("id"), Some(&serde_json::json!(5)));
}

#[test]
fn non_json_and_missing_bodies_degrade_to_none() {
    let client = client(&start_server());

    let req = client.get("/broken", &RequestData::new(), &[]).unwrap();
    let transformer = client.transform(execute(req));
    assert!(transformer.to_json().is_none());
    assert!(transformer
        .to_entity(&registry(), "Post", &[], &RelationTree::new())
        .unwrap()
        .is_none());

    let req = client.get("/posts/99", &RequestData::new(), &[]).unwrap();
    let response = execute(req);
    assert_eq!(response.status, 404);
    assert!(client.transform(response).to_json().is_none());
}

#[test]
fn delete_then_fetch_reports_not_found() {
    let client = client(&start_server());

    let req = client.delete("/posts/1", &RequestData::new(), &[]).unwrap();
    assert_eq!(execute(req).status, 204);

    let req = client.get("/posts/1", &RequestData::new(), &[]).unwrap();
    assert_eq!(execute(req).outcome(), Outcome::Failed);
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client(&format!("http://127.0.0.1:{port}"));

    let req = client.get("/posts", &RequestData::new(), &[]).unwrap();
    let response = execute(req);
    assert_eq!(response.outcome(), Outcome::Error);
    assert!(response.meta.error.is_some());
    assert!(client.transform(response).to_collection().is_none());
}
