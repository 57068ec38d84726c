use std::sync::Arc;

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const SEEDED_AT: &str = "2024-01-01T00:00:00Z";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub bio: String,
    pub website: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub profile: Profile,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub text: String,
    pub author: Author,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub author: Author,
    pub comments: Vec<Comment>,
}

#[derive(Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub data: Vec<T>,
}

#[derive(Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub type Db = Arc<RwLock<Vec<Post>>>;

pub fn alice() -> Author {
    Author {
        id: 5,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        profile: Profile {
            bio: "Writes about Rust".to_string(),
            website: Some("https://alice.example.com".to_string()),
        },
    }
}

pub fn bob() -> Author {
    Author {
        id: 6,
        name: "Bob".to_string(),
        email: "bob@example.com".to_string(),
        profile: Profile {
            bio: "Reads everything".to_string(),
            website: None,
        },
    }
}

/// Three posts by Alice. Post `n` carries `n - 1` comments by Bob, so the
/// first post has none.
pub fn seed() -> Vec<Post> {
    (1..=3)
        .map(|id| Post {
            id,
            title: format!("Post {id}"),
            body: (id != 3).then(|| format!("Body of post {id}")),
            created_at: SEEDED_AT.to_string(),
            updated_at: SEEDED_AT.to_string(),
            author: alice(),
            comments: (1..id)
                .map(|n| Comment {
                    id: id * 100 + n,
                    text: format!("Comment {n} on post {id}"),
                    author: bob(),
                })
                .collect(),
        })
        .collect()
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/paged", get(page_posts))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/broken", get(broken))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server ready");
    }
    axum::serve(listener, app()).await
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    Json(db.read().await.clone())
}

async fn page_posts(State(db): State<Db>, Query(params): Query<PageParams>) -> Json<Page<Post>> {
    let posts = db.read().await;
    let per_page = params.per_page.unwrap_or(2).max(1);
    let current_page = params.page.unwrap_or(1).max(1);
    let start = (current_page - 1)
        .checked_mul(per_page)
        .and_then(|start| usize::try_from(start).ok())
        .unwrap_or(usize::MAX);
    let take = usize::try_from(per_page).unwrap_or(usize::MAX);
    let data = posts.iter().skip(start).take(take).cloned().collect();
    Json(Page {
        total: posts.len() as u64,
        per_page,
        current_page,
        data,
    })
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Post>, StatusCode> {
    let posts = db.read().await;
    posts.iter().find(|p| p.id == id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Accepts either a JSON or a form-encoded body, picked by content type.
async fn create_post(
    State(db): State<Db>,
    request: Request,
) -> Result<(StatusCode, Json<Post>), StatusCode> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    let input = if is_json {
        Json::<NewPost>::from_request(request, &())
            .await
            .map(|Json(input)| input)
            .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?
    } else {
        Form::<NewPost>::from_request(request, &())
            .await
            .map(|Form(input)| input)
            .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?
    };

    let mut posts = db.write().await;
    let post = Post {
        id: posts.iter().map(|p| p.id).max().unwrap_or(0) + 1,
        title: input.title,
        body: input.body,
        created_at: SEEDED_AT.to_string(),
        updated_at: SEEDED_AT.to_string(),
        author: alice(),
        comments: Vec::new(),
    };
    tracing::debug!(id = post.id, "created post");
    posts.push(post.clone());
    Ok((StatusCode::CREATED, Json(post)))
}

async fn delete_post(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut posts = db.write().await;
    match posts.iter().position(|p| p.id == id) {
        Some(idx) => {
            posts.remove(idx);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::OK, "<html><body>maintenance</body></html>")
}
