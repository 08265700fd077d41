//! In-process stand-in for the posts backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    routing::{get, patch, post},
    Json, Router,
};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct Backend {
    pub posts: Vec<Value>,
    pub threads: HashMap<(String, &'static str), Vec<Value>>,
    /// Sent on the first stream connection, which then closes
    pub first_stream_events: Vec<Value>,
    pub requests: Vec<Recorded>,
    pub stream_connections: u64,
    next_id: u64,
}

impl Backend {
    pub fn with_post(mut self, post: Value) -> Self {
        self.posts.push(post);
        self
    }

    pub fn with_entry(mut self, post_id: &str, channel: &'static str, entry: Value) -> Self {
        self.threads
            .entry((post_id.to_string(), channel))
            .or_default()
            .push(entry);
        self
    }

    pub fn with_stream_event(mut self, event: Value) -> Self {
        self.first_stream_events.push(event);
        self
    }

    fn record(&mut self, method: &'static str, path: String, body: Option<Value>) {
        self.requests.push(Recorded { method, path, body });
    }
}

pub type Shared = Arc<Mutex<Backend>>;

pub struct MockBackend {
    pub url: String,
    pub state: Shared,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self::start_with(Backend::default()).await
    }

    pub async fn start_with(backend: Backend) -> Self {
        let state = Arc::new(Mutex::new(backend));
        let app = Router::new()
            .route("/api/posts", get(list_posts).post(create_post))
            .route("/api/posts/:post_id/comments", get(list_comments).post(create_comment))
            .route(
                "/api/posts/:post_id/comments/:id",
                patch(update_comment).delete(delete_comment),
            )
            .route("/api/posts/:post_id/chat", get(list_chat).post(create_chat))
            .route("/api/posts/:post_id/chat/:id", patch(update_chat).delete(delete_chat))
            .route("/api/posts/:post_id/typing", post(typing))
            .route("/api/mentions", get(mentions))
            .route("/api/stream", get(event_stream))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Recorded requests against one path, ignoring typing and lookups
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn stream_connections(&self) -> u64 {
        self.state.lock().unwrap().stream_connections
    }

    pub fn add_entry(&self, post_id: &str, channel: &'static str, entry: Value) {
        self.state
            .lock()
            .unwrap()
            .threads
            .entry((post_id.to_string(), channel))
            .or_default()
            .push(entry);
    }
}

fn id_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn list_posts(State(state): State<Shared>) -> Json<Value> {
    let mut backend = state.lock().unwrap();
    backend.record("GET", "/api/posts".to_string(), None);
    Json(json!({ "items": backend.posts.clone() }))
}

async fn create_post(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    backend.record("POST", "/api/posts".to_string(), Some(body));
    backend.next_id += 1;
    (
        StatusCode::CREATED,
        Json(json!({ "id": backend.next_id, "status": "queued" })),
    )
}

fn list_thread(state: &Shared, post_id: String, channel: &'static str) -> Json<Value> {
    let mut backend = state.lock().unwrap();
    backend.record("GET", format!("/api/posts/{}/{}", post_id, channel), None);
    let entries = backend
        .threads
        .get(&(post_id, channel))
        .cloned()
        .unwrap_or_default();
    Json(Value::Array(entries))
}

fn create_entry(
    state: &Shared,
    post_id: String,
    channel: &'static str,
    body: Value,
) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    backend.record(
        "POST",
        format!("/api/posts/{}/{}", post_id, channel),
        Some(body.clone()),
    );
    backend.next_id += 1;

    let mut entry = body;
    entry["id"] = json!(backend.next_id);
    entry["post_id"] = json!(post_id);
    entry["created_at"] = json!("2026-01-01T00:00:00Z");
    backend
        .threads
        .entry((post_id, channel))
        .or_default()
        .push(entry.clone());
    (StatusCode::CREATED, Json(entry))
}

fn update_entry(
    state: &Shared,
    post_id: String,
    channel: &'static str,
    id: String,
    body: Value,
) -> StatusCode {
    let mut backend = state.lock().unwrap();
    backend.record(
        "PATCH",
        format!("/api/posts/{}/{}/{}", post_id, channel, id),
        Some(body.clone()),
    );

    let entries = backend.threads.entry((post_id, channel)).or_default();
    match entries.iter_mut().find(|e| id_of(&e["id"]) == id) {
        Some(entry) => {
            if let (Some(entry), Some(patch)) = (entry.as_object_mut(), body.as_object()) {
                for (k, v) in patch {
                    entry.insert(k.clone(), v.clone());
                }
            }
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

fn delete_entry(state: &Shared, post_id: String, channel: &'static str, id: String) -> StatusCode {
    let mut backend = state.lock().unwrap();
    backend.record(
        "DELETE",
        format!("/api/posts/{}/{}/{}", post_id, channel, id),
        None,
    );
    let entries = backend.threads.entry((post_id, channel)).or_default();
    let before = entries.len();
    entries.retain(|e| id_of(&e["id"]) != id);
    if entries.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn list_comments(State(state): State<Shared>, Path(post_id): Path<String>) -> Json<Value> {
    list_thread(&state, post_id, "comments")
}

async fn list_chat(State(state): State<Shared>, Path(post_id): Path<String>) -> Json<Value> {
    list_thread(&state, post_id, "chat")
}

async fn create_comment(
    State(state): State<Shared>,
    Path(post_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    create_entry(&state, post_id, "comments", body)
}

async fn create_chat(
    State(state): State<Shared>,
    Path(post_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    create_entry(&state, post_id, "chat", body)
}

async fn update_comment(
    State(state): State<Shared>,
    Path((post_id, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> StatusCode {
    update_entry(&state, post_id, "comments", id, body)
}

async fn update_chat(
    State(state): State<Shared>,
    Path((post_id, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> StatusCode {
    update_entry(&state, post_id, "chat", id, body)
}

async fn delete_comment(
    State(state): State<Shared>,
    Path((post_id, id)): Path<(String, String)>,
) -> StatusCode {
    delete_entry(&state, post_id, "comments", id)
}

async fn delete_chat(
    State(state): State<Shared>,
    Path((post_id, id)): Path<(String, String)>,
) -> StatusCode {
    delete_entry(&state, post_id, "chat", id)
}

async fn typing(
    State(state): State<Shared>,
    Path(post_id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut backend = state.lock().unwrap();
    backend.record("POST", format!("/api/posts/{}/typing", post_id), Some(body));
    StatusCode::NO_CONTENT
}

async fn mentions(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let query = params.get("q").cloned().unwrap_or_default();
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(6);

    let mut backend = state.lock().unwrap();
    backend.record("GET", "/api/mentions".to_string(), Some(json!(params)));

    let items: Vec<Value> = [("@nexus", "Nexus Team"), ("@ada", "Ada"), ("@newsdesk", "Newsdesk")]
        .iter()
        .filter(|(handle, _)| handle.contains(&query))
        .take(limit)
        .map(|(handle, name)| json!({ "handle": handle, "name": name }))
        .collect();
    Json(json!({ "items": items }))
}

async fn event_stream(State(state): State<Shared>) -> Sse<BoxStream<'static, Result<Event, Infallible>>> {
    let events = {
        let mut backend = state.lock().unwrap();
        backend.stream_connections += 1;
        if backend.stream_connections == 1 {
            backend.first_stream_events.clone()
        } else {
            Vec::new()
        }
    };

    let is_first = !events.is_empty();
    let stream = if is_first {
        stream::iter(
            events
                .into_iter()
                .map(|v| Ok(Event::default().data(v.to_string()))),
        )
        .boxed()
    } else {
        stream::pending().boxed()
    };
    Sse::new(stream)
}
