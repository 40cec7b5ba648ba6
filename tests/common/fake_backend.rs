//! Fake generative backend for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `POST /generate`: the configured plan stream, as `text/event-stream`
//! - `GET /csv/{id}/suggest`: the configured suggestion stream
//! - `GET /csv/{id}`: `{"csvId", "data"}` for a registered table
//! - `GET /csv/{id}/schema`: `{"csvId", "schema"}` for a registered table
//!
//! Streams are sent as many small body chunks so the client sees lines split
//! across reads. Every request body and query is recorded for assertions.
//!
//! # Example
//!
//! ```rust,no_run
//! let api = FakeBackend::start().await.unwrap();
//! api.set_plan_stream(plan_stream(SALES_PLAN, 5)).await;
//! let backend = HttpBackend::new(api.base_url(), Duration::from_secs(1));
//! ```

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// State shared between the router and test code.
struct BackendState {
    plan_stream: String,
    suggest_stream: String,
    tables: HashMap<String, serde_json::Value>,
    schemas: HashMap<String, serde_json::Value>,
    /// Body chunk size for event streams, in bytes.
    chunk_size: usize,
    /// When set, every route answers with this status and a short body.
    failure: Option<StatusCode>,
    /// When set, every route answers 200 with an empty body.
    empty_bodies: bool,
    plan_requests: Vec<serde_json::Value>,
    suggest_queries: Vec<HashMap<String, String>>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            plan_stream: String::new(),
            suggest_stream: String::new(),
            tables: HashMap::new(),
            schemas: HashMap::new(),
            chunk_size: 7,
            failure: None,
            empty_bodies: false,
            plan_requests: Vec::new(),
            suggest_queries: Vec::new(),
        }
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// Handle to the running fake backend.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
}

impl FakeBackend {
    /// Start the fake backend on a random port. Returns once the server is
    /// listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::new(Mutex::new(BackendState::default()));

        let app = Router::new()
            .route("/generate", post(generate))
            .route("/csv/{id}", get(table))
            .route("/csv/{id}/schema", get(schema))
            .route("/csv/{id}/suggest", get(suggest))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn set_plan_stream(&self, wire: impl Into<String>) {
        self.state.lock().await.plan_stream = wire.into();
    }

    pub async fn set_suggest_stream(&self, wire: impl Into<String>) {
        self.state.lock().await.suggest_stream = wire.into();
    }

    pub async fn set_chunk_size(&self, bytes: usize) {
        self.state.lock().await.chunk_size = bytes.max(1);
    }

    /// Register a table under `id`, with `data` as the record array and
    /// `schema` as the advisory schema object.
    pub async fn add_table(&self, id: &str, data: serde_json::Value, schema: serde_json::Value) {
        let mut state = self.state.lock().await;
        state.tables.insert(id.to_string(), data);
        state.schemas.insert(id.to_string(), schema);
    }

    pub async fn fail_with(&self, status: StatusCode) {
        self.state.lock().await.failure = Some(status);
    }

    pub async fn send_empty_bodies(&self) {
        self.state.lock().await.empty_bodies = true;
    }

    /// JSON bodies received by `POST /generate`, in arrival order.
    pub async fn plan_requests(&self) -> Vec<serde_json::Value> {
        self.state.lock().await.plan_requests.clone()
    }

    /// Query strings received by the suggestion route, decoded.
    pub async fn suggest_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().await.suggest_queries.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn generate(State(state): State<Shared>, Json(body): Json<serde_json::Value>) -> Response {
    let mut state = state.lock().await;
    state.plan_requests.push(body);
    if let Some(resp) = short_circuit(&state) {
        return resp;
    }
    event_stream(&state.plan_stream, state.chunk_size)
}

async fn suggest(
    Path(_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    State(state): State<Shared>,
) -> Response {
    let mut state = state.lock().await;
    state.suggest_queries.push(query);
    if let Some(resp) = short_circuit(&state) {
        return resp;
    }
    event_stream(&state.suggest_stream, state.chunk_size)
}

async fn table(Path(id): Path<String>, State(state): State<Shared>) -> Response {
    let state = state.lock().await;
    if let Some(resp) = short_circuit(&state) {
        return resp;
    }
    match state.tables.get(&id) {
        Some(data) => Json(serde_json::json!({ "csvId": id, "data": data })).into_response(),
        None => (StatusCode::NOT_FOUND, "unknown csv id").into_response(),
    }
}

async fn schema(Path(id): Path<String>, State(state): State<Shared>) -> Response {
    let state = state.lock().await;
    if let Some(resp) = short_circuit(&state) {
        return resp;
    }
    match state.schemas.get(&id) {
        Some(schema) => Json(serde_json::json!({ "csvId": id, "schema": schema })).into_response(),
        None => (StatusCode::NOT_FOUND, "unknown csv id").into_response(),
    }
}

fn short_circuit(state: &BackendState) -> Option<Response> {
    if let Some(status) = state.failure {
        return Some((status, "backend failure").into_response());
    }
    if state.empty_bodies {
        return Some(StatusCode::OK.into_response());
    }
    None
}

fn event_stream(wire: &str, chunk_size: usize) -> Response {
    let chunks: Vec<Result<Bytes, Infallible>> = wire
        .as_bytes()
        .chunks(chunk_size)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(futures::stream::iter(chunks)),
    )
        .into_response()
}
