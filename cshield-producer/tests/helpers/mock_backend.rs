//! In-process mock of the CinemaShield backend
//!
//! Binds an axum router to an ephemeral localhost port so the real
//! reqwest-based client can be exercised end to end.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use cshield_common::ClientConfig;

/// What the backend received on `/api/upload`
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub file_name: Option<String>,
    pub theatre_id: Option<String>,
    pub bytes: usize,
}

#[derive(Default)]
struct BackendState {
    /// Raw SSE `data:` payloads per job, sent in order
    scripts: HashMap<String, Vec<String>>,
    history: Value,
    audit: Value,
    reject_upload: Option<String>,
    fail_lists: bool,
    uploads: Vec<ReceivedUpload>,
}

type Shared = Arc<Mutex<BackendState>>;

pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            history: json!([]),
            audit: json!([]),
            ..Default::default()
        }));

        let router = Router::new()
            .route("/api/upload", post(upload))
            .route("/api/process/:movie_id", get(process))
            .route("/api/history", get(history))
            .route("/api/audit-log", get(audit_log))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock backend");
        });

        Self { addr, state, handle }
    }

    /// Client configuration pointing at this backend
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            server_url: format!("http://{}", self.addr),
            request_timeout_secs: 5,
            ..ClientConfig::default()
        }
    }

    /// Script the progress stream for `job_id` with raw `data:` payloads
    pub fn script(&self, job_id: &str, payloads: &[Value]) {
        let raw = payloads.iter().map(|p| p.to_string()).collect();
        self.script_raw(job_id, raw);
    }

    pub fn script_raw(&self, job_id: &str, payloads: Vec<String>) {
        self.state.lock().unwrap().scripts.insert(job_id.to_string(), payloads);
    }

    pub fn set_history(&self, history: Value) {
        self.state.lock().unwrap().history = history;
    }

    pub fn set_audit(&self, audit: Value) {
        self.state.lock().unwrap().audit = audit;
    }

    pub fn reject_uploads(&self, message: &str) {
        self.state.lock().unwrap().reject_upload = Some(message.to_string());
    }

    pub fn fail_lists(&self) {
        self.state.lock().unwrap().fail_lists = true;
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.lock().unwrap().uploads.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn upload(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut received = ReceivedUpload::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("file") => {
                received.file_name = field.file_name().map(str::to_string);
                received.bytes = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            Some("theatre_id") => received.theatre_id = field.text().await.ok(),
            _ => {}
        }
    }

    let mut state = state.lock().unwrap();
    state.uploads.push(received.clone());
    if let Some(message) = state.reject_upload.clone() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response();
    }
    Json(json!({
        "movie_id": "movie-001",
        "filename": received.file_name,
    }))
    .into_response()
}

async fn process(State(state): State<Shared>, Path(movie_id): Path<String>) -> Response {
    let script = state.lock().unwrap().scripts.get(&movie_id).cloned();
    match script {
        Some(payloads) => {
            let events = futures::stream::iter(
                payloads
                    .into_iter()
                    .map(|data| Ok::<_, Infallible>(Event::default().data(data))),
            );
            Sse::new(events).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Movie not found" }))).into_response(),
    }
}

async fn history(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    if state.fail_lists {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))).into_response();
    }
    Json(state.history.clone()).into_response()
}

async fn audit_log(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    if state.fail_lists {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))).into_response();
    }
    Json(state.audit.clone()).into_response()
}
