//! In-process mock of the theatre-facing backend endpoints

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use cshield_common::ClientConfig;

pub const VALID_KEY: &str = "KEY-VALID";
pub const TOKEN: &str = "tok-abcdef0123456789";

#[derive(Default)]
struct BackendState {
    token_expired: AtomicBool,
    ready: AtomicBool,
    expiry_checks: AtomicUsize,
}

pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        state.ready.store(true, Ordering::SeqCst);

        let router = Router::new()
            .route("/api/authenticate", post(authenticate))
            .route("/api/check-expiry/:token", get(check_expiry))
            .route("/api/status", get(status))
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

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            server_url: format!("http://{}", self.addr),
            request_timeout_secs: 5,
            ..ClientConfig::default()
        };
        config.playback.expiry_check_interval_secs = 1;
        config.playback.countdown_interval_ms = 100;
        config
    }

    pub fn expire_token(&self) {
        self.state.token_expired.store(true, Ordering::SeqCst);
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.ready.store(ready, Ordering::SeqCst);
    }

    pub fn expiry_checks(&self) -> usize {
        self.state.expiry_checks.load(Ordering::SeqCst)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn authenticate(Json(body): Json<Value>) -> Response {
    if body.get("key").and_then(Value::as_str) != Some(VALID_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid access key" })),
        )
            .into_response();
    }
    let window_end = Utc::now() + Duration::hours(3);
    Json(json!({
        "token": TOKEN,
        "movie_info": {
            "shards": 4,
            "theatre_id": "THEATRE_001",
            "time_remaining": "180 min",
            "window_end": window_end.to_rfc3339(),
        }
    }))
    .into_response()
}

async fn check_expiry(State(state): State<Arc<BackendState>>, Path(token): Path<String>) -> Response {
    state.expiry_checks.fetch_add(1, Ordering::SeqCst);
    if token != TOKEN {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Unknown token" }))).into_response();
    }
    if state.token_expired.load(Ordering::SeqCst) {
        Json(json!({ "expired": true, "reason": "Playback window ended" })).into_response()
    } else {
        Json(json!({ "expired": false, "remaining_seconds": 10800 })).into_response()
    }
}

async fn status(State(state): State<Arc<BackendState>>) -> Response {
    if !state.ready.load(Ordering::SeqCst) {
        return Json(json!({ "ready": false })).into_response();
    }
    let now = Utc::now();
    Json(json!({
        "ready": true,
        "playback_active": true,
        "playback_start": now.to_rfc3339(),
        "playback_end": (now + Duration::hours(3)).to_rfc3339(),
        "shards": 4,
        "theatre_id": "THEATRE_001",
    }))
    .into_response()
}
