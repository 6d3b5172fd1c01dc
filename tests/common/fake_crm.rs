//! In-process stand-in for the CRM notification service.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TEST_TOKEN: &str = "test-bearer-token";

#[derive(Default)]
struct FakeCrmState {
    notifications: Vec<Value>,
    fail_fetch: bool,
    fetch_count: usize,
    processed_ids: Vec<i64>,
}

type SharedState = Arc<Mutex<FakeCrmState>>;

/// Fake CRM server on a random port.
///
/// When dropped, the server shuts down.
pub struct FakeCrmServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,
    state: SharedState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TEST_TOKEN))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized", "message": "Invalid or missing Bearer token"})),
    )
        .into_response()
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "CRM Notification Service"}))
}

async fn get_notifications(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    state.fetch_count += 1;
    if state.fail_fetch {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(Value::Array(state.notifications.clone())).into_response()
}

async fn process(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let Some(notification) = state
        .notifications
        .iter_mut()
        .find(|n| n["id"].as_i64() == Some(id))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    notification["processed"] = json!(true);
    state.processed_ids.push(id);
    Json(json!({"status": "success", "message": "Notification marked as processed"}))
        .into_response()
}

impl FakeCrmServer {
    pub async fn spawn(notifications: Vec<Value>) -> Self {
        let state: SharedState = Arc::new(Mutex::new(FakeCrmState {
            notifications,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/health", get(health))
            .route("/notifications", get(get_notifications))
            .route("/notifications/{id}/process", post(process))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Fake CRM server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn set_notifications(&self, notifications: Vec<Value>) {
        self.state.lock().unwrap().notifications = notifications;
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.state.lock().unwrap().fail_fetch = fail;
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetch_count
    }

    pub fn processed_ids(&self) -> Vec<i64> {
        self.state.lock().unwrap().processed_ids.clone()
    }
}
