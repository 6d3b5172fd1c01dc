use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::requests_logging::log_requests;
use super::state::{GuardedDisplay, GuardedPanel, ServerState};
use crate::notifications::{NotificationCounts, NotificationRecord};
use crate::panel::{InjectionHandle, ProcessOutcome};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    uptime: String,
    timestamp: String,
}

#[derive(Serialize)]
struct NotificationsResponse {
    counts: NotificationCounts,
    notifications: Vec<NotificationRecord>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn dashboard(State(display): State<GuardedDisplay>) -> Html<String> {
    Html(display.page_html())
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "CRM Notification Panel",
        uptime: format_uptime(state.start_time.elapsed()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn list_notifications(State(panel): State<GuardedPanel>) -> Json<NotificationsResponse> {
    let notifications = panel.snapshot();
    Json(NotificationsResponse {
        counts: crate::notifications::count_records(&notifications),
        notifications,
    })
}

async fn receive_notification(
    State(injection): State<InjectionHandle>,
    Json(payload): Json<Value>,
) -> Response {
    match injection.receive(payload) {
        Ok(()) => Json(json!({
            "status": "success",
            "message": "Notification received",
        }))
        .into_response(),
        Err(err) => {
            warn!("Rejected injected notification: {}", err);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Bad Request",
                    "message": format!("Malformed notification: {}", err),
                })),
            )
                .into_response()
        }
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

async fn process_notification(
    State(panel): State<GuardedPanel>,
    State(display): State<GuardedDisplay>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let outcome = panel.process_notification(id).await;

    if !wants_json(&headers) {
        // The dashboard shows the acknowledgment banner on the next load.
        return Redirect::to("/").into_response();
    }

    // The response body carries the message, no banner for the next page load.
    display.take_acknowledgment();

    let status = match outcome {
        ProcessOutcome::Processed => StatusCode::OK,
        ProcessOutcome::Rejected(_) | ProcessOutcome::Failed => StatusCode::BAD_GATEWAY,
    };
    let body = json!({
        "status": if outcome.is_success() { "success" } else { "error" },
        "message": outcome.message(),
    });
    (status, Json(body)).into_response()
}

pub fn make_app(state: ServerState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/api/notifications", get(list_notifications))
        .route("/receive", post(receive_notification))
        .route("/process/{id}", post(process_notification))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub async fn run_server(state: ServerState, shutdown_token: CancellationToken) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind panel server to {}", addr))?;
    info!("Notification panel listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await
        .context("Panel server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));
        headers.insert(header::ACCEPT, "text/html".parse().unwrap());
        assert!(!wants_json(&headers));
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(wants_json(&headers));
    }
}
