//! Request logging middleware

use super::state::ServerState;
use axum::extract::State;
use axum::{body::Body, http::Request, middleware::Next, response::IntoResponse};
use std::time::Instant;
use tracing::info;

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let level = state.config.requests_logging_level.clone();

    let start = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", method, uri);
    }

    if level >= RequestsLoggingLevel::Headers {
        info!("  Req Headers:");
        for (name, value) in request.headers().iter() {
            if *name == axum::http::header::AUTHORIZATION {
                info!("    {:?}: <redacted>", name);
            } else {
                info!("    {:?}: {:?}", name, value);
            }
        }
    }

    let response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        info!("  Resp Headers:");
        for (name, value) in response.headers().iter() {
            info!("    {:?}: {:?}", name, value);
        }
    }

    if level > RequestsLoggingLevel::None {
        info!(
            "<<< {} {} {} ({}ms)",
            response.status().as_u16(),
            method,
            uri,
            start.elapsed().as_millis()
        );
    }

    response
}
