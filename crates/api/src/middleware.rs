use std::time::Instant;

use axum::{middleware::Next, response::Response};
use tracing::{error, info, warn};

/// Log every request once it has a status.
///
/// 5xx at `error`, 4xx at `warn`, 3xx not at all, everything else at `info`.
pub async fn log_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        error!(module = "http", %method, %path, status = status.as_u16(), elapsed_ms, "request failed");
    } else if status.is_client_error() {
        warn!(module = "http", %method, %path, status = status.as_u16(), elapsed_ms, "request rejected");
    } else if !status.is_redirection() {
        info!(module = "http", %method, %path, status = status.as_u16(), elapsed_ms, "request completed");
    }

    response
}
