//! Access log on target `http_access`
//!
//! Runs inside `SetRequestIdLayer`, so every line carries the id that is
//! echoed back in the `x-request-id` response header.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::request_id::RequestId;

pub async fn access_log(req: Request, next: Next) -> Response {
    let started = Instant::now();

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_owned();
    let method = req.method().clone();
    // Route template keeps issue ids out of the access log
    let route = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match status {
        500.. => tracing::error!(
            target: "http_access",
            %request_id, %method, %route, status, elapsed_ms,
            "request failed"
        ),
        401 | 403 => tracing::warn!(
            target: "http_access",
            %request_id, %method, %route, status, elapsed_ms,
            "request refused"
        ),
        _ => tracing::info!(
            target: "http_access",
            %request_id, %method, %route, status, elapsed_ms,
            "request served"
        ),
    }

    response
}
