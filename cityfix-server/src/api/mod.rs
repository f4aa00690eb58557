//! HTTP API
//!
//! One module per resource, each exposing `router()`:
//!
//! | Module | Paths | Gate |
//! |--------|-------|------|
//! | [`health`] | `/health` | public |
//! | [`users`] | `/users/*` | token |
//! | [`issues`] | `/issues/*`, `/staff/issues` | token, staff for status changes |
//! | [`admin`] | `/admin/*` | admin |
//! | [`payments`] | `/webhooks/payments` | webhook secret |

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;

pub mod admin;
pub mod health;
pub mod issues;
pub mod middleware;
pub mod payments;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// uuid v4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        // Users API - authentication required
        .merge(users::router())
        // Issues API - authentication required, staff gate on status changes
        .merge(issues::router())
        // Admin API - admin role required
        .merge(admin::router())
        // Payment webhook - shared secret
        .merge(payments::router())
}

/// Build a fully configured application with all middleware
///
/// Used by both the HTTP server and in-process tests. Layers added last run
/// first: CORS, trace, request id, access log, timeout, then authentication.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // Authentication - resolves the caller through the role directory
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .layer(TimeoutLayer::new(Duration::from_millis(
            state.config.request_timeout_ms,
        )))
        // Access log - reads the id set below
        .layer(axum_middleware::from_fn(middleware::access_log))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        // Trace - Request tracing
        .layer(TraceLayer::new_for_http())
        // CORS - answers preflight before authentication
        .layer(CorsLayer::permissive())
}
