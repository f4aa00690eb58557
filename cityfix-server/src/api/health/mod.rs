//! Liveness and store check
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |
//!
//! Answers 503 when the database cannot be read.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    status: &'static str,
    version: &'static str,
    environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    identities: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<u64>,
}

async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthReport>) {
    let counts = state.storage.counts();
    let (code, status) = match &counts {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not read the store");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };
    let (identities, issues) = match counts {
        Ok((identities, issues)) => (Some(identities), Some(issues)),
        Err(_) => (None, None),
    };

    let report = HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        identities,
        issues,
    };
    (code, Json(report))
}
