//! Payment Webhook Module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /webhooks/payments | POST | `X-Webhook-Secret` |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Webhook router - public for `require_auth`, checked against the shared secret
pub fn router() -> Router<ServerState> {
    Router::new().route("/webhooks/payments", post(handler::confirm))
}
