//! Users API Module
//!
//! | Path | Method | Purpose |
//! |------|--------|---------|
//! | /users | POST | register on first login (idempotent) |
//! | /users/me | GET | own identity |
//! | /users/role/{subject_id} | GET | role lookup |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Users router - authentication required
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/users", post(handler::register))
        .route("/users/me", get(handler::me))
        .route("/users/role/{subject_id}", get(handler::role))
}
