//! Admin API Module
//!
//! Every route requires the admin role.
//!
//! | Path | Method | Purpose |
//! |------|--------|---------|
//! | /admin/issues/{id}/assign | PATCH | assign a staff member |
//! | /admin/issues/{id}/reject | PATCH | reject a pending issue |
//! | /admin/users | GET | all identities |
//! | /admin/users/{subject_id}/role | PATCH | change role |
//! | /admin/users/{subject_id}/block | PATCH | block / unblock |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Admin router - requires admin role
pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/admin/issues", issue_routes())
        .nest("/admin/users", user_routes())
        .layer(middleware::from_fn(require_admin))
}

fn issue_routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/assign", patch(handler::assign))
        .route("/{id}/reject", patch(handler::reject))
}

fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_users))
        .route("/{subject_id}/role", patch(handler::set_role))
        .route("/{subject_id}/block", patch(handler::set_blocked))
}
