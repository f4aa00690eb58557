//! Issues API Module
//!
//! | Path | Method | Gate |
//! |------|--------|------|
//! | /issues | GET, POST | token (POST: citizens) |
//! | /issues/{id} | GET, PATCH, DELETE | token (PATCH/DELETE: submitter) |
//! | /issues/{id}/upvote | POST | token |
//! | /issues/{id}/status | PATCH | staff or admin |
//! | /staff/issues | GET | staff or admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_staff;
use crate::core::ServerState;

/// Issues router
pub fn router() -> Router<ServerState> {
    let citizen_routes = Router::new()
        .route("/issues", get(handler::list).post(handler::create))
        .route(
            "/issues/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
        .route("/issues/{id}/upvote", post(handler::upvote));

    let staff_routes = Router::new()
        .route("/issues/{id}/status", patch(handler::transition))
        .route("/staff/issues", get(handler::list_assigned))
        .layer(middleware::from_fn(require_staff));

    citizen_routes.merge(staff_routes)
}
