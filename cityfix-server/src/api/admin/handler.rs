//! Admin API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use shared::error::AppResult;
use shared::issue::{AssignRequest, Assignment, Issue, RejectQuery};
use shared::models::{BlockUpdate, Identity, RoleUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;

/// PATCH /admin/issues/{id}/assign
pub async fn assign(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> AppResult<Json<Assignment>> {
    tracing::info!(
        user_id = %current_user.subject_id,
        issue_id = %id,
        staff_id = %request.staff_id,
        "Assigning issue"
    );
    let assignment = state
        .issues
        .assign(&id, &current_user.actor(), &request.staff_id)?;
    Ok(Json(assignment))
}

/// PATCH /admin/issues/{id}/reject?reason=...
pub async fn reject(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<RejectQuery>,
) -> AppResult<Json<Issue>> {
    let issue = state
        .issues
        .reject(&id, &current_user.actor(), query.reason)?;
    Ok(Json(issue))
}

/// GET /admin/users
pub async fn list_users(State(state): State<ServerState>) -> AppResult<Json<Vec<Identity>>> {
    Ok(Json(state.directory.list()?))
}

/// PATCH /admin/users/{subject_id}/role
pub async fn set_role(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(subject_id): Path<String>,
    Json(update): Json<RoleUpdate>,
) -> AppResult<Json<Identity>> {
    let identity = state
        .directory
        .set_role(&current_user.subject_id, &subject_id, update.role)?;
    Ok(Json(identity))
}

/// PATCH /admin/users/{subject_id}/block
pub async fn set_blocked(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(subject_id): Path<String>,
    Json(update): Json<BlockUpdate>,
) -> AppResult<Json<Identity>> {
    let identity =
        state
            .directory
            .set_blocked(&current_user.subject_id, &subject_id, update.blocked)?;
    Ok(Json(identity))
}
