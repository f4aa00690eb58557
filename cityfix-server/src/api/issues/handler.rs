//! Issues API Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use shared::error::{ApiResponse, AppResult};
use shared::issue::{Issue, IssueCreate, IssueFilter, IssueUpdate, TransitionRequest};

use crate::auth::CurrentUser;
use crate::core::ServerState;

/// GET /issues - filtered listing
pub async fn list(
    State(state): State<ServerState>,
    _current_user: CurrentUser,
    Query(filter): Query<IssueFilter>,
) -> AppResult<Json<Vec<Issue>>> {
    let issues = state.issues.list(&filter)?;
    Ok(Json(issues))
}

/// POST /issues - report an issue
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<IssueCreate>,
) -> AppResult<(StatusCode, Json<Issue>)> {
    let issue = state.issues.create(&current_user.actor(), payload)?;
    Ok((StatusCode::CREATED, Json(issue)))
}

/// GET /issues/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    _current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Issue>> {
    Ok(Json(state.issues.get(&id)?))
}

/// PATCH /issues/{id} - submitter edit while pending
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<IssueUpdate>,
) -> AppResult<Json<Issue>> {
    let issue = state.issues.edit(&id, &current_user.actor(), payload)?;
    Ok(Json(issue))
}

/// DELETE /issues/{id} - submitter delete while pending
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.issues.delete(&id, &current_user.actor())?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /issues/{id}/upvote
pub async fn upvote(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Issue>> {
    let issue = state.issues.upvote(&id, &current_user.actor())?;
    Ok(Json(issue))
}

/// PATCH /issues/{id}/status - one step along the status chain
pub async fn transition(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> AppResult<Json<Issue>> {
    tracing::info!(
        user_id = %current_user.subject_id,
        issue_id = %id,
        target = %request.target_status,
        "Status change requested"
    );
    let issue = state
        .issues
        .transition(&id, &current_user.actor(), request)?;
    Ok(Json(issue))
}

/// GET /staff/issues - issues assigned to the caller
pub async fn list_assigned(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Issue>>> {
    let issues = state.issues.list_assigned(&current_user.subject_id)?;
    Ok(Json(issues))
}
