//! Users API Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use shared::error::{AppError, AppResult};
use shared::models::{Identity, RoleResponse};

use crate::auth::{CurrentUser, TokenIdentity};
use crate::core::ServerState;

/// POST /users - register the token's subject
///
/// 201 on first registration, 200 with the stored identity afterwards.
pub async fn register(
    State(state): State<ServerState>,
    token: TokenIdentity,
) -> AppResult<(StatusCode, Json<Identity>)> {
    let (identity, created) = state
        .directory
        .register(&token.subject_id, &token.display_name)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(identity)))
}

/// GET /users/me
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Identity>> {
    let identity = state.directory.get(&current_user.subject_id)?;
    Ok(Json(identity))
}

/// GET /users/role/{subject_id}
///
/// Anyone may resolve their own role; staff and admins may resolve others.
/// 404 (`IdentityNotFound`) means the subject has no role.
pub async fn role(
    State(state): State<ServerState>,
    token: TokenIdentity,
    Path(subject_id): Path<String>,
) -> AppResult<Json<RoleResponse>> {
    if subject_id != token.subject_id {
        let caller = state
            .directory
            .find(&token.subject_id)?
            .map(CurrentUser::from);
        if !caller.is_some_and(|c| c.is_staff()) {
            return Err(AppError::forbidden("Cannot look up another identity's role"));
        }
    }

    let role = state.directory.resolve(&subject_id)?;
    Ok(Json(RoleResponse { role }))
}
