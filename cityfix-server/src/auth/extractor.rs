//! Request extractors for the authenticated caller

use axum::extract::FromRequestParts;
use axum::http::Extensions;
use axum::http::request::Parts;
use shared::error::{AppError, ErrorCode};
use shared::issue::Actor;
use shared::models::{Identity, Role};

use crate::auth::TokenIdentity;
use crate::core::ServerState;

/// Registered caller
///
/// Inserted into the request extensions by [`require_auth`] after the role
/// directory lookup, so the role is always the current one, never a value
/// baked into the token.
///
/// [`require_auth`]: crate::auth::require_auth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub subject_id: String,
    pub display_name: String,
    pub role: Role,
    pub is_premium: bool,
}

impl From<Identity> for CurrentUser {
    fn from(identity: Identity) -> Self {
        Self {
            subject_id: identity.subject_id,
            display_name: identity.display_name,
            role: identity.role,
            is_premium: identity.is_premium,
        }
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Staff or admin
    pub fn is_staff(&self) -> bool {
        self.role.can_work_issues()
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.subject_id.as_str(), self.role)
    }
}

/// Registered caller from request extensions
///
/// A valid token without a directory entry yields `IdentityNotFound`; a
/// request that never passed authentication yields `NotAuthenticated`.
pub(crate) fn current_user_from(extensions: &Extensions) -> Result<&CurrentUser, AppError> {
    if let Some(user) = extensions.get::<CurrentUser>() {
        return Ok(user);
    }
    match extensions.get::<TokenIdentity>() {
        Some(token) => Err(AppError::with_message(
            ErrorCode::IdentityNotFound,
            "Identity is not registered",
        )
        .with_detail("subjectId", token.subject_id.as_str())),
        None => Err(AppError::unauthorized()),
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        current_user_from(&parts.extensions).cloned()
    }
}

impl FromRequestParts<ServerState> for TokenIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenIdentity>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_from_extensions() {
        let mut extensions = Extensions::new();
        assert_eq!(
            current_user_from(&extensions).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );

        extensions.insert(TokenIdentity {
            subject_id: "ana".into(),
            display_name: "Ana".into(),
        });
        assert_eq!(
            current_user_from(&extensions).unwrap_err().code,
            ErrorCode::IdentityNotFound
        );

        let mut identity = Identity::citizen("ana", "Ana", 1);
        identity.role = Role::Staff;
        extensions.insert(CurrentUser::from(identity));
        let user = current_user_from(&extensions).unwrap();
        assert!(user.is_staff());
        assert!(!user.is_admin());
        assert_eq!(user.actor(), Actor::new("ana", Role::Staff));
    }
}
