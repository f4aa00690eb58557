//! Authentication middleware
//!
//! Axum middleware for token authentication and role gates

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use crate::auth::extractor::current_user_from;
use crate::auth::{CurrentUser, JwtError, JwtService, TokenIdentity};
use crate::core::ServerState;
use crate::security_log;

/// Routes reachable without a bearer token
const PUBLIC_ROUTES: &[&str] = &["/health", "/webhooks/payments"];

/// Authentication middleware
///
/// Validates `Authorization: Bearer <token>`, then resolves the subject
/// through the role directory. Inserts [`TokenIdentity`] always and
/// [`CurrentUser`] when the subject is registered.
///
/// # Skipped
///
/// - `OPTIONS *` (CORS preflight)
/// - `/health`, `/webhooks/payments`
///
/// # Errors
///
/// | Error | HTTP status |
/// |-------|-------------|
/// | Missing Authorization header | 401 NotAuthenticated |
/// | Expired token | 401 TokenExpired |
/// | Invalid token | 401 TokenInvalid |
/// | Blocked identity | 403 AccountBlocked |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    if PUBLIC_ROUTES.contains(&req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let claims = match state.get_jwt_service().validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            return match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    let token_identity = TokenIdentity::from(claims);
    if let Some(identity) = state.directory.find(&token_identity.subject_id)? {
        if identity.is_blocked {
            security_log!(
                "WARN",
                "account_blocked",
                subject = token_identity.subject_id.clone(),
                uri = format!("{:?}", req.uri())
            );
            return Err(AppError::new(ErrorCode::AccountBlocked));
        }
        req.extensions_mut().insert(CurrentUser::from(identity));
    }
    req.extensions_mut().insert(token_identity);

    Ok(next.run(req).await)
}

/// Admin gate
///
/// # Errors
///
/// Non-admins get 403 AdminRequired
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            subject = user.subject_id.clone(),
            role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

/// Staff gate (staff and admins)
///
/// # Errors
///
/// Citizens get 403 StaffRequired
pub async fn require_staff(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    if !user.is_staff() {
        security_log!(
            "WARN",
            "staff_required",
            subject = user.subject_id.clone(),
            role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::StaffRequired));
    }

    Ok(next.run(req).await)
}

/// Access the registered caller from a request
pub trait CurrentUserExt {
    /// # Errors
    ///
    /// 401 when unauthenticated, IdentityNotFound when not registered
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        current_user_from(self.extensions())
    }
}
