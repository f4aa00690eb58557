//! Client error types

use shared::error::ErrorCategory;
use shared::issue::IssueError;
use shared::ErrorCode;
use thiserror::Error;

use crate::optimistic::OptimisticError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401 from the API; the session has already been torn down
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// 403 from the API; the session has already been torn down
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409 from the API
    #[error("Conflict ({code}): {message}")]
    Conflict { code: ErrorCode, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// 5xx from the API
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Any other error body
    #[error("API error ({code}): {message}")]
    Api { code: ErrorCode, message: String },

    /// Refused by the issue workflow before any request was sent
    #[error("Rejected locally: {0}")]
    Workflow(#[from] IssueError),

    #[error(transparent)]
    Optimistic(#[from] OptimisticError),

    /// Identity provider failure
    #[error("Identity provider error: {0}")]
    Identity(String),

    /// No signed-in identity
    #[error("Not signed in")]
    NotSignedIn,

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// How a caller should react to a failure
///
/// `Unauthenticated` and `Unauthorized` are handled by the access guard via
/// redirect. `InvalidTransition` and `Conflict` roll back optimistic state.
/// `Unavailable` is shown to the actor and never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthenticated,
    Unauthorized,
    InvalidTransition,
    Conflict,
    Unavailable,
    Other,
}

impl FailureKind {
    /// Classify an API error code
    pub fn from_code(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidTransition => Self::InvalidTransition,
            ErrorCode::AlreadyAssigned
            | ErrorCode::AlreadyTerminal
            | ErrorCode::IssueNotPending
            | ErrorCode::IssueNotAssigned
            | ErrorCode::AlreadyUpvoted
            | ErrorCode::AlreadyExists
            | ErrorCode::PaymentAlreadyProcessed => Self::Conflict,
            ErrorCode::NetworkError | ErrorCode::TimeoutError | ErrorCode::ServiceUnavailable => {
                Self::Unavailable
            }
            other => match other.category() {
                ErrorCategory::Auth => Self::Unauthenticated,
                ErrorCategory::Permission => Self::Unauthorized,
                _ => Self::Other,
            },
        }
    }
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unauthorized(_) | Self::NotSignedIn | Self::Identity(_) => {
                FailureKind::Unauthenticated
            }
            Self::Forbidden(_) => FailureKind::Unauthorized,
            Self::Conflict { code, .. } => match FailureKind::from_code(*code) {
                FailureKind::InvalidTransition => FailureKind::InvalidTransition,
                _ => FailureKind::Conflict,
            },
            Self::Api { code, .. } => FailureKind::from_code(*code),
            Self::Workflow(err) => FailureKind::from_code(err.code()),
            Self::Optimistic(_) => FailureKind::Conflict,
            Self::Unavailable(_) => FailureKind::Unavailable,
            Self::Http(err) if !err.is_decode() => FailureKind::Unavailable,
            _ => FailureKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::issue::IssueStatus;

    #[test]
    fn test_kind_of_api_errors() {
        let err = ClientError::Conflict {
            code: ErrorCode::InvalidTransition,
            message: "Invalid transition".into(),
        };
        assert_eq!(err.kind(), FailureKind::InvalidTransition);

        let err = ClientError::Conflict {
            code: ErrorCode::AlreadyAssigned,
            message: "Issue already has an assignee".into(),
        };
        assert_eq!(err.kind(), FailureKind::Conflict);

        assert_eq!(
            ClientError::Unauthorized("expired".into()).kind(),
            FailureKind::Unauthenticated
        );
        assert_eq!(
            ClientError::Forbidden("not assigned".into()).kind(),
            FailureKind::Unauthorized
        );
        assert_eq!(
            ClientError::Unavailable("503".into()).kind(),
            FailureKind::Unavailable
        );
        assert_eq!(ClientError::NotFound("x".into()).kind(), FailureKind::Other);
    }

    #[test]
    fn test_kind_of_local_workflow_errors() {
        let err = ClientError::from(IssueError::InvalidTransition {
            from: IssueStatus::Pending,
            to: IssueStatus::Working,
        });
        assert_eq!(err.kind(), FailureKind::InvalidTransition);

        let err = ClientError::from(IssueError::NotAssigned {
            actor: "sam".into(),
        });
        assert_eq!(err.kind(), FailureKind::Unauthorized);

        let err = ClientError::from(IssueError::AlreadyTerminal(IssueStatus::Closed));
        assert_eq!(err.kind(), FailureKind::Conflict);

        let err = ClientError::from(OptimisticError::UpdateInFlight);
        assert_eq!(err.kind(), FailureKind::Conflict);
    }

    #[test]
    fn test_from_code_categories() {
        assert_eq!(
            FailureKind::from_code(ErrorCode::AccountBlocked),
            FailureKind::Unauthenticated
        );
        assert_eq!(
            FailureKind::from_code(ErrorCode::AdminRequired),
            FailureKind::Unauthorized
        );
        assert_eq!(
            FailureKind::from_code(ErrorCode::IssueLimitReached),
            FailureKind::Other
        );
    }
}
