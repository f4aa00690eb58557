use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Status the server answers with for this code
    ///
    /// Workflow precondition failures (wrong status, already assigned) are
    /// 409 so clients can tell them apart from missing permissions (403).
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::ValidationFailed | Self::InvalidRequest | Self::PaymentInvalid => {
                StatusCode::BAD_REQUEST
            }

            Self::NotAuthenticated
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::WebhookUnauthorized => StatusCode::UNAUTHORIZED,

            Self::IssueLimitReached => StatusCode::PAYMENT_REQUIRED,

            Self::AccountBlocked
            | Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::StaffRequired
            | Self::NotAssigned
            | Self::NotSubmitter
            | Self::RoleNotAssigned
            | Self::CannotUpvoteOwn => StatusCode::FORBIDDEN,

            Self::NotFound | Self::IssueNotFound | Self::IdentityNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists
            | Self::InvalidTransition
            | Self::AlreadyTerminal
            | Self::AlreadyAssigned
            | Self::IssueNotAssigned
            | Self::IssueNotPending
            | Self::AlreadyUpvoted
            | Self::PaymentAlreadyProcessed => StatusCode::CONFLICT,

            // Transient; clients may retry
            Self::NetworkError | Self::TimeoutError | Self::ServiceUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorCode::Success, StatusCode::OK),
            (ErrorCode::ValidationFailed, StatusCode::BAD_REQUEST),
            (ErrorCode::PaymentInvalid, StatusCode::BAD_REQUEST),
            (ErrorCode::NotAuthenticated, StatusCode::UNAUTHORIZED),
            (ErrorCode::TokenExpired, StatusCode::UNAUTHORIZED),
            (ErrorCode::WebhookUnauthorized, StatusCode::UNAUTHORIZED),
            (ErrorCode::IssueLimitReached, StatusCode::PAYMENT_REQUIRED),
            (ErrorCode::AccountBlocked, StatusCode::FORBIDDEN),
            (ErrorCode::StaffRequired, StatusCode::FORBIDDEN),
            (ErrorCode::NotAssigned, StatusCode::FORBIDDEN),
            (ErrorCode::CannotUpvoteOwn, StatusCode::FORBIDDEN),
            (ErrorCode::IssueNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::IdentityNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (ErrorCode::DatabaseError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            assert_eq!(code.http_status(), status, "{code:?}");
        }
    }

    #[test]
    fn test_workflow_preconditions_are_conflicts() {
        for code in [
            ErrorCode::InvalidTransition,
            ErrorCode::AlreadyTerminal,
            ErrorCode::AlreadyAssigned,
            ErrorCode::IssueNotAssigned,
            ErrorCode::IssueNotPending,
            ErrorCode::AlreadyUpvoted,
        ] {
            assert_eq!(code.http_status(), StatusCode::CONFLICT, "{code:?}");
        }
    }
}
