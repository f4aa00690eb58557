//! Numeric error codes
//!
//! Codes are part of the wire contract: the dashboard matches on them, so a
//! code is never renumbered or reused once released.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Serialized as a bare number, e.g. `4002`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account has been blocked by an administrator
    AccountBlocked = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role is required
    RoleRequired = 2002,
    /// Administrator role is required
    AdminRequired = 2003,
    /// Staff role is required
    StaffRequired = 2004,
    /// Staff actor is not the assignee of the issue
    NotAssigned = 2005,
    /// Actor is not the submitter of the issue
    NotSubmitter = 2006,

    // ==================== 3xxx: Identity ====================
    /// Identity not registered
    IdentityNotFound = 3001,
    /// Identity has no role assigned
    RoleNotAssigned = 3002,

    // ==================== 4xxx: Issue ====================
    /// Issue not found
    IssueNotFound = 4001,
    /// Target status is not the successor of the current status
    InvalidTransition = 4002,
    /// Issue is closed or rejected
    AlreadyTerminal = 4003,
    /// Issue already has an assignee
    AlreadyAssigned = 4004,
    /// Issue has no assignee yet
    IssueNotAssigned = 4005,
    /// Issue is no longer pending
    IssueNotPending = 4006,
    /// Free issue quota exhausted
    IssueLimitReached = 4007,
    /// Actor has already upvoted
    AlreadyUpvoted = 4008,
    /// Submitter cannot upvote their own issue
    CannotUpvoteOwn = 4009,

    // ==================== 5xxx: Payment ====================
    /// Payment confirmation was already processed
    PaymentAlreadyProcessed = 5001,
    /// Webhook secret missing or wrong
    WebhookUnauthorized = 5002,
    /// Payment confirmation payload is invalid
    PaymentInvalid = 5003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Upstream dependency unavailable
    ServiceUnavailable = 9006,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default developer-facing message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountBlocked => "Account is blocked",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::StaffRequired => "Staff role is required",
            ErrorCode::NotAssigned => "Issue is not assigned to you",
            ErrorCode::NotSubmitter => "Only the submitter may modify this issue",

            // Identity
            ErrorCode::IdentityNotFound => "Identity not found",
            ErrorCode::RoleNotAssigned => "No role assigned",

            // Issue
            ErrorCode::IssueNotFound => "Issue not found",
            ErrorCode::InvalidTransition => "Invalid status transition",
            ErrorCode::AlreadyTerminal => "Issue is already closed or rejected",
            ErrorCode::AlreadyAssigned => "Issue is already assigned",
            ErrorCode::IssueNotAssigned => "Issue has no assigned staff",
            ErrorCode::IssueNotPending => "Issue is no longer pending",
            ErrorCode::IssueLimitReached => "Free issue limit reached",
            ErrorCode::AlreadyUpvoted => "Issue already upvoted",
            ErrorCode::CannotUpvoteOwn => "Cannot upvote your own issue",

            // Payment
            ErrorCode::PaymentAlreadyProcessed => "Payment already processed",
            ErrorCode::WebhookUnauthorized => "Webhook secret is invalid",
            ErrorCode::PaymentInvalid => "Invalid payment confirmation",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ServiceUnavailable => "Service unavailable",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number that is not a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1006 => Ok(ErrorCode::AccountBlocked),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::StaffRequired),
            2005 => Ok(ErrorCode::NotAssigned),
            2006 => Ok(ErrorCode::NotSubmitter),

            // Identity
            3001 => Ok(ErrorCode::IdentityNotFound),
            3002 => Ok(ErrorCode::RoleNotAssigned),

            // Issue
            4001 => Ok(ErrorCode::IssueNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::AlreadyTerminal),
            4004 => Ok(ErrorCode::AlreadyAssigned),
            4005 => Ok(ErrorCode::IssueNotAssigned),
            4006 => Ok(ErrorCode::IssueNotPending),
            4007 => Ok(ErrorCode::IssueLimitReached),
            4008 => Ok(ErrorCode::AlreadyUpvoted),
            4009 => Ok(ErrorCode::CannotUpvoteOwn),

            // Payment
            5001 => Ok(ErrorCode::PaymentAlreadyProcessed),
            5002 => Ok(ErrorCode::WebhookUnauthorized),
            5003 => Ok(ErrorCode::PaymentInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::ServiceUnavailable),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
