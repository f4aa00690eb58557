//! Issue workflow errors

use thiserror::Error;

use super::snapshot::IssueStatus;
use crate::error::{AppError, ErrorCode};

/// Precondition failures of the issue workflow
///
/// Every variant is raised before any mutation, so a failed operation leaves
/// the issue untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: IssueStatus, to: IssueStatus },

    #[error("Issue is already {0}")]
    AlreadyTerminal(IssueStatus),

    #[error("Issue is not assigned to {actor}")]
    NotAssigned { actor: String },

    #[error("Issue has no assigned staff")]
    Unassigned,

    #[error("Issue is already assigned to {assignee}")]
    AlreadyAssigned { assignee: String },

    #[error("Issue is {0}, expected Pending")]
    NotPending(IssueStatus),

    #[error("Only the submitter may modify this issue")]
    NotSubmitter,

    #[error("Operation requires {0} role")]
    RoleRequired(&'static str),

    #[error("Issue already upvoted")]
    AlreadyUpvoted,

    #[error("Cannot upvote your own issue")]
    CannotUpvoteOwn,
}

impl IssueError {
    pub fn code(&self) -> ErrorCode {
        match self {
            IssueError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            IssueError::AlreadyTerminal(_) => ErrorCode::AlreadyTerminal,
            IssueError::NotAssigned { .. } => ErrorCode::NotAssigned,
            IssueError::Unassigned => ErrorCode::IssueNotAssigned,
            IssueError::AlreadyAssigned { .. } => ErrorCode::AlreadyAssigned,
            IssueError::NotPending(_) => ErrorCode::IssueNotPending,
            IssueError::NotSubmitter => ErrorCode::NotSubmitter,
            IssueError::RoleRequired("admin") => ErrorCode::AdminRequired,
            IssueError::RoleRequired("staff") => ErrorCode::StaffRequired,
            IssueError::RoleRequired(_) => ErrorCode::RoleRequired,
            IssueError::AlreadyUpvoted => ErrorCode::AlreadyUpvoted,
            IssueError::CannotUpvoteOwn => ErrorCode::CannotUpvoteOwn,
        }
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        let app = AppError::with_message(err.code(), err.to_string());
        match err {
            IssueError::InvalidTransition { from, to } => app
                .with_detail("from", from.as_str())
                .with_detail("to", to.as_str()),
            IssueError::AlreadyTerminal(status) | IssueError::NotPending(status) => {
                app.with_detail("status", status.as_str())
            }
            IssueError::AlreadyAssigned { assignee } => app.with_detail("assignee", assignee),
            _ => app,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            IssueError::InvalidTransition {
                from: IssueStatus::Pending,
                to: IssueStatus::Working
            }
            .code(),
            ErrorCode::InvalidTransition
        );
        assert_eq!(IssueError::RoleRequired("admin").code(), ErrorCode::AdminRequired);
        assert_eq!(IssueError::RoleRequired("staff").code(), ErrorCode::StaffRequired);
        assert_eq!(IssueError::Unassigned.code(), ErrorCode::IssueNotAssigned);
    }

    #[test]
    fn test_into_app_error_carries_details() {
        let err: AppError = IssueError::InvalidTransition {
            from: IssueStatus::Pending,
            to: IssueStatus::Working,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(err.message, "Invalid transition: Pending -> Working");
        let details = err.details.unwrap();
        assert_eq!(details["from"], "Pending");
        assert_eq!(details["to"], "Working");

        let err: AppError = IssueError::AlreadyAssigned {
            assignee: "staff-a".into(),
        }
        .into();
        assert_eq!(err.details.unwrap()["assignee"], "staff-a");
    }
}
