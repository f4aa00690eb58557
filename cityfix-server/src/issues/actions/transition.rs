//! Transition action
//!
//! Moves an issue one step along the status chain.

use shared::issue::{Issue, IssueError, IssueStatus, TimelineEntry, machine};

use super::{ActionContext, IssueAction};

/// Transition action
#[derive(Debug, Clone)]
pub struct TransitionAction {
    pub target: IssueStatus,
    /// Status the caller last observed
    pub expected: Option<IssueStatus>,
}

impl IssueAction for TransitionAction {
    fn execute(
        &self,
        issue: &mut Issue,
        ctx: &ActionContext,
    ) -> Result<Option<TimelineEntry>, IssueError> {
        machine::check_transition_actor(issue, &ctx.actor)?;

        // A stale observation means someone else moved the issue first
        if let Some(expected) = self.expected
            && expected != issue.status
        {
            return Err(IssueError::InvalidTransition {
                from: issue.status,
                to: self.target,
            });
        }

        machine::transition(issue, &ctx.actor, self.target, ctx.now).map(Some)
    }

    fn name(&self) -> &'static str {
        "transition"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{T0, pending_issue};
    use super::*;
    use shared::issue::{Actor, machine};
    use shared::models::Role;

    fn assigned_issue() -> Issue {
        let mut issue = pending_issue();
        machine::assign(
            &mut issue,
            "staff-a",
            &Actor::new("admin", Role::Admin),
            T0 + 1,
        )
        .unwrap();
        issue
    }

    #[test]
    fn test_transition_appends_entry() {
        let mut issue = assigned_issue();
        let ctx = ActionContext::new(Actor::new("staff-a", Role::Staff), T0 + 10);
        let action = TransitionAction {
            target: IssueStatus::InProgress,
            expected: Some(IssueStatus::Pending),
        };

        let entry = action.execute(&mut issue, &ctx).unwrap().unwrap();
        assert_eq!(issue.status, IssueStatus::InProgress);
        assert_eq!(entry.from, Some(IssueStatus::Pending));
        assert_eq!(entry.to, Some(IssueStatus::InProgress));
        assert_eq!(issue.timeline.last(), Some(&entry));
    }

    #[test]
    fn test_stale_expected_status_is_rejected() {
        let mut issue = assigned_issue();
        let ctx = ActionContext::new(Actor::new("staff-a", Role::Staff), T0 + 10);
        let first = TransitionAction {
            target: IssueStatus::InProgress,
            expected: Some(IssueStatus::Pending),
        };
        first.execute(&mut issue, &ctx).unwrap();
        let before = issue.clone();

        let err = first.execute(&mut issue, &ctx).unwrap_err();
        assert_eq!(
            err,
            IssueError::InvalidTransition {
                from: IssueStatus::InProgress,
                to: IssueStatus::InProgress
            }
        );
        assert_eq!(issue, before);
    }

    #[test]
    fn test_non_assignee_with_stale_view_is_not_assigned() {
        let mut issue = assigned_issue();
        let owner = ActionContext::new(Actor::new("staff-a", Role::Staff), T0 + 10);
        TransitionAction {
            target: IssueStatus::InProgress,
            expected: None,
        }
        .execute(&mut issue, &owner)
        .unwrap();
        let before = issue.clone();

        let other = ActionContext::new(Actor::new("staff-b", Role::Staff), T0 + 11);
        let stale = TransitionAction {
            target: IssueStatus::InProgress,
            expected: Some(IssueStatus::Pending),
        };
        assert_eq!(
            stale.execute(&mut issue, &other).unwrap_err(),
            IssueError::NotAssigned {
                actor: "staff-b".to_string()
            }
        );

        let citizen = ActionContext::new(Actor::new("ana", Role::Citizen), T0 + 12);
        assert_eq!(
            stale.execute(&mut issue, &citizen).unwrap_err(),
            IssueError::RoleRequired("staff")
        );
        assert_eq!(issue, before);
    }

    #[test]
    fn test_without_expected_status_uses_table() {
        let mut issue = assigned_issue();
        let ctx = ActionContext::new(Actor::new("admin", Role::Admin), T0 + 10);
        let action = TransitionAction {
            target: IssueStatus::Working,
            expected: None,
        };
        assert!(matches!(
            action.execute(&mut issue, &ctx),
            Err(IssueError::InvalidTransition { .. })
        ));
    }
}
