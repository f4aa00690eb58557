//! Reject action
//!
//! Admin-only move from Pending straight to Rejected.

use shared::issue::{Issue, IssueError, TimelineEntry, machine};

use super::{ActionContext, IssueAction};

#[derive(Debug, Clone, Default)]
pub struct RejectAction {
    pub reason: Option<String>,
}

impl IssueAction for RejectAction {
    fn execute(
        &self,
        issue: &mut Issue,
        ctx: &ActionContext,
    ) -> Result<Option<TimelineEntry>, IssueError> {
        machine::reject(issue, &ctx.actor, self.reason.clone(), ctx.now)?;
        Ok(issue.timeline.last().cloned())
    }

    fn name(&self) -> &'static str {
        "reject"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{T0, pending_issue};
    use super::*;
    use shared::issue::{Actor, IssueStatus, TimelineAction};
    use shared::models::Role;

    #[test]
    fn test_reject_records_reason() {
        let mut issue = pending_issue();
        let ctx = ActionContext::new(Actor::new("admin", Role::Admin), T0 + 5);
        let entry = RejectAction {
            reason: Some("Duplicate".into()),
        }
        .execute(&mut issue, &ctx)
        .unwrap()
        .unwrap();

        assert_eq!(issue.status, IssueStatus::Rejected);
        assert_eq!(entry.action, TimelineAction::Rejected);
        assert_eq!(entry.note.as_deref(), Some("Duplicate"));
    }

    #[test]
    fn test_staff_cannot_reject() {
        let mut issue = pending_issue();
        let ctx = ActionContext::new(Actor::new("staff-a", Role::Staff), T0 + 5);
        let err = RejectAction::default().execute(&mut issue, &ctx).unwrap_err();
        assert_eq!(err, IssueError::RoleRequired("admin"));
        assert_eq!(issue.status, IssueStatus::Pending);
    }
}
