//! Assign action
//!
//! Sets the single assignee of a live issue. The caller is responsible for
//! checking that `staff_id` currently holds the staff role.

use shared::issue::{Issue, IssueError, TimelineEntry, machine};

use super::{ActionContext, IssueAction};

#[derive(Debug, Clone)]
pub struct AssignAction {
    pub staff_id: String,
}

impl IssueAction for AssignAction {
    fn execute(
        &self,
        issue: &mut Issue,
        ctx: &ActionContext,
    ) -> Result<Option<TimelineEntry>, IssueError> {
        machine::assign(issue, &self.staff_id, &ctx.actor, ctx.now)?;
        Ok(issue.timeline.last().cloned())
    }

    fn name(&self) -> &'static str {
        "assign"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{T0, pending_issue};
    use super::*;
    use shared::issue::{Actor, TimelineAction};
    use shared::models::Role;

    #[test]
    fn test_assign_then_reassign() {
        let mut issue = pending_issue();
        let ctx = ActionContext::new(Actor::new("admin", Role::Admin), T0 + 1);

        let entry = AssignAction {
            staff_id: "staff-a".into(),
        }
        .execute(&mut issue, &ctx)
        .unwrap()
        .unwrap();
        assert_eq!(entry.action, TimelineAction::Assigned);
        assert_eq!(entry.note.as_deref(), Some("staff-a"));

        let err = AssignAction {
            staff_id: "staff-b".into(),
        }
        .execute(&mut issue, &ctx)
        .unwrap_err();
        assert_eq!(
            err,
            IssueError::AlreadyAssigned {
                assignee: "staff-a".into()
            }
        );
        assert_eq!(issue.assigned_staff_id.as_deref(), Some("staff-a"));
    }
}
