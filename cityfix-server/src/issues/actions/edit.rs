//! Submitter edits and upvotes
//!
//! Neither touches status or the timeline.

use shared::issue::{Issue, IssueError, IssueUpdate, TimelineEntry, machine};

use super::{ActionContext, IssueAction};

#[derive(Debug, Clone)]
pub struct EditAction {
    pub update: IssueUpdate,
}

impl IssueAction for EditAction {
    fn execute(
        &self,
        issue: &mut Issue,
        ctx: &ActionContext,
    ) -> Result<Option<TimelineEntry>, IssueError> {
        machine::edit(issue, &ctx.actor, self.update.clone(), ctx.now)?;
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "edit"
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpvoteAction;

impl IssueAction for UpvoteAction {
    fn execute(
        &self,
        issue: &mut Issue,
        ctx: &ActionContext,
    ) -> Result<Option<TimelineEntry>, IssueError> {
        machine::upvote(issue, &ctx.actor)?;
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "upvote"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{T0, pending_issue};
    use super::*;
    use shared::issue::Actor;
    use shared::models::Role;

    #[test]
    fn test_edit_by_submitter() {
        let mut issue = pending_issue();
        let ctx = ActionContext::new(Actor::new("ana@example.com", Role::Citizen), T0 + 1);
        let action = EditAction {
            update: IssueUpdate {
                title: Some("Huge pothole".into()),
                ..Default::default()
            },
        };
        assert!(action.execute(&mut issue, &ctx).unwrap().is_none());
        assert_eq!(issue.title, "Huge pothole");
        assert_eq!(issue.timeline.len(), 1);
    }

    #[test]
    fn test_edit_by_other_citizen() {
        let mut issue = pending_issue();
        let ctx = ActionContext::new(Actor::new("ben@example.com", Role::Citizen), T0 + 1);
        let action = EditAction {
            update: IssueUpdate::default(),
        };
        assert_eq!(
            action.execute(&mut issue, &ctx).unwrap_err(),
            IssueError::NotSubmitter
        );
    }

    #[test]
    fn test_upvote() {
        let mut issue = pending_issue();
        let ben = ActionContext::new(Actor::new("ben@example.com", Role::Citizen), T0 + 1);
        UpvoteAction.execute(&mut issue, &ben).unwrap();
        assert_eq!(issue.upvote_count(), 1);
        assert_eq!(
            UpvoteAction.execute(&mut issue, &ben).unwrap_err(),
            IssueError::AlreadyUpvoted
        );

        let ana = ActionContext::new(Actor::new("ana@example.com", Role::Citizen), T0 + 1);
        assert_eq!(
            UpvoteAction.execute(&mut issue, &ana).unwrap_err(),
            IssueError::CannotUpvoteOwn
        );
    }
}
