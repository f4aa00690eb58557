//! Boost action
//!
//! Escalates priority after a confirmed payment. Never demotes.

use shared::issue::{Issue, IssueError, TimelineEntry, machine};

use super::{ActionContext, IssueAction};

#[derive(Debug, Clone, Default)]
pub struct BoostAction;

impl IssueAction for BoostAction {
    fn execute(
        &self,
        issue: &mut Issue,
        ctx: &ActionContext,
    ) -> Result<Option<TimelineEntry>, IssueError> {
        if machine::boost(issue, &ctx.actor.subject_id, ctx.now)? {
            Ok(issue.timeline.last().cloned())
        } else {
            Ok(None)
        }
    }

    fn name(&self) -> &'static str {
        "boost"
    }
}
