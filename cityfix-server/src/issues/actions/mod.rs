//! Issue action implementations
//!
//! Each action implements the `IssueAction` trait and handles one kind of
//! issue mutation. Actions run inside the storage write transaction that
//! loaded the issue, so they always see the committed state.

use shared::issue::{Actor, Issue, IssueError, TimelineEntry};

mod assign;
mod boost;
mod edit;
mod reject;
mod transition;

pub use assign::AssignAction;
pub use boost::BoostAction;
pub use edit::{EditAction, UpvoteAction};
pub use reject::RejectAction;
pub use transition::TransitionAction;

/// Who acts, and when
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub actor: Actor,
    /// Unix millis
    pub now: i64,
}

impl ActionContext {
    pub fn new(actor: Actor, now: i64) -> Self {
        Self { actor, now }
    }
}

/// A mutation of one issue
///
/// On `Err` the issue must be left untouched. On `Ok` the appended timeline
/// entry, if any, is returned.
pub trait IssueAction {
    fn execute(
        &self,
        issue: &mut Issue,
        ctx: &ActionContext,
    ) -> Result<Option<TimelineEntry>, IssueError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// IssueCommand enum - dispatches to concrete action implementations
#[derive(Debug, Clone)]
pub enum IssueCommand {
    Transition(TransitionAction),
    Reject(RejectAction),
    Assign(AssignAction),
    Boost(BoostAction),
    Edit(EditAction),
    Upvote(UpvoteAction),
}

impl IssueAction for IssueCommand {
    fn execute(
        &self,
        issue: &mut Issue,
        ctx: &ActionContext,
    ) -> Result<Option<TimelineEntry>, IssueError> {
        match self {
            IssueCommand::Transition(action) => action.execute(issue, ctx),
            IssueCommand::Reject(action) => action.execute(issue, ctx),
            IssueCommand::Assign(action) => action.execute(issue, ctx),
            IssueCommand::Boost(action) => action.execute(issue, ctx),
            IssueCommand::Edit(action) => action.execute(issue, ctx),
            IssueCommand::Upvote(action) => action.execute(issue, ctx),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            IssueCommand::Transition(action) => action.name(),
            IssueCommand::Reject(action) => action.name(),
            IssueCommand::Assign(action) => action.name(),
            IssueCommand::Boost(action) => action.name(),
            IssueCommand::Edit(action) => action.name(),
            IssueCommand::Upvote(action) => action.name(),
        }
    }
}

impl From<TransitionAction> for IssueCommand {
    fn from(action: TransitionAction) -> Self {
        IssueCommand::Transition(action)
    }
}

impl From<RejectAction> for IssueCommand {
    fn from(action: RejectAction) -> Self {
        IssueCommand::Reject(action)
    }
}

impl From<AssignAction> for IssueCommand {
    fn from(action: AssignAction) -> Self {
        IssueCommand::Assign(action)
    }
}

impl From<BoostAction> for IssueCommand {
    fn from(action: BoostAction) -> Self {
        IssueCommand::Boost(action)
    }
}

impl From<EditAction> for IssueCommand {
    fn from(action: EditAction) -> Self {
        IssueCommand::Edit(action)
    }
}

impl From<UpvoteAction> for IssueCommand {
    fn from(action: UpvoteAction) -> Self {
        IssueCommand::Upvote(action)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use shared::issue::{Issue, IssueCreate, machine};

    pub const T0: i64 = 1_700_000_000_000;

    pub fn pending_issue() -> Issue {
        machine::report(
            "issue-1",
            "ana@example.com",
            IssueCreate {
                title: "Pothole".into(),
                description: "Deep pothole near the school".into(),
                category: "Road".into(),
                location: "Main St 12".into(),
                image_url: None,
            },
            T0,
        )
    }
}
