use shared::error::{AppError, AppResult, ErrorCode};
use shared::issue::{
    Actor, Assignment, Issue, IssueCreate, IssueError, IssueFilter, IssueUpdate, TimelineAction,
    TimelineEntry, TransitionRequest, machine, sort_for_listing,
};
use shared::models::Role;
use shared::util::{new_id, now_millis};
use validator::Validate;

use super::actions::{
    ActionContext, AssignAction, EditAction, IssueAction, IssueCommand, RejectAction,
    TransitionAction, UpvoteAction,
};
use redb::WriteTransaction;

use crate::storage::Storage;

/// Issue workflow service
///
/// Every mutation is a read-check-write inside one storage write
/// transaction, so concurrent requests against the same issue are
/// serialized and the loser fails its precondition instead of overwriting.
#[derive(Debug, Clone)]
pub struct IssueService {
    storage: Storage,
    free_issue_limit: usize,
}

impl IssueService {
    pub fn new(storage: Storage, free_issue_limit: usize) -> Self {
        Self {
            storage,
            free_issue_limit,
        }
    }

    // ========== Queries ==========

    pub fn get(&self, issue_id: &str) -> AppResult<Issue> {
        self.storage
            .get_issue(issue_id)?
            .ok_or_else(|| issue_not_found(issue_id))
    }

    /// Filtered listing, boosted first then newest
    pub fn list(&self, filter: &IssueFilter) -> AppResult<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .storage
            .list_issues()?
            .into_iter()
            .filter(|issue| filter.matches(issue))
            .collect();
        sort_for_listing(&mut issues);
        Ok(issues)
    }

    /// Issues currently assigned to a staff member
    pub fn list_assigned(&self, staff_id: &str) -> AppResult<Vec<Issue>> {
        self.list(&IssueFilter {
            assigned_to: Some(staff_id.to_string()),
            ..Default::default()
        })
    }

    /// Current assignment of an issue, if any
    pub fn assignment(&self, issue_id: &str) -> AppResult<Option<Assignment>> {
        Ok(assignment_of(&self.get(issue_id)?))
    }

    // ========== Reporting ==========

    /// Report a new issue (citizens only)
    pub fn create(&self, actor: &Actor, payload: IssueCreate) -> AppResult<Issue> {
        match actor.role {
            Role::Citizen => {}
            Role::Staff | Role::Admin => {
                return Err(AppError::with_message(
                    ErrorCode::RoleRequired,
                    "Only citizens can report issues",
                ));
            }
        }
        payload
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let limit = self.free_issue_limit;
        let issue = self.storage.write(|txn| -> AppResult<Issue> {
            let identity = Storage::read_identity(txn, &actor.subject_id)?.ok_or_else(|| {
                AppError::new(ErrorCode::IdentityNotFound)
                    .with_detail("subjectId", actor.subject_id.as_str())
            })?;
            if !identity.is_premium {
                let filed = Storage::count_issues_by_submitter(txn, &actor.subject_id)?;
                if filed >= limit {
                    return Err(AppError::new(ErrorCode::IssueLimitReached)
                        .with_detail("limit", limit));
                }
            }

            let issue = machine::report(new_id(), &actor.subject_id, payload, now_millis());
            Storage::write_issue(txn, &issue)?;
            Ok(issue)
        })?;

        tracing::info!(issue_id = %issue.id, submitter = %issue.submitter_id, "Issue reported");
        Ok(issue)
    }

    /// Submitter edit while Pending
    pub fn edit(&self, issue_id: &str, actor: &Actor, update: IssueUpdate) -> AppResult<Issue> {
        update
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        if update.is_empty() {
            return Err(AppError::invalid_request("No fields to update"));
        }
        let (issue, _) = self.execute(issue_id, actor, EditAction { update })?;
        Ok(issue)
    }

    /// Submitter delete while Pending
    pub fn delete(&self, issue_id: &str, actor: &Actor) -> AppResult<()> {
        let deleted = self.storage.delete_issue_if(issue_id, |issue| -> AppResult<()> {
            machine::check_submitter_pending(issue, actor)?;
            Ok(())
        })?;
        if !deleted {
            return Err(issue_not_found(issue_id));
        }
        tracing::info!(issue_id = %issue_id, actor = %actor.subject_id, "Issue deleted");
        Ok(())
    }

    pub fn upvote(&self, issue_id: &str, actor: &Actor) -> AppResult<Issue> {
        let (issue, _) = self.execute(issue_id, actor, UpvoteAction)?;
        Ok(issue)
    }

    // ========== Workflow ==========

    /// Move an issue one step along the status chain
    pub fn transition(
        &self,
        issue_id: &str,
        actor: &Actor,
        request: TransitionRequest,
    ) -> AppResult<Issue> {
        let action = TransitionAction {
            target: request.target_status,
            expected: request.expected_status,
        };
        let (issue, _) = self.execute(issue_id, actor, action)?;
        Ok(issue)
    }

    /// Admin reject from Pending
    pub fn reject(&self, issue_id: &str, actor: &Actor, reason: Option<String>) -> AppResult<Issue> {
        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        let (issue, _) = self.execute(issue_id, actor, RejectAction { reason })?;
        Ok(issue)
    }

    /// Admin assigns a staff member to an unassigned issue
    pub fn assign(&self, issue_id: &str, actor: &Actor, staff_id: &str) -> AppResult<Assignment> {
        if !actor.role.is_admin() {
            return Err(IssueError::RoleRequired("admin").into());
        }
        let action = AssignAction {
            staff_id: staff_id.to_string(),
        };
        // The role is read in the assigning transaction, so a concurrent
        // demotion either lands before (refused) or after (normal demotion)
        let (issue, entry) =
            self.execute_checked(issue_id, actor, action, |txn| require_staff_member(txn, staff_id))?;
        let assigned_at = entry.map_or(issue.updated_at, |e| e.timestamp);
        Ok(Assignment {
            issue_id: issue.id,
            staff_id: staff_id.to_string(),
            assigned_by: actor.subject_id.clone(),
            assigned_at,
        })
    }

    /// Run one action against the committed issue state
    pub fn execute(
        &self,
        issue_id: &str,
        actor: &Actor,
        action: impl Into<IssueCommand>,
    ) -> AppResult<(Issue, Option<TimelineEntry>)> {
        self.execute_checked(issue_id, actor, action, |_| Ok(()))
    }

    /// Like [`Self::execute`], with `precheck` run first in the same write
    /// transaction
    fn execute_checked(
        &self,
        issue_id: &str,
        actor: &Actor,
        action: impl Into<IssueCommand>,
        precheck: impl FnOnce(&WriteTransaction) -> AppResult<()>,
    ) -> AppResult<(Issue, Option<TimelineEntry>)> {
        let command = action.into();
        let ctx = ActionContext::new(actor.clone(), now_millis());

        let result = self.storage.update_issue(issue_id, |txn, issue| {
            precheck(txn)?;
            command.execute(issue, &ctx).map_err(AppError::from)
        });
        let (issue, entry) = match result {
            Ok(Some(updated)) => updated,
            Ok(None) => return Err(issue_not_found(issue_id)),
            Err(e) => {
                tracing::debug!(
                    issue_id = %issue_id,
                    action = command.name(),
                    actor = %actor.subject_id,
                    code = %e.code,
                    "Issue action refused"
                );
                return Err(e);
            }
        };

        tracing::info!(
            issue_id = %issue_id,
            action = command.name(),
            actor = %actor.subject_id,
            status = %issue.status,
            "Issue updated"
        );
        Ok((issue, entry))
    }
}

/// Only a current staff member may become an assignee
fn require_staff_member(txn: &WriteTransaction, staff_id: &str) -> AppResult<()> {
    match Storage::read_identity(txn, staff_id)?.map(|identity| identity.role) {
        Some(Role::Staff) => Ok(()),
        Some(Role::Citizen | Role::Admin) | None => Err(AppError::validation(format!(
            "{staff_id} is not a staff member"
        ))
        .with_detail("staffId", staff_id)),
    }
}

/// Ledger view of an issue's assignee, from its timeline
pub fn assignment_of(issue: &Issue) -> Option<Assignment> {
    let staff_id = issue.assigned_staff_id.as_ref()?;
    let entry = issue
        .timeline
        .iter()
        .rev()
        .find(|e| e.action == TimelineAction::Assigned)?;
    Some(Assignment {
        issue_id: issue.id.clone(),
        staff_id: staff_id.clone(),
        assigned_by: entry.actor_id.clone(),
        assigned_at: entry.timestamp,
    })
}

fn issue_not_found(issue_id: &str) -> AppError {
    AppError::new(ErrorCode::IssueNotFound).with_detail("issueId", issue_id)
}
