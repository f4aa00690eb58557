//! Issue workflow operations
//!
//! Pure functions over an [`Issue`]. Each one checks every precondition
//! first and only then mutates, so an `Err` always leaves the issue exactly
//! as it was. The server runs them inside a storage write transaction; the
//! client runs them on a copy to compute optimistic state.
//!
//! Authority split:
//! - status and timeline: [`transition`], [`reject`]
//! - assignee: [`assign`]
//! - priority: [`boost`]
//! - content: [`edit`], [`upvote`]

use super::error::IssueError;
use super::snapshot::{Issue, IssueStatus, Priority};
use super::timeline::{TimelineAction, TimelineEntry};
use super::types::{Actor, Assignment, IssueCreate, IssueUpdate};
use crate::models::Role;

/// Build a freshly reported issue
pub fn report(id: impl Into<String>, submitter_id: &str, payload: IssueCreate, now: i64) -> Issue {
    let mut issue = Issue {
        id: id.into(),
        title: payload.title,
        description: payload.description,
        category: payload.category,
        location: payload.location,
        image_url: payload.image_url,
        priority: Priority::Normal,
        status: IssueStatus::Pending,
        submitter_id: submitter_id.to_string(),
        assigned_staff_id: None,
        upvotes: Vec::new(),
        created_at: now,
        updated_at: now,
        timeline: Vec::new(),
    };
    issue.record(TimelineEntry::new(TimelineAction::Created, submitter_id, now));
    issue
}

/// May this actor move the issue at all, whatever the target
///
/// Terminal state first, then role, then assignee.
pub fn check_transition_actor(issue: &Issue, actor: &Actor) -> Result<(), IssueError> {
    if issue.status.is_terminal() {
        return Err(IssueError::AlreadyTerminal(issue.status));
    }

    match actor.role {
        Role::Citizen => Err(IssueError::RoleRequired("staff")),
        Role::Staff if !issue.is_assigned_to(&actor.subject_id) => Err(IssueError::NotAssigned {
            actor: actor.subject_id.clone(),
        }),
        // Admins skip the assignee check but still follow the table
        Role::Staff | Role::Admin => Ok(()),
    }
}

/// Check a transition without applying it
pub fn check_transition(
    issue: &Issue,
    actor: &Actor,
    target: IssueStatus,
) -> Result<(), IssueError> {
    check_transition_actor(issue, actor)?;

    if issue.status.successor() != Some(target) {
        return Err(IssueError::InvalidTransition {
            from: issue.status,
            to: target,
        });
    }

    if issue.status == IssueStatus::Pending && issue.assigned_staff_id.is_none() {
        return Err(IssueError::Unassigned);
    }

    Ok(())
}

/// Move the issue one step along the chain and log it
pub fn transition(
    issue: &mut Issue,
    actor: &Actor,
    target: IssueStatus,
    now: i64,
) -> Result<TimelineEntry, IssueError> {
    check_transition(issue, actor, target)?;

    let from = issue.status;
    issue.status = target;
    let mut entry = TimelineEntry::status_change(
        TimelineAction::StatusChanged,
        from,
        target,
        &actor.subject_id,
        now,
    );
    entry.timestamp = issue.record(entry.clone());
    Ok(entry)
}

/// Admin-only shortcut from `Pending` straight to `Rejected`
pub fn reject(
    issue: &mut Issue,
    actor: &Actor,
    reason: Option<String>,
    now: i64,
) -> Result<(), IssueError> {
    if !actor.role.is_admin() {
        return Err(IssueError::RoleRequired("admin"));
    }
    if issue.status.is_terminal() {
        return Err(IssueError::AlreadyTerminal(issue.status));
    }
    if issue.status != IssueStatus::Pending {
        return Err(IssueError::NotPending(issue.status));
    }

    issue.status = IssueStatus::Rejected;
    let mut entry = TimelineEntry::status_change(
        TimelineAction::Rejected,
        IssueStatus::Pending,
        IssueStatus::Rejected,
        &actor.subject_id,
        now,
    );
    entry.note = reason;
    issue.record(entry);
    Ok(())
}

/// Set the assignee of an unassigned, live issue
///
/// Whether `staff_id` really is a staff member is the caller's concern; the
/// issue itself has no view of the role directory.
pub fn assign(
    issue: &mut Issue,
    staff_id: &str,
    actor: &Actor,
    now: i64,
) -> Result<Assignment, IssueError> {
    if !actor.role.is_admin() {
        return Err(IssueError::RoleRequired("admin"));
    }
    if issue.status.is_terminal() {
        return Err(IssueError::AlreadyTerminal(issue.status));
    }
    if let Some(existing) = &issue.assigned_staff_id {
        return Err(IssueError::AlreadyAssigned {
            assignee: existing.clone(),
        });
    }

    issue.assigned_staff_id = Some(staff_id.to_string());
    let assigned_at = issue.record(
        TimelineEntry::new(TimelineAction::Assigned, &actor.subject_id, now).with_note(staff_id),
    );

    Ok(Assignment {
        issue_id: issue.id.clone(),
        staff_id: staff_id.to_string(),
        assigned_by: actor.subject_id.clone(),
        assigned_at,
    })
}

/// Escalate to `High`. Returns `false` when already high (no-op).
pub fn boost(issue: &mut Issue, payer_id: &str, now: i64) -> Result<bool, IssueError> {
    if issue.status.is_terminal() {
        return Err(IssueError::AlreadyTerminal(issue.status));
    }
    match issue.priority {
        Priority::High => Ok(false),
        Priority::Normal => {
            issue.priority = Priority::High;
            issue.record(TimelineEntry::new(TimelineAction::Boosted, payer_id, now));
            Ok(true)
        }
    }
}

/// Submitter-only checks shared by edit and delete
pub fn check_submitter_pending(issue: &Issue, actor: &Actor) -> Result<(), IssueError> {
    if issue.submitter_id != actor.subject_id {
        return Err(IssueError::NotSubmitter);
    }
    if issue.status != IssueStatus::Pending {
        return Err(IssueError::NotPending(issue.status));
    }
    Ok(())
}

/// Apply the provided fields of a submitter edit
pub fn edit(
    issue: &mut Issue,
    actor: &Actor,
    update: IssueUpdate,
    now: i64,
) -> Result<(), IssueError> {
    check_submitter_pending(issue, actor)?;

    if let Some(title) = update.title {
        issue.title = title;
    }
    if let Some(description) = update.description {
        issue.description = description;
    }
    if let Some(category) = update.category {
        issue.category = category;
    }
    if let Some(location) = update.location {
        issue.location = location;
    }
    if let Some(image_url) = update.image_url {
        issue.image_url = Some(image_url);
    }
    issue.updated_at = issue.updated_at.max(now);
    Ok(())
}

pub fn upvote(issue: &mut Issue, actor: &Actor) -> Result<(), IssueError> {
    if issue.submitter_id == actor.subject_id {
        return Err(IssueError::CannotUpvoteOwn);
    }
    if issue.upvotes.iter().any(|s| s == &actor.subject_id) {
        return Err(IssueError::AlreadyUpvoted);
    }
    issue.upvotes.push(actor.subject_id.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn admin() -> Actor {
        Actor::new("admin@city.gov", Role::Admin)
    }

    fn staff(id: &str) -> Actor {
        Actor::new(id, Role::Staff)
    }

    fn citizen() -> Actor {
        Actor::new("ana@example.com", Role::Citizen)
    }

    fn new_issue() -> Issue {
        report(
            "issue-1",
            "ana@example.com",
            IssueCreate {
                title: "Pothole".into(),
                description: "Deep pothole".into(),
                category: "Road".into(),
                location: "Main St".into(),
                image_url: None,
            },
            T0,
        )
    }

    fn assigned_issue(staff_id: &str) -> Issue {
        let mut issue = new_issue();
        assign(&mut issue, staff_id, &admin(), T0 + 1).unwrap();
        issue
    }

    #[test]
    fn test_report_starts_pending() {
        let issue = new_issue();
        assert_eq!(issue.status, IssueStatus::Pending);
        assert_eq!(issue.priority, Priority::Normal);
        assert!(issue.assigned_staff_id.is_none());
        assert_eq!(issue.timeline.len(), 1);
        assert_eq!(issue.timeline[0].action, TimelineAction::Created);
    }

    #[test]
    fn test_full_chain_by_assignee() {
        let mut issue = assigned_issue("staff-a");
        let actor = staff("staff-a");
        let mut visited = vec![issue.status];

        for (i, target) in IssueStatus::CHAIN.iter().skip(1).enumerate() {
            let before = issue.timeline.len();
            let entry = transition(&mut issue, &actor, *target, T0 + 10 + i as i64).unwrap();
            assert_eq!(issue.timeline.len(), before + 1);
            assert_eq!(entry.action, TimelineAction::StatusChanged);
            assert_eq!(entry.from, Some(visited[visited.len() - 1]));
            assert_eq!(entry.to, Some(*target));
            visited.push(issue.status);
        }

        assert_eq!(visited, IssueStatus::CHAIN);
        let stamps: Vec<i64> = issue.timeline.iter().map(|e| e.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_every_non_successor_target_is_rejected() {
        let all = [
            IssueStatus::Pending,
            IssueStatus::InProgress,
            IssueStatus::Working,
            IssueStatus::Resolved,
            IssueStatus::Closed,
            IssueStatus::Rejected,
        ];
        let actor = staff("staff-a");

        for current in IssueStatus::CHAIN.iter().take(4) {
            let mut issue = assigned_issue("staff-a");
            issue.status = *current;
            for target in all {
                if Some(target) == current.successor() {
                    continue;
                }
                let snapshot = issue.clone();
                let err = transition(&mut issue, &actor, target, T0 + 5).unwrap_err();
                assert_eq!(
                    err,
                    IssueError::InvalidTransition {
                        from: *current,
                        to: target
                    }
                );
                assert_eq!(issue, snapshot);
            }
        }
    }

    #[test]
    fn test_skip_from_pending_leaves_status() {
        let mut issue = assigned_issue("staff-a");
        let result = transition(&mut issue, &staff("staff-a"), IssueStatus::Working, T0 + 2);
        assert!(matches!(result, Err(IssueError::InvalidTransition { .. })));
        assert_eq!(issue.status, IssueStatus::Pending);
    }

    #[test]
    fn test_non_assignee_staff_is_refused() {
        let mut issue = assigned_issue("staff-a");
        let err = transition(&mut issue, &staff("staff-b"), IssueStatus::InProgress, T0 + 2)
            .unwrap_err();
        assert_eq!(
            err,
            IssueError::NotAssigned {
                actor: "staff-b".into()
            }
        );
        assert_eq!(issue.status, IssueStatus::Pending);
    }

    #[test]
    fn test_unassigned_issue_cannot_leave_pending() {
        let mut issue = new_issue();
        let err = transition(&mut issue, &admin(), IssueStatus::InProgress, T0 + 2).unwrap_err();
        assert_eq!(err, IssueError::Unassigned);

        let err = transition(&mut issue, &staff("staff-a"), IssueStatus::InProgress, T0 + 2)
            .unwrap_err();
        assert!(matches!(err, IssueError::NotAssigned { .. }));
    }

    #[test]
    fn test_admin_is_exempt_from_assignee_check() {
        let mut issue = assigned_issue("staff-a");
        transition(&mut issue, &admin(), IssueStatus::InProgress, T0 + 2).unwrap();
        assert_eq!(issue.status, IssueStatus::InProgress);
        assert_eq!(issue.timeline.last().unwrap().actor_id, "admin@city.gov");
    }

    #[test]
    fn test_citizen_cannot_transition() {
        let mut issue = assigned_issue("staff-a");
        let err = transition(&mut issue, &citizen(), IssueStatus::InProgress, T0 + 2).unwrap_err();
        assert_eq!(err, IssueError::RoleRequired("staff"));
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut issue = assigned_issue("staff-a");
        issue.status = IssueStatus::Closed;
        let err = transition(&mut issue, &admin(), IssueStatus::Closed, T0 + 2).unwrap_err();
        assert_eq!(err, IssueError::AlreadyTerminal(IssueStatus::Closed));
    }

    #[test]
    fn test_reject_from_pending() {
        let mut issue = new_issue();
        reject(&mut issue, &admin(), Some("duplicate".into()), T0 + 3).unwrap();

        assert_eq!(issue.status, IssueStatus::Rejected);
        let entry = issue.timeline.last().unwrap();
        assert_eq!(entry.action, TimelineAction::Rejected);
        assert_eq!(entry.from, Some(IssueStatus::Pending));
        assert_eq!(entry.to, Some(IssueStatus::Rejected));
        assert_eq!(entry.note.as_deref(), Some("duplicate"));

        let err = transition(&mut issue, &admin(), IssueStatus::InProgress, T0 + 4).unwrap_err();
        assert_eq!(err, IssueError::AlreadyTerminal(IssueStatus::Rejected));
    }

    #[test]
    fn test_reject_outside_pending_conflicts() {
        let mut issue = assigned_issue("staff-a");
        issue.status = IssueStatus::Working;
        let snapshot = issue.clone();

        let err = reject(&mut issue, &admin(), None, T0 + 3).unwrap_err();
        assert_eq!(err, IssueError::NotPending(IssueStatus::Working));
        assert_eq!(issue, snapshot);
    }

    #[test]
    fn test_reject_requires_admin() {
        let mut issue = new_issue();
        let err = reject(&mut issue, &staff("staff-a"), None, T0 + 3).unwrap_err();
        assert_eq!(err, IssueError::RoleRequired("admin"));
        assert_eq!(issue.status, IssueStatus::Pending);
    }

    #[test]
    fn test_double_assign_keeps_first() {
        let mut issue = assigned_issue("staff-a");
        let err = assign(&mut issue, "staff-b", &admin(), T0 + 5).unwrap_err();
        assert_eq!(
            err,
            IssueError::AlreadyAssigned {
                assignee: "staff-a".into()
            }
        );
        assert_eq!(issue.assigned_staff_id.as_deref(), Some("staff-a"));
    }

    #[test]
    fn test_assign_records_ledger_entry() {
        let mut issue = new_issue();
        let assignment = assign(&mut issue, "staff-a", &admin(), T0 + 5).unwrap();
        assert_eq!(assignment.issue_id, "issue-1");
        assert_eq!(assignment.staff_id, "staff-a");
        assert_eq!(assignment.assigned_by, "admin@city.gov");
        assert_eq!(issue.status, IssueStatus::Pending);
        assert_eq!(issue.timeline.last().unwrap().action, TimelineAction::Assigned);
    }

    #[test]
    fn test_assign_terminal_issue_fails() {
        let mut issue = new_issue();
        reject(&mut issue, &admin(), None, T0 + 1).unwrap();
        let err = assign(&mut issue, "staff-a", &admin(), T0 + 2).unwrap_err();
        assert_eq!(err, IssueError::AlreadyTerminal(IssueStatus::Rejected));
        assert!(issue.assigned_staff_id.is_none());
    }

    #[test]
    fn test_boost_never_demotes() {
        let mut issue = new_issue();
        assert!(boost(&mut issue, "ana@example.com", T0 + 1).unwrap());
        assert_eq!(issue.priority, Priority::High);
        let len = issue.timeline.len();

        assert!(!boost(&mut issue, "ana@example.com", T0 + 2).unwrap());
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.timeline.len(), len);
    }

    #[test]
    fn test_edit_only_by_submitter_while_pending() {
        let mut issue = new_issue();
        let update = IssueUpdate {
            title: Some("Huge pothole".into()),
            ..Default::default()
        };

        let err = edit(&mut issue, &citizen_other(), update.clone(), T0 + 1).unwrap_err();
        assert_eq!(err, IssueError::NotSubmitter);

        edit(&mut issue, &citizen(), update.clone(), T0 + 1).unwrap();
        assert_eq!(issue.title, "Huge pothole");
        assert_eq!(issue.description, "Deep pothole");

        assign(&mut issue, "staff-a", &admin(), T0 + 2).unwrap();
        transition(&mut issue, &staff("staff-a"), IssueStatus::InProgress, T0 + 3).unwrap();
        let err = edit(&mut issue, &citizen(), update, T0 + 4).unwrap_err();
        assert_eq!(err, IssueError::NotPending(IssueStatus::InProgress));
    }

    fn citizen_other() -> Actor {
        Actor::new("bob@example.com", Role::Citizen)
    }

    #[test]
    fn test_upvote_rules() {
        let mut issue = new_issue();
        assert_eq!(upvote(&mut issue, &citizen()), Err(IssueError::CannotUpvoteOwn));

        upvote(&mut issue, &citizen_other()).unwrap();
        assert_eq!(issue.upvote_count(), 1);
        assert_eq!(
            upvote(&mut issue, &citizen_other()),
            Err(IssueError::AlreadyUpvoted)
        );
        assert_eq!(issue.upvote_count(), 1);
    }
}
