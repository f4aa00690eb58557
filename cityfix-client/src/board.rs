//! Local issue view with optimistic status transitions
//!
//! A transition is computed locally with the shared workflow rules, shown
//! immediately, and then settled by the server: confirmed with the server's
//! issue, or rolled back to exactly what was shown before. Failures are
//! reported to the caller and never retried.

use shared::issue::{Actor, Issue, IssueFilter, IssueStatus, TransitionRequest, machine};
use shared::util::now_millis;
use tokio::sync::Mutex;

use crate::error::{ClientError, ClientResult};
use crate::issues::IssueClient;
use crate::optimistic::OptimisticLedger;

/// How an optimistic transition ended
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    /// The server accepted it; the view holds the server's issue
    Confirmed(Issue),
    /// The update was abandoned before the server answered
    Discarded,
}

#[derive(Debug)]
pub struct IssueBoard {
    issues: IssueClient,
    view: Mutex<OptimisticLedger<String, Issue>>,
}

impl IssueBoard {
    pub fn new(issues: IssueClient) -> Self {
        Self {
            issues,
            view: Mutex::new(OptimisticLedger::new()),
        }
    }

    /// Fetch issues into the view; items with an update in flight keep
    /// their tentative value
    pub async fn load(&self, filter: &IssueFilter) -> ClientResult<Vec<Issue>> {
        let issues = self.issues.list(filter).await?;
        let mut view = self.view.lock().await;
        for issue in &issues {
            let _ = view.upsert(issue.id.clone(), issue.clone());
        }
        Ok(issues)
    }

    pub async fn refresh(&self, issue_id: &str) -> ClientResult<Issue> {
        let issue = self.issues.get(issue_id).await?;
        self.view
            .lock()
            .await
            .upsert(issue.id.clone(), issue.clone())?;
        Ok(issue)
    }

    /// What the view currently shows for an issue
    pub async fn issue(&self, issue_id: &str) -> Option<Issue> {
        self.view.lock().await.get(&issue_id.to_string()).cloned()
    }

    pub async fn status(&self, issue_id: &str) -> Option<IssueStatus> {
        self.issue(issue_id).await.map(|i| i.status)
    }

    /// Optimistically move an issue to `target`
    ///
    /// Workflow violations are caught locally and never reach the server.
    /// The request carries the status the view showed, so a stale view
    /// fails with `InvalidTransition` instead of double-applying.
    pub async fn transition(
        &self,
        actor: &Actor,
        issue_id: &str,
        target: IssueStatus,
    ) -> ClientResult<Settled> {
        let (token, expected) = {
            let mut view = self.view.lock().await;
            let current = view
                .get(&issue_id.to_string())
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("issue {issue_id}")))?;

            let mut tentative = current.clone();
            machine::transition(&mut tentative, actor, target, now_millis())?;
            (view.apply(issue_id.to_string(), tentative)?, current.status)
        };

        let request = TransitionRequest {
            target_status: target,
            expected_status: Some(expected),
        };
        match self.issues.transition(issue_id, &request).await {
            Ok(issue) => {
                if self.view.lock().await.confirm(token, issue.clone()) {
                    Ok(Settled::Confirmed(issue))
                } else {
                    tracing::debug!(issue_id = %issue_id, "Late transition result discarded");
                    Ok(Settled::Discarded)
                }
            }
            Err(e) => {
                self.view.lock().await.rollback(token);
                tracing::warn!(
                    issue_id = %issue_id,
                    target = %target,
                    kind = ?e.kind(),
                    error = %e,
                    "Transition rolled back"
                );
                Err(e)
            }
        }
    }

    /// Roll back everything in flight (on navigation)
    pub async fn abandon_pending(&self) -> usize {
        self.view.lock().await.abandon_all()
    }
}
