//! Issue snapshot and its status / priority enums

use serde::{Deserialize, Serialize};
use std::fmt;

use super::timeline::TimelineEntry;

/// Issue lifecycle status
///
/// The main chain is linear: each non-terminal status has exactly one
/// successor. `Rejected` is reachable only from `Pending` through an admin
/// reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IssueStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Working,
    Resolved,
    Closed,
    Rejected,
}

impl IssueStatus {
    /// The main chain, in visiting order
    pub const CHAIN: [IssueStatus; 5] = [
        IssueStatus::Pending,
        IssueStatus::InProgress,
        IssueStatus::Working,
        IssueStatus::Resolved,
        IssueStatus::Closed,
    ];

    /// The single legal forward target, `None` for terminal states
    pub const fn successor(&self) -> Option<IssueStatus> {
        match self {
            IssueStatus::Pending => Some(IssueStatus::InProgress),
            IssueStatus::InProgress => Some(IssueStatus::Working),
            IssueStatus::Working => Some(IssueStatus::Resolved),
            IssueStatus::Resolved => Some(IssueStatus::Closed),
            IssueStatus::Closed | IssueStatus::Rejected => None,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, IssueStatus::Closed | IssueStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Working => "Working",
            IssueStatus::Resolved => "Resolved",
            IssueStatus::Closed => "Closed",
            IssueStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue priority; only ever escalated by a confirmed boost
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// Reported issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Issue ID (uuid, assigned by server)
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub priority: Priority,
    pub status: IssueStatus,
    pub submitter_id: String,
    #[serde(default)]
    pub assigned_staff_id: Option<String>,
    /// Subject ids that upvoted, in upvote order
    #[serde(default)]
    pub upvotes: Vec<String>,
    /// Creation time (Unix millis)
    pub created_at: i64,
    /// Last mutation time (Unix millis)
    pub updated_at: i64,
    /// Append-only audit log
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl Issue {
    /// Append a timeline entry, clamping its timestamp so the log never goes
    /// backwards in time. Returns the stored timestamp.
    pub fn record(&mut self, mut entry: TimelineEntry) -> i64 {
        if let Some(last) = self.timeline.last() {
            entry.timestamp = entry.timestamp.max(last.timestamp);
        }
        let ts = entry.timestamp;
        self.updated_at = self.updated_at.max(ts);
        self.timeline.push(entry);
        ts
    }

    pub fn is_assigned_to(&self, subject_id: &str) -> bool {
        self.assigned_staff_id.as_deref() == Some(subject_id)
    }

    pub fn upvote_count(&self) -> usize {
        self.upvotes.len()
    }
}
