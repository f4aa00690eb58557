//! Issue timeline entries

use serde::{Deserialize, Serialize};

use super::snapshot::IssueStatus;

/// What a timeline entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineAction {
    Created,
    Assigned,
    StatusChanged,
    Rejected,
    Boosted,
}

/// One immutable entry of an issue's audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub action: TimelineAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<IssueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<IssueStatus>,
    pub actor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Unix millis
    pub timestamp: i64,
}

impl TimelineEntry {
    pub fn new(action: TimelineAction, actor_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            action,
            from: None,
            to: None,
            actor_id: actor_id.into(),
            note: None,
            timestamp,
        }
    }

    pub fn status_change(
        action: TimelineAction,
        from: IssueStatus,
        to: IssueStatus,
        actor_id: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::new(action, actor_id, timestamp)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
