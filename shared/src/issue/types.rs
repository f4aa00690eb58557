//! Issue request payloads and supporting types

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::snapshot::{Issue, IssueStatus, Priority};
use crate::models::Role;

/// Who is performing an issue operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub subject_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(subject_id: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            role,
        }
    }
}

/// Create issue payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreate {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(length(min = 1, max = 60))]
    pub category: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Update issue payload (submitter edit while pending)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdate {
    #[validate(length(min = 1, max = 120))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 60))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 200))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl IssueUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.location.is_none()
            && self.image_url.is_none()
    }
}

/// `PATCH /issues/{id}/status` body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub target_status: IssueStatus,
    /// Status the caller last observed; a mismatch fails the transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<IssueStatus>,
}

/// `PATCH /admin/issues/{id}/assign` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub staff_id: String,
}

/// `PATCH /admin/issues/{id}/reject` query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Ledger view of an issue's assignee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub issue_id: String,
    pub staff_id: String,
    pub assigned_by: String,
    /// Unix millis
    pub assigned_at: i64,
}

/// List filter (`GET /issues` query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        self.status.is_none_or(|s| issue.status == s)
            && self
                .category
                .as_deref()
                .is_none_or(|c| issue.category.eq_ignore_ascii_case(c))
            && self.priority.is_none_or(|p| issue.priority == p)
            && self
                .submitter
                .as_deref()
                .is_none_or(|s| issue.submitter_id == s)
            && self
                .assigned_to
                .as_deref()
                .is_none_or(|s| issue.is_assigned_to(s))
    }
}

/// Listing order: boosted issues first, then newest first
pub fn sort_for_listing(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}
