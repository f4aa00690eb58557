//! Typed issue and user endpoints

use shared::ApiResponse;
use shared::issue::{
    AssignRequest, Assignment, Issue, IssueCreate, IssueFilter, IssueUpdate, RejectQuery,
    TransitionRequest,
};
use shared::models::{BlockUpdate, Identity, Role, RoleUpdate};

use crate::error::ClientResult;
use crate::http::HttpClient;

fn issue_path(issue_id: &str) -> String {
    format!("/issues/{}", urlencoding::encode(issue_id))
}

fn admin_user_path(subject_id: &str, action: &str) -> String {
    format!(
        "/admin/users/{}/{action}",
        urlencoding::encode(subject_id)
    )
}

#[derive(Debug, Clone)]
pub struct IssueClient {
    http: HttpClient,
}

impl IssueClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    // ========== Citizen ==========

    pub async fn list(&self, filter: &IssueFilter) -> ClientResult<Vec<Issue>> {
        self.http.get_with_query("/issues", filter).await
    }

    pub async fn get(&self, issue_id: &str) -> ClientResult<Issue> {
        self.http.get(&issue_path(issue_id)).await
    }

    pub async fn create(&self, payload: &IssueCreate) -> ClientResult<Issue> {
        self.http.post("/issues", payload).await
    }

    pub async fn edit(&self, issue_id: &str, update: &IssueUpdate) -> ClientResult<Issue> {
        self.http.patch(&issue_path(issue_id), update).await
    }

    pub async fn delete(&self, issue_id: &str) -> ClientResult<()> {
        self.http
            .delete::<ApiResponse<()>>(&issue_path(issue_id))
            .await?;
        Ok(())
    }

    pub async fn upvote(&self, issue_id: &str) -> ClientResult<Issue> {
        self.http
            .post_empty(&format!("{}/upvote", issue_path(issue_id)))
            .await
    }

    // ========== Staff ==========

    pub async fn transition(
        &self,
        issue_id: &str,
        request: &TransitionRequest,
    ) -> ClientResult<Issue> {
        self.http
            .patch(&format!("{}/status", issue_path(issue_id)), request)
            .await
    }

    pub async fn assigned_to_me(&self) -> ClientResult<Vec<Issue>> {
        self.http.get("/staff/issues").await
    }

    // ========== Admin ==========

    pub async fn assign(&self, issue_id: &str, staff_id: &str) -> ClientResult<Assignment> {
        let request = AssignRequest {
            staff_id: staff_id.to_string(),
        };
        self.http
            .patch(
                &format!("/admin/issues/{}/assign", urlencoding::encode(issue_id)),
                &request,
            )
            .await
    }

    pub async fn reject(&self, issue_id: &str, reason: Option<&str>) -> ClientResult<Issue> {
        let query = RejectQuery {
            reason: reason.map(str::to_string),
        };
        self.http
            .patch_with_query(
                &format!("/admin/issues/{}/reject", urlencoding::encode(issue_id)),
                &query,
            )
            .await
    }
}

#[derive(Debug, Clone)]
pub struct UserClient {
    http: HttpClient,
}

impl UserClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Register on first login; returns the existing identity afterwards
    pub async fn register(&self) -> ClientResult<Identity> {
        self.http.post_empty("/users").await
    }

    pub async fn me(&self) -> ClientResult<Identity> {
        self.http.get("/users/me").await
    }

    pub async fn list(&self) -> ClientResult<Vec<Identity>> {
        self.http.get("/admin/users").await
    }

    pub async fn set_role(&self, subject_id: &str, role: Role) -> ClientResult<Identity> {
        self.http
            .patch(&admin_user_path(subject_id, "role"), &RoleUpdate { role })
            .await
    }

    pub async fn set_blocked(&self, subject_id: &str, blocked: bool) -> ClientResult<Identity> {
        self.http
            .patch(
                &admin_user_path(subject_id, "block"),
                &BlockUpdate { blocked },
            )
            .await
    }
}
