//! Client-side role directory
//!
//! Resolves a subject id to its dashboard role through
//! `GET /users/role/{subjectId}`. No caching: every call asks the server.

use shared::models::{Role, RoleResponse};

use crate::error::ClientError;
use crate::http::HttpClient;

/// Outcome of a role lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleLookup {
    /// No subject to look up
    NotLoaded,
    /// Lookup in flight
    Loading,
    Resolved(Role),
    /// The identity exists upstream but has no role (404)
    NoRole,
    /// The lookup itself failed
    Unavailable(String),
}

impl RoleLookup {
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleLookup::Resolved(role) => Some(*role),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoleDirectory {
    http: HttpClient,
}

impl RoleDirectory {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn resolve_role(&self, subject_id: Option<&str>) -> RoleLookup {
        let Some(subject_id) = subject_id.map(str::trim).filter(|s| !s.is_empty()) else {
            return RoleLookup::NotLoaded;
        };

        let path = format!("/users/role/{}", urlencoding::encode(subject_id));
        match self.http.get::<RoleResponse>(&path).await {
            Ok(response) => RoleLookup::Resolved(response.role),
            Err(ClientError::NotFound(_)) => RoleLookup::NoRole,
            Err(e) => {
                tracing::warn!(subject = %subject_id, error = %e, "Role lookup failed");
                RoleLookup::Unavailable(e.to_string())
            }
        }
    }
}
