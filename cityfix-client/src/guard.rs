//! Access guard for the role dashboards
//!
//! Rules, in order:
//!
//! | Situation | Decision |
//! |-----------|----------|
//! | session still initializing | `Loading` |
//! | no identity | redirect to `/login?redirect=<path>` |
//! | role lookup not settled | `Loading` |
//! | role lookup failed upstream | `Unavailable` |
//! | no role, or a different role | redirect to `/` |
//! | otherwise | `Allow` |
//!
//! Decisions are never cached: [`AccessGuard::check`] resolves the role
//! again on every navigation.

use shared::models::Role;

use crate::roles::{RoleDirectory, RoleLookup};
use crate::session::{IdentityState, Session};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Login entry point that returns to `requested_path` afterwards
pub fn login_redirect(requested_path: &str) -> String {
    format!(
        "{LOGIN_PATH}?redirect={}",
        urlencoding::encode(requested_path)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Not decided yet; show a loading state
    Loading,
    Allow,
    RedirectTo(String),
    /// Role lookup failed; show a blocking notice
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct AccessGuard {
    roles: RoleDirectory,
}

impl AccessGuard {
    pub fn new(roles: RoleDirectory) -> Self {
        Self { roles }
    }

    /// Pure decision over an identity state and a role lookup
    pub fn authorize(
        identity: &IdentityState,
        lookup: &RoleLookup,
        required_role: Role,
        requested_path: &str,
    ) -> GuardDecision {
        match identity {
            IdentityState::Initializing => return GuardDecision::Loading,
            IdentityState::SignedOut => {
                return GuardDecision::RedirectTo(login_redirect(requested_path));
            }
            IdentityState::SignedIn(_) => {}
        }

        match lookup {
            RoleLookup::NotLoaded | RoleLookup::Loading => GuardDecision::Loading,
            RoleLookup::Unavailable(reason) => GuardDecision::Unavailable(reason.clone()),
            RoleLookup::Resolved(role) if *role == required_role => GuardDecision::Allow,
            RoleLookup::Resolved(_) | RoleLookup::NoRole => {
                GuardDecision::RedirectTo(HOME_PATH.to_string())
            }
        }
    }

    /// Evaluate a navigation to `requested_path` for this session
    pub async fn check(
        &self,
        session: &Session,
        required_role: Role,
        requested_path: &str,
    ) -> GuardDecision {
        session.navigate(requested_path).await;

        let lookup = match session.identity().await.subject_id() {
            Some(subject_id) => self.roles.resolve_role(Some(subject_id)).await,
            None => RoleLookup::NotLoaded,
        };

        // The lookup itself may have ended the session (401/403)
        let identity = session.identity().await;
        let decision = Self::authorize(&identity, &lookup, required_role, requested_path);
        tracing::debug!(
            path = %requested_path,
            required = %required_role,
            ?decision,
            "Access guard evaluated"
        );
        decision
    }
}
