//! CityFix Client - SDK for the CityFix API
//!
//! Provides the pieces a dashboard front end needs:
//!
//! - [`Session`]: explicit signed-in state, passed to every guard and call
//! - [`HttpClient`]: bearer-token requests that end the session on 401/403
//! - [`RoleDirectory`] and [`AccessGuard`]: role-gated navigation
//! - [`IssueClient`] and [`UserClient`]: typed endpoints
//! - [`IssueBoard`]: optimistic transitions over [`OptimisticLedger`]

pub mod board;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod issues;
pub mod optimistic;
pub mod roles;
pub mod session;

use std::sync::Arc;

pub use board::{IssueBoard, Settled};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, FailureKind};
pub use guard::{AccessGuard, GuardDecision, login_redirect};
pub use http::HttpClient;
pub use issues::{IssueClient, UserClient};
pub use optimistic::{OptimisticError, OptimisticLedger, UpdateToken};
pub use roles::{RoleDirectory, RoleLookup};
pub use session::{AuthenticatedIdentity, IdentityProvider, IdentityState, Session};

// Re-export shared types for convenience
pub use shared::issue::{Actor, Issue, IssueStatus};
pub use shared::models::{Identity, Role};

/// All client components wired to one session
#[derive(Debug, Clone)]
pub struct CityFixClient {
    pub session: Arc<Session>,
    pub http: HttpClient,
    pub roles: RoleDirectory,
    pub guard: AccessGuard,
    pub issues: IssueClient,
    pub users: UserClient,
}

impl CityFixClient {
    pub fn new(config: &ClientConfig, provider: Arc<dyn IdentityProvider>) -> ClientResult<Self> {
        let session = Arc::new(Session::new(provider));
        let http = HttpClient::new(config, session.clone())?;
        let roles = RoleDirectory::new(http.clone());

        Ok(Self {
            guard: AccessGuard::new(roles.clone()),
            issues: IssueClient::new(http.clone()),
            users: UserClient::new(http.clone()),
            roles,
            http,
            session,
        })
    }

    /// Issue board sharing this client's session
    pub fn board(&self) -> IssueBoard {
        IssueBoard::new(self.issues.clone())
    }
}
