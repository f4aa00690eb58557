//! Explicit session object
//!
//! The session holds the signed-in identity and its bearer token. Guards and
//! API calls receive the session they act for; nothing reads ambient state.
//!
//! Lifecycle: `Initializing` → [`Session::sign_in`] → `SignedIn` →
//! [`Session::sign_out`] or a 401/403 from the API → `SignedOut`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ClientResult;
use crate::guard::login_redirect;

/// What the identity provider hands back on sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub subject_id: String,
    pub display_name: String,
    /// Bearer token for the CityFix API
    pub token: String,
}

/// Third-party identity provider
///
/// Any failure is reported as an error; the access guard then treats the
/// identity as absent.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self) -> ClientResult<AuthenticatedIdentity>;
    async fn sign_out(&self) -> ClientResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentityState {
    /// Identity resolution has not finished yet
    #[default]
    Initializing,
    SignedIn(AuthenticatedIdentity),
    SignedOut,
}

impl IdentityState {
    pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
        match self {
            IdentityState::SignedIn(identity) => Some(identity),
            IdentityState::Initializing | IdentityState::SignedOut => None,
        }
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.identity().map(|i| i.subject_id.as_str())
    }
}

#[derive(Debug)]
struct SessionState {
    identity: IdentityState,
    current_path: String,
    pending_redirect: Option<String>,
}

pub struct Session {
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<SessionState>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(SessionState {
                identity: IdentityState::Initializing,
                current_path: "/".to_string(),
                pending_redirect: None,
            }),
        }
    }

    /// Authenticate through the provider and start the session
    pub async fn sign_in(&self) -> ClientResult<AuthenticatedIdentity> {
        match self.provider.authenticate().await {
            Ok(identity) => {
                let mut state = self.state.write().await;
                state.identity = IdentityState::SignedIn(identity.clone());
                state.pending_redirect = None;
                tracing::info!(subject = %identity.subject_id, "Session started");
                Ok(identity)
            }
            Err(e) => {
                self.state.write().await.identity = IdentityState::SignedOut;
                tracing::warn!(error = %e, "Identity provider authentication failed");
                Err(e)
            }
        }
    }

    /// User-initiated sign-out; the session ends even if the provider fails
    pub async fn sign_out(&self) -> ClientResult<()> {
        let result = self.provider.sign_out().await;
        self.state.write().await.identity = IdentityState::SignedOut;
        tracing::info!("Session ended");
        result
    }

    /// End the session after the API refused its credentials
    ///
    /// Records a login redirect that returns to the current path.
    pub(crate) async fn expire(&self) {
        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!(error = %e, "Identity provider sign-out failed");
        }

        let mut state = self.state.write().await;
        let redirect = login_redirect(&state.current_path);
        tracing::info!(redirect = %redirect, "Session expired by API response");
        state.identity = IdentityState::SignedOut;
        state.pending_redirect = Some(redirect);
    }

    pub async fn identity(&self) -> IdentityState {
        self.state.read().await.identity.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .identity
            .identity()
            .map(|i| i.token.clone())
    }

    /// Record the path the user is on
    pub async fn navigate(&self, path: &str) {
        self.state.write().await.current_path = path.to_string();
    }

    pub async fn current_path(&self) -> String {
        self.state.read().await.current_path.clone()
    }

    /// Login redirect left behind by an expired session, if any
    pub async fn take_pending_redirect(&self) -> Option<String> {
        self.state.write().await.pending_redirect.take()
    }
}
