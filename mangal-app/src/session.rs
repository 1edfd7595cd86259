//! Admin session
//!
//! Holds the bearer credential and the verified identity. The credential is
//! cleared ONLY when the identity check itself comes back unauthorized; an
//! unrelated 401 elsewhere must not log the operator out.

use mangal_client::{Api, ClientError, HttpClient};
use shared::client::AdminIdentity;
use thiserror::Error;

use crate::roles::Role;

/// Where the bearer token lives between requests
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&mut self, token: &str);
    fn clear(&mut self);
}

/// In-memory token store (one browser session)
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.clone()
    }

    fn set(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn clear(&mut self) {
        self.token = None;
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The identity check said the credential is no longer valid; it has
    /// been cleared and the operator must log in again.
    #[error("session expired")]
    Expired,

    /// Any other failure; the credential is kept.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Admin session state
pub struct AdminSession<C: HttpClient, S: TokenStore> {
    api: Api<C>,
    store: S,
    identity: Option<AdminIdentity>,
}

impl<C: HttpClient, S: TokenStore> AdminSession<C, S> {
    /// Restore a session: a stored token is installed on the client but not
    /// trusted until [`verify_identity`](Self::verify_identity) confirms it.
    pub fn new(mut api: Api<C>, store: S) -> Self {
        if let Some(token) = store.get() {
            api.set_token(token);
        }
        Self {
            api,
            store,
            identity: None,
        }
    }

    pub fn api(&self) -> &Api<C> {
        &self.api
    }

    pub fn identity(&self) -> Option<&AdminIdentity> {
        self.identity.as_ref()
    }

    /// Role of the verified identity; defaults to the least privileged role
    /// until verification has happened.
    pub fn role(&self) -> Role {
        self.identity
            .as_ref()
            .and_then(|i| i.role.as_deref())
            .map(Role::parse)
            .unwrap_or(Role::Kitchen)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Exchange credentials for a token and persist it
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), SessionError> {
        let token = self.api.admin_login(email, password).await?;
        self.store.set(&token);
        self.verify_identity().await
    }

    /// Confirm the stored credential against `admin/me`.
    ///
    /// Only an unauthorized outcome of THIS call clears the credential;
    /// network failures and server errors leave it in place so a flaky
    /// request cannot spuriously log the operator out.
    pub async fn verify_identity(&mut self) -> Result<(), SessionError> {
        match self.api.admin_me().await {
            Ok(identity) => {
                self.identity = Some(identity);
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                self.store.clear();
                self.api.clear_token();
                self.identity = None;
                Err(SessionError::Expired)
            }
            Err(e) => Err(SessionError::Client(e)),
        }
    }

    pub fn logout(&mut self) {
        self.store.clear();
        self.api.clear_token();
        self.identity = None;
    }
}
