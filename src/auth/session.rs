use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::gateway::UnauthorizedInterceptor;

use super::authority::TokenAuthority;
use super::credential::Credential;
use super::store::CredentialStore;

/// Authentication state observed by the rest of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Refreshing,
}

/// Orchestrates login, logout, expiry detection, and transparent refresh.
///
/// The single credential slot is the only state shared with the rest of the
/// client; job and user calls read it through [`SessionManager::ensure_valid`],
/// which completes (including any refresh) before the guarded request is sent.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use keywork::auth::{ClientIdentity, FileCredentialStore, SessionManager, TokenAuthority};
/// use keywork::gateway::RequestGateway;
///
/// # async fn example() -> keywork::error::Result<()> {
/// let gateway = Arc::new(RequestGateway::new(
///     "https://extract.example.com",
///     std::time::Duration::from_secs(30),
/// ));
/// let authority = TokenAuthority::new(gateway, ClientIdentity::new("client", "secret"));
/// let session = SessionManager::new(authority, Arc::new(FileCredentialStore::new_default()));
/// session.login("ops@example.com", "password").await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionManager {
    authority: TokenAuthority,
    store: Arc<dyn CredentialStore>,
    state: Mutex<SessionState>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl SessionManager {
    /// A stored credential survives process restarts, so a populated store
    /// starts the session out Authenticated.
    pub fn new(authority: TokenAuthority, store: Arc<dyn CredentialStore>) -> Self {
        let state = match store.load() {
            Ok(Some(_)) => SessionState::Authenticated,
            _ => SessionState::Anonymous,
        };
        Self {
            authority,
            store,
            state: Mutex::new(state),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().expect("state lock poisoned")
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock().expect("state lock poisoned") = next;
    }

    /// Perform the password grant and persist the resulting credential.
    ///
    /// On rejection the session stays Anonymous and the error surfaces
    /// unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential> {
        let grant = self.authority.password_grant(email, password).await?;
        let refresh_token = grant.refresh_token.ok_or_else(|| {
            ClientError::InvalidResponse("token endpoint returned no refresh token".to_string())
        })?;
        let credential = Credential {
            access_token: grant.access_token,
            refresh_token,
            subject: email.to_string(),
        };
        self.store.save(&credential)?;
        self.set_state(SessionState::Authenticated);
        debug!(subject = %credential.subject, "login complete");
        Ok(credential)
    }

    /// Clear the credential slot. Idempotent; logging out with no stored
    /// credential is a no-op, not an error.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        self.set_state(SessionState::Anonymous);
        Ok(())
    }

    /// Validate the stored access token, refreshing it transparently when the
    /// authorization server reports it expired.
    ///
    /// Any non-expiry rejection from introspection, and any rejection of the
    /// refresh itself, takes the forced-logout path before the error
    /// surfaces; the caller is then responsible for redirecting to login.
    /// Transport failures propagate without touching the session.
    pub async fn ensure_valid(&self) -> Result<Credential> {
        let credential = self.store.load()?.ok_or(ClientError::NotLoggedIn)?;
        match self.authority.introspect(&credential.access_token).await {
            Ok(_) => Ok(credential),
            Err(ClientError::TokenExpired) => self.refresh(credential).await,
            Err(ClientError::AuthRejected(message)) => {
                warn!(%message, "introspection rejected; forcing logout");
                self.force_logout();
                Err(ClientError::AuthRejected(message))
            }
            Err(other) => Err(other),
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Single-flight per credential generation: callers that arrive while a
    /// refresh is in flight wait on the gate, observe the replaced access
    /// token, and return it without a second exchange.
    async fn refresh(&self, seen: Credential) -> Result<Credential> {
        let _gate = self.refresh_gate.lock().await;
        let current = self.store.load()?.ok_or(ClientError::NotLoggedIn)?;
        if current.access_token != seen.access_token {
            return Ok(current);
        }
        self.set_state(SessionState::Refreshing);
        match self.authority.refresh_grant(&current.refresh_token).await {
            Ok(grant) => {
                let updated = Credential {
                    access_token: grant.access_token,
                    refresh_token: grant.refresh_token.unwrap_or(current.refresh_token),
                    subject: current.subject,
                };
                self.store.save(&updated)?;
                self.set_state(SessionState::Authenticated);
                debug!(subject = %updated.subject, "access token refreshed");
                Ok(updated)
            }
            Err(err @ (ClientError::AuthRejected(_) | ClientError::TokenExpired)) => {
                warn!("refresh rejected; forcing logout");
                self.force_logout();
                Err(err)
            }
            Err(other) => {
                // transport failure: the stored credential may still be good
                self.set_state(SessionState::Authenticated);
                Err(other)
            }
        }
    }

    /// Forced-logout path shared by refresh failure and the 401 interceptor.
    pub fn force_logout(&self) {
        if let Err(err) = self.store.clear() {
            warn!(%err, "failed to clear credential store during forced logout");
        }
        self.set_state(SessionState::Anonymous);
    }
}

#[async_trait]
impl UnauthorizedInterceptor for SessionManager {
    async fn on_unauthorized(&self) {
        self.force_logout();
    }
}
