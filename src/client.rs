//! Top-level client wiring.

use std::sync::{Arc, Weak};

use crate::auth::{CredentialStore, FileCredentialStore, SessionManager, TokenAuthority};
use crate::config::Config;
use crate::gateway::{RequestGateway, UnauthorizedInterceptor};
use crate::jobs::JobClient;
use crate::users::UserClient;

/// Assembled client for one backend deployment.
///
/// Owns the session manager and the request gateway; job and user calls share
/// the session's credential slot and its forced-logout behavior. The session
/// is installed as the gateway's 401 interceptor, so an unauthorized response
/// from any endpoint clears the credential slot before the rejection reaches
/// the caller.
pub struct KeyworkClient {
    session: Arc<SessionManager>,
    jobs: JobClient,
    users: UserClient,
}

impl KeyworkClient {
    /// Build a client backed by the default on-disk credential store.
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(FileCredentialStore::new_default()))
    }

    /// Build a client with an injected credential store.
    pub fn with_store(config: Config, store: Arc<dyn CredentialStore>) -> Self {
        let gateway = Arc::new(RequestGateway::new(&config.base_url, config.timeout));
        let authority = TokenAuthority::new(gateway.clone(), config.identity.clone());
        let session = Arc::new(SessionManager::new(authority, store));
        let interceptor_arc: Arc<dyn UnauthorizedInterceptor> = session.clone();
        let interceptor: Weak<dyn UnauthorizedInterceptor> = Arc::downgrade(&interceptor_arc);
        gateway.set_unauthorized_interceptor(interceptor);
        let jobs = JobClient::new(gateway.clone(), session.clone());
        let users = UserClient::new(gateway, session.clone());
        Self {
            session,
            jobs,
            users,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn jobs(&self) -> &JobClient {
        &self.jobs
    }

    pub fn users(&self) -> &UserClient {
        &self.users
    }
}
