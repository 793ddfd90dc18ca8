//! OAuth2 session lifecycle: credential persistence, token-endpoint grants,
//! and the session state machine.

pub mod authority;
pub mod credential;
pub mod session;
pub mod store;

pub use authority::{ClientIdentity, Introspection, TokenAuthority, TokenGrant};
pub use credential::Credential;
pub use session::{SessionManager, SessionState};
pub use store::{CredentialStore, FileCredentialStore, StoreConfig};
