//! Convenience re-exports for common use.

pub use crate::auth::{
    ClientIdentity, Credential, CredentialStore, FileCredentialStore, SessionManager, SessionState,
};
pub use crate::client::KeyworkClient;
pub use crate::config::Config;
pub use crate::error::{ClientError, Result};
pub use crate::jobs::{Job, JobClient, JobStatus, StatusReport, SubmitParameters};
pub use crate::users::{NewUser, UserAccount, UserClient};
