use serde::{Deserialize, Serialize};

/// The persisted session record: one token pair plus the identity it was
/// issued for.
///
/// A single instance exists at a time, owned by the credential store. It is
/// created on login, has its access token replaced on refresh, and is
/// destroyed on logout or a terminal authorization failure.
///
/// # Example
/// ```no_run
/// use keywork::auth::Credential;
///
/// let credential = Credential {
///     access_token: "access".to_string(),
///     refresh_token: "refresh".to_string(),
///     subject: "ops@example.com".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub subject: String,
}
