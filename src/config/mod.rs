//! Client configuration (code over environment).

use std::time::Duration;

use crate::auth::ClientIdentity;
use crate::error::{ClientError, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for one keyword-extraction deployment.
///
/// The backend and its authorization server share a base URL; the client
/// identity authenticates the application itself on every token-endpoint
/// call.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub identity: ClientIdentity,
    /// Per-request timeout; expiry surfaces as a transport error.
    pub timeout: Duration,
}

impl Config {
    pub fn new(base_url: impl Into<String>, identity: ClientIdentity) -> Self {
        Self {
            base_url: base_url.into(),
            identity,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read settings from the environment: `KEYWORK_BASE_URL`,
    /// `KEYWORK_CLIENT_ID`, `KEYWORK_CLIENT_SECRET`, and optionally
    /// `KEYWORK_TIMEOUT_SECS`. Loads `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let base_url = require_env("KEYWORK_BASE_URL")?;
        let identity = ClientIdentity::new(
            require_env("KEYWORK_CLIENT_ID")?,
            require_env("KEYWORK_CLIENT_SECRET")?,
        );
        let mut config = Self::new(base_url, identity);
        if let Ok(raw) = std::env::var("KEYWORK_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                ClientError::Configuration(format!("KEYWORK_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ClientError::Configuration(format!("{name} is not set")))
}
