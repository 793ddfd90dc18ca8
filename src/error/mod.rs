//! Error types for the keywork client.

use thiserror::Error;

/// Primary error type for all client operations.
///
/// The first five variants are the failure taxonomy surfaced to callers;
/// `Rejected` is the generic classified non-2xx outcome the request gateway
/// produces before a component maps it to something more specific.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Authorization rejected: {0}")]
    AuthRejected(String),

    #[error("Access token expired")]
    TokenExpired,

    #[error("Input rejected by the backend: {0}")]
    ValidationRejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Create a classified rejection.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a classified rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ClientError>;
