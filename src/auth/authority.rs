use std::sync::Arc;

use base64::Engine as _;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, RequestGateway};

const TOKEN_PATH: &str = "/oauth/token";
const INTROSPECT_PATH: &str = "/oauth/check_token";

/// Marker in the authorization server's rejection text that distinguishes an
/// expired access token from every other rejection reason.
const EXPIRY_MARKER: &str = "expired";

/// The application's own credential pair, used for HTTP Basic auth on every
/// token-endpoint call. Constant for the life of the process; it identifies
/// the client application, not the end user.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientIdentity {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Render the `Authorization: Basic ...` header value.
    pub fn basic_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

/// Decoded token-endpoint payload. Extra fields (token type, expiry, scope)
/// are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Decoded check-token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Introspection {
    #[serde(default = "active_default")]
    pub active: bool,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

fn active_default() -> bool {
    true
}

/// Client for the authorization server's token and introspection endpoints.
///
/// Performs the OAuth2 `password` and `refresh_token` grant exchanges and
/// token introspection, attaching the identical Basic header on every call.
pub struct TokenAuthority {
    gateway: Arc<RequestGateway>,
    identity: ClientIdentity,
}

impl TokenAuthority {
    pub fn new(gateway: Arc<RequestGateway>, identity: ClientIdentity) -> Self {
        Self { gateway, identity }
    }

    /// Exchange end-user credentials for a token pair.
    pub async fn password_grant(&self, username: &str, password: &str) -> Result<TokenGrant> {
        debug!(username, "password grant");
        self.token_request(vec![
            ("grant_type", "password".to_string()),
            ("username", username.to_string()),
            ("password", password.to_string()),
        ])
        .await
    }

    /// Exchange a refresh token for a fresh access token.
    pub async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenGrant> {
        debug!("refresh grant");
        self.token_request(vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
        ])
        .await
    }

    /// Ask the authorization server whether an access token is still active.
    ///
    /// A rejection whose error text marks expiry becomes [`ClientError::TokenExpired`];
    /// every other rejection becomes [`ClientError::AuthRejected`]. Transport
    /// failures pass through untouched.
    pub async fn introspect(&self, access_token: &str) -> Result<Introspection> {
        let request = ApiRequest::post(INTROSPECT_PATH)
            .basic(self.identity.clone())
            .form(vec![("token", access_token.to_string())]);
        match self.gateway.send::<Introspection>(request).await {
            Ok(info) if !info.active => {
                Err(ClientError::AuthRejected("token is not active".to_string()))
            }
            Ok(info) => Ok(info),
            Err(ClientError::Rejected { message, .. }) if is_expiry_message(&message) => {
                Err(ClientError::TokenExpired)
            }
            Err(ClientError::Rejected { message, .. }) => Err(ClientError::AuthRejected(message)),
            Err(other) => Err(other),
        }
    }

    async fn token_request(&self, fields: Vec<(&'static str, String)>) -> Result<TokenGrant> {
        let request = ApiRequest::post(TOKEN_PATH)
            .basic(self.identity.clone())
            .form(fields);
        match self.gateway.send(request).await {
            Ok(grant) => Ok(grant),
            Err(ClientError::Rejected { message, .. }) => Err(ClientError::AuthRejected(message)),
            Err(other) => Err(other),
        }
    }
}

fn is_expiry_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains(EXPIRY_MARKER)
}
