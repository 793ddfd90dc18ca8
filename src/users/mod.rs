//! User account endpoints, exercised through the same request gateway as the
//! job and session calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::SessionManager;
use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};

const REGISTER_PATH: &str = "/users/register";
const USERS_PATH: &str = "/users";

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
}

/// A provisioned account as returned by the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

pub struct UserClient {
    gateway: Arc<RequestGateway>,
    session: Arc<SessionManager>,
}

impl UserClient {
    pub fn new(gateway: Arc<RequestGateway>, session: Arc<SessionManager>) -> Self {
        Self { gateway, session }
    }

    /// Create an account. The endpoint is public; no bearer token attached.
    pub async fn register(&self, user: &NewUser) -> Result<()> {
        debug!(username = %user.username, "registering user");
        let request = ApiRequest::post(REGISTER_PATH).json(serde_json::to_value(user)?);
        self.gateway.send_unit(request).await
    }

    /// List accounts; bearer-authenticated.
    pub async fn list(&self) -> Result<Vec<UserAccount>> {
        let token = self.session.ensure_valid().await?.access_token;
        self.gateway.send(ApiRequest::get(USERS_PATH).bearer(token)).await
    }
}
