#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keywork::auth::{ClientIdentity, Credential, CredentialStore};
use keywork::config::Config;
use keywork::error::Result;
use keywork::KeyworkClient;

/// `Basic base64("client:secret")` — the identity every test client uses.
pub const BASIC_HEADER: &str = "Basic Y2xpZW50OnNlY3JldA==";

#[derive(Default)]
pub struct InMemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
    clears: AtomicUsize,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, credential: Credential) {
        *self.slot.lock().expect("store lock poisoned") = Some(credential);
    }

    pub fn get(&self) -> Option<Credential> {
        self.slot.lock().expect("store lock poisoned").clone()
    }

    /// How many times `clear` has been invoked (forced logout included).
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.get())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot.lock().expect("store lock poisoned") = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

pub fn credential(access: &str, refresh: &str) -> Credential {
    Credential {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        subject: "ops@example.com".to_string(),
    }
}

pub fn client_against(uri: &str, store: Arc<InMemoryCredentialStore>) -> KeyworkClient {
    let config = Config::new(uri, ClientIdentity::new("client", "secret"));
    KeyworkClient::with_store(config, store)
}

/// Mount an introspection endpoint that reports every token active.
pub async fn mock_introspect_active(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/check_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "user_name": "ops@example.com"
        })))
        .mount(server)
        .await;
}

/// Mount an introspection endpoint that reports `token` expired, using the
/// authorization server's error text.
pub async fn mock_introspect_expired(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/oauth/check_token"))
        .and(body_string_contains(token))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_token",
            "error_description": "Token has expired"
        })))
        .mount(server)
        .await;
}

/// Mount a token endpoint answering refresh grants with a new pair,
/// expecting exactly `expected_calls` exchanges.
pub async fn mock_refresh_grant(server: &MockServer, access: &str, refresh: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}
