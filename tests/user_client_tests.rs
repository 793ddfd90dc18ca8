//! User registration and listing through the shared gateway.

mod support;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keywork::error::ClientError;
use keywork::users::NewUser;

use support::{client_against, credential, mock_introspect_active, InMemoryCredentialStore};

#[tokio::test]
async fn register_posts_json_without_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/register"))
        .and(body_json(json!({
            "username": "new-operator",
            "password": "hunter2",
            "name": "New Operator"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // no credential seeded: registration must not require a session
    let store = Arc::new(InMemoryCredentialStore::new());
    let client = client_against(&server.uri(), store);

    client
        .users()
        .register(&NewUser {
            username: "new-operator".to_string(),
            password: "hunter2".to_string(),
            name: "New Operator".to_string(),
        })
        .await
        .expect("register");
}

#[tokio::test]
async fn list_attaches_bearer_token() {
    let server = MockServer::start().await;
    mock_introspect_active(&server).await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "username": "ops@example.com", "name": "Ops", "role": "ADMIN"},
            {"id": 2, "username": "viewer@example.com"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    store.seed(credential("access-1", "refresh-1"));
    let client = client_against(&server.uri(), store);

    let users = client.users().list().await.expect("list");

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].role.as_deref(), Some("ADMIN"));
    assert!(users[1].role.is_none());
}

#[tokio::test]
async fn list_without_session_is_not_logged_in() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryCredentialStore::new());
    let client = client_against(&server.uri(), store);

    let result = client.users().list().await;

    assert!(matches!(result, Err(ClientError::NotLoggedIn)));
}
