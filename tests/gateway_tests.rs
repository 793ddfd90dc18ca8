//! Response classification and the 401 forced-logout side effect.

mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keywork::auth::SessionState;
use keywork::error::ClientError;
use keywork::gateway::{ApiRequest, RequestGateway};

use support::{client_against, credential, mock_introspect_active, InMemoryCredentialStore};

fn gateway(uri: &str) -> RequestGateway {
    RequestGateway::new(uri, Duration::from_secs(5))
}

#[tokio::test]
async fn success_with_body_decodes_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(42)))
        .mount(&server)
        .await;

    let value: i64 = gateway(&server.uri())
        .send(ApiRequest::get("/api/value"))
        .await
        .expect("send");

    assert_eq!(value, 42);
}

#[tokio::test]
async fn success_with_empty_body_is_unit() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/ack"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    gateway(&server.uri())
        .send_unit(ApiRequest::put("/api/ack"))
        .await
        .expect("send_unit");
}

#[tokio::test]
async fn undecodable_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/value"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result: Result<i64, _> = gateway(&server.uri()).send(ApiRequest::get("/api/value")).await;

    assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
}

#[tokio::test]
async fn rejection_extracts_message_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/value"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "backend fell over"
        })))
        .mount(&server)
        .await;

    let result: Result<i64, _> = gateway(&server.uri()).send(ApiRequest::get("/api/value")).await;

    match result {
        Err(ClientError::Rejected { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "backend fell over");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn rejection_without_body_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/value"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result: Result<i64, _> = gateway(&server.uri()).send(ApiRequest::get("/api/value")).await;

    match result {
        Err(ClientError::Rejected { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_without_interceptor_still_surfaces_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/value"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result: Result<i64, _> = gateway(&server.uri()).send(ApiRequest::get("/api/value")).await;

    assert!(matches!(
        result,
        Err(ClientError::Rejected { status: 401, .. })
    ));
}

#[tokio::test]
async fn timeout_expiry_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let result: Result<i64, _> = gateway(&server.uri())
        .send(ApiRequest::get("/api/slow").timeout(Duration::from_millis(100)))
        .await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn no_response_is_a_transport_error() {
    // nothing listening on this port
    let result: Result<i64, _> = gateway("http://127.0.0.1:1")
        .send(ApiRequest::get("/api/value"))
        .await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn unauthorized_response_clears_credential_store_exactly_once() {
    let server = MockServer::start().await;
    mock_introspect_active(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/work/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_token",
            "error_description": "Full authentication is required"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    store.seed(credential("access-1", "refresh-1"));
    let client = client_against(&server.uri(), store.clone());

    let result = client.jobs().list().await;

    assert!(matches!(
        result,
        Err(ClientError::Rejected { status: 401, .. })
    ));
    assert!(store.get().is_none());
    assert_eq!(store.clear_count(), 1);
    assert_eq!(client.session().state(), SessionState::Anonymous);
}
