//! Stateless request layer shared by every backend endpoint.
//!
//! Builds outgoing requests (auth header, JSON/form/multipart body), sends
//! them, and classifies the response into a single result shape. The
//! classification is identical for every route; the only side effect is the
//! unauthorized-interceptor stage invoked on a 401 before the rejection is
//! surfaced to the caller.

use std::sync::{RwLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::ClientIdentity;
use crate::error::{ClientError, Result};

/// Middleware stage notified when any endpoint answers 401, before the
/// rejection reaches the caller. The session manager implements this with
/// its forced-logout path.
#[async_trait]
pub trait UnauthorizedInterceptor: Send + Sync {
    async fn on_unauthorized(&self);
}

/// How a request authenticates itself.
#[derive(Debug, Clone)]
pub enum AuthScheme {
    None,
    Basic(ClientIdentity),
    Bearer(String),
}

/// Outgoing request body.
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(&'static str, String)>),
    Multipart(reqwest::multipart::Form),
}

/// A request descriptor the gateway knows how to send.
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    auth: AuthScheme,
    body: RequestBody,
    timeout: Option<Duration>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            auth: AuthScheme::None,
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn basic(mut self, identity: ClientIdentity) -> Self {
        self.auth = AuthScheme::Basic(identity);
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthScheme::Bearer(token.into());
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn form(mut self, fields: Vec<(&'static str, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Override the gateway's default per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Sends [`ApiRequest`]s and normalizes responses and errors.
pub struct RequestGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    interceptor: RwLock<Option<Weak<dyn UnauthorizedInterceptor>>>,
}

impl RequestGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            interceptor: RwLock::new(None),
        }
    }

    /// Install the stage notified on 401 responses. Held weakly so the
    /// session manager can reach the gateway through the token authority
    /// without forming a reference cycle.
    pub fn set_unauthorized_interceptor(&self, interceptor: Weak<dyn UnauthorizedInterceptor>) {
        *self
            .interceptor
            .write()
            .expect("interceptor lock poisoned") = Some(interceptor);
    }

    /// Send a request and decode its JSON payload.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.dispatch(request).await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(self.classify(status, &text).await);
        }
        serde_json::from_str(&text)
            .map_err(|err| ClientError::InvalidResponse(format!("undecodable payload: {err}")))
    }

    /// Send a request whose success carries no payload.
    pub async fn send_unit(&self, request: ApiRequest) -> Result<()> {
        let response = self.dispatch(request).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.classify(status, &text).await);
        }
        Ok(())
    }

    /// Send a request and return the raw body as a chunk stream.
    pub async fn send_bytes_stream(
        &self,
        request: ApiRequest,
    ) -> Result<BoxStream<'static, Result<Bytes>>> {
        let response = self.dispatch(request).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.classify(status, &text).await);
        }
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ClientError::from))
            .boxed())
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(request.timeout.unwrap_or(self.timeout));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.auth {
            AuthScheme::None => builder,
            AuthScheme::Basic(identity) => builder.header(AUTHORIZATION, identity.basic_header()),
            AuthScheme::Bearer(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        };
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart(form) => builder.multipart(form),
        };
        debug!(method = %request.method, path = %request.path, "dispatching request");
        Ok(builder.send().await?)
    }

    /// Classify a non-2xx response. Invokes the unauthorized interceptor on
    /// 401 before the rejection is returned.
    async fn classify(&self, status: StatusCode, body: &str) -> ClientError {
        if status == StatusCode::UNAUTHORIZED {
            self.notify_unauthorized().await;
        }
        ClientError::Rejected {
            status: status.as_u16(),
            message: extract_message(body).unwrap_or_else(|| status_text(status)),
        }
    }

    async fn notify_unauthorized(&self) {
        let interceptor = self
            .interceptor
            .read()
            .expect("interceptor lock poisoned")
            .clone();
        if let Some(weak) = interceptor {
            if let Some(stage) = weak.upgrade() {
                warn!("endpoint answered 401; invoking forced-logout stage");
                stage.on_unauthorized().await;
            }
        }
    }
}

/// Pull a human-readable message out of an error body, if it has one.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for field in ["message", "error_description", "error"] {
        if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string()
}
