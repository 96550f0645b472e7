//! # HTTP Transport
//!
//! The seam between the stores and the network.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Request Path                                   │
//! │                                                                         │
//! │  Store ──► ApiRequest { method, path, query, body, auth }               │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  ApiClient: Auth::Session ──► Bearer(stored token) or Anonymous         │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  dyn Transport::send ──► ApiResponse { status, body }                   │
//! │       │                                                                 │
//! │       ├── HttpTransport (reqwest)          production                   │
//! │       └── scripted stub                    unit tests                   │
//! │                                                                         │
//! │  The transport never judges status codes; ApiClient does.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::error::TransportError;

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Which credential, if any, goes into the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// No header.
    Anonymous,

    /// The ordinary session token, looked up when the request is sent.
    Session,

    /// Exactly this token. Admin requests use it so they never pick up
    /// the ordinary session token.
    Bearer(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Anonymous => write!(f, "Anonymous"),
            Auth::Session => write!(f, "Session"),
            Auth::Bearer(_) => write!(f, "Bearer(..)"),
        }
    }
}

/// A backend call, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,

    /// Path below the base URL, e.g. `/products?q=lamp` or `/auth/me`.
    pub path: String,

    /// Extra query pairs, appended after any query already in `path`.
    pub query: Vec<(String, String)>,

    pub body: Option<Value>,

    pub auth: Auth,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: Auth::Anonymous,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// POST with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    /// POST with any serializable body.
    pub fn post_json<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, TransportError> {
        Ok(Self::post(path, encode(body)?))
    }

    /// PUT with any serializable body.
    pub fn put_json<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, TransportError> {
        Ok(Self::new(Method::Put, path).with_body(encode(body)?))
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }
}

fn encode<T: Serialize>(body: &T) -> Result<Value, TransportError> {
    serde_json::to_value(body).map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

/// Raw answer from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,

    /// Parsed JSON; empty bodies are `Null`, non-JSON bodies a JSON string.
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        ApiResponse { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable failure reason.
    ///
    /// The backend reports errors as `{"error": "invalid_credentials"}`.
    pub fn error_message(&self) -> String {
        match &self.body {
            Value::Object(map) => map
                .get("error")
                .or_else(|| map.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| self.status_text()),
            Value::String(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => self.status_text(),
        }
    }

    fn status_text(&self) -> String {
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("request failed")
            .to_string()
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Sends one request and returns whatever the server said.
///
/// Implementations return `Err` only when no response was obtained; any
/// HTTP status, including 4xx/5xx, is an `Ok(ApiResponse)`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// `base_url` must be an absolute http(s) URL; a trailing `/` is ignored.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidRequest(format!(
                "unsupported scheme in {}",
                base_url
            )));
        }

        Ok(HttpTransport {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL + path, then the extra query pairs.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let path = request.path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request)?;
        trace!(method = ?request.method, %url, "HTTP request");

        let mut builder = self.client.request(request.method.as_reqwest(), url);
        if let Auth::Bearer(token) = &request.auth {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }
}
