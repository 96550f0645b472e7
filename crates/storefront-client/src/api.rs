//! # API Client
//!
//! Wraps a [`Transport`] with the two rules every call shares: how the
//! session credential is attached, and what counts as failure.
//!
//! ## Authorization Header Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request.auth        header sent                                        │
//! │  ────────────        ───────────                                        │
//! │  Anonymous           none                                               │
//! │  Session             Bearer <session token>, none if no token stored    │
//! │  Bearer(t)           Bearer t   (admin calls; session token never used) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::storage::TokenSlot;
use crate::transport::{ApiRequest, Auth, Transport};

/// Shared handle to the backend. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session_token: TokenSlot,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session_token: TokenSlot) -> Self {
        ApiClient {
            transport,
            session_token,
        }
    }

    /// The slot `Auth::Session` reads from.
    pub fn session_token(&self) -> &TokenSlot {
        &self.session_token
    }

    /// Sends `request`; non-2xx answers become [`TransportError::Status`].
    pub async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let request = self.resolve_auth(request);
        let method = request.method;
        let path = request.path.clone();

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let message = response.error_message();
            debug!(?method, %path, status = response.status, %message, "Request failed");
            return Err(TransportError::Status {
                status: response.status,
                message,
            });
        }

        debug!(?method, %path, status = response.status, "Request succeeded");
        Ok(response.body)
    }

    /// [`ApiClient::send`] and decode the body as `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, TransportError> {
        let body = self.send(request).await?;
        serde_json::from_value(body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// GET `locator` with the session credential attached when present.
    pub async fn get_json<T: DeserializeOwned>(&self, locator: &str) -> Result<T, TransportError> {
        self.send_json(ApiRequest::get(locator).with_auth(Auth::Session))
            .await
    }

    fn resolve_auth(&self, mut request: ApiRequest) -> ApiRequest {
        if request.auth == Auth::Session {
            request.auth = match self.session_token.load() {
                Ok(Some(token)) => Auth::Bearer(token),
                Ok(None) => Auth::Anonymous,
                Err(err) => {
                    warn!(%err, "Could not read session token; sending without it");
                    Auth::Anonymous
                }
            };
        }
        request
    }
}
