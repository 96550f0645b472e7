//! # Client Error Types
//!
//! Error types for everything that talks to the backend or to token storage.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Plumbing      │  │   Operations    │  │     Setup               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  TransportError │  │  AuthError      │  │  ConfigError            │ │
//! │  │  StorageError   │  │  FetchError     │  │                         │ │
//! │  │                 │  │  OrderError     │  │                         │ │
//! │  │                 │  │  AdminError     │  │                         │ │
//! │  └────────┬────────┘  └────────▲────────┘  └─────────────────────────┘ │
//! │           │    From impls      │                                        │
//! │           └────────────────────┘                                        │
//! │                                                                         │
//! │  Every operation error is returned to the caller or parked in store     │
//! │  state. None of them panic and none are retried.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_core::ValidationError;
use thiserror::Error;

// =============================================================================
// Transport
// =============================================================================

/// A request that did not produce a usable 2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server could not be reached or the connection broke.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request could not be built (bad URL, unserializable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A 2xx body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Persistent key-value storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// The backing file exists but is not a JSON string map.
    #[error("Storage file is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}

// =============================================================================
// Session
// =============================================================================

/// Login and registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Rejected locally, no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server refused the credentials (401).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Any other non-success answer (duplicate email, missing fields, ...).
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(TransportError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Malformed server response: {0}")]
    MalformedResponse(String),
}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status: 401, .. } => AuthError::InvalidCredentials,
            TransportError::Status { status, message } => AuthError::Rejected { status, message },
            TransportError::Decode(reason) => AuthError::MalformedResponse(reason),
            other => AuthError::Transport(other),
        }
    }
}

// =============================================================================
// Data Reads
// =============================================================================

/// A failed data read; stored in `FetchState::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, message } => FetchError::Status { status, message },
            TransportError::Decode(reason) => FetchError::Decode(reason),
            TransportError::Connection(reason) | TransportError::InvalidRequest(reason) => {
                FetchError::Network(reason)
            }
        }
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Order submission failures. The cart is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Sign in to place an order")]
    NotAuthenticated,

    #[error("Cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Order rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(TransportError),
}

impl From<TransportError> for OrderError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, message } => OrderError::Rejected { status, message },
            other => OrderError::Transport(other),
        }
    }
}

// =============================================================================
// Admin
// =============================================================================

/// Administrative session and product management failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// No admin token stored; nothing was sent.
    #[error("Administrator is not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Bad admin credentials, or the admin token was refused.
    #[error("Administrator credentials rejected")]
    Unauthorized,

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(TransportError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Malformed server response: {0}")]
    MalformedResponse(String),
}

impl From<TransportError> for AdminError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status: 401, .. } => AdminError::Unauthorized,
            TransportError::Status { status, message } => AdminError::Rejected { status, message },
            TransportError::Decode(reason) => AdminError::MalformedResponse(reason),
            other => AdminError::Transport(other),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for ConfigError {
    fn from(err: url::ParseError) -> Self {
        ConfigError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> TransportError {
        TransportError::Status {
            status,
            message: "nope".into(),
        }
    }

    #[test]
    fn test_auth_error_from_transport() {
        assert_eq!(AuthError::from(status(401)), AuthError::InvalidCredentials);
        assert_eq!(
            AuthError::from(status(409)),
            AuthError::Rejected {
                status: 409,
                message: "nope".into()
            }
        );
        assert!(matches!(
            AuthError::from(TransportError::Connection("refused".into())),
            AuthError::Transport(_)
        ));
    }

    #[test]
    fn test_fetch_error_keeps_status() {
        let err = FetchError::from(status(404));
        assert_eq!(err.to_string(), "Server returned 404: nope");
    }

    #[test]
    fn test_admin_unauthorized() {
        assert_eq!(AdminError::from(status(401)), AdminError::Unauthorized);
        assert!(status(401).is_unauthorized());
        assert_eq!(TransportError::Decode("x".into()).status(), None);
    }
}
