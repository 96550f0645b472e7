//! # storefront-client: State Synchronization Layer
//!
//! Everything between the storefront UI and the backend REST API: who is
//! logged in, what is in the cart, and which server data is currently
//! loaded.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      storefront-client Layout                           │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SessionStore   │  │  CartStore     │  │  AsyncResource<T>      │    │
//! │  │                │  │                │  │                        │    │
//! │  │ bootstrap once │  │ add / remove / │  │ one fetch per key,     │    │
//! │  │ login/register │  │ update / clear │  │ newest generation wins │    │
//! │  │ logout         │  │ derived total  │  │ stop() on teardown     │    │
//! │  └───────┬────────┘  └───────┬────────┘  └───────────┬────────────┘    │
//! │          │                   │                       │                  │
//! │          │    ┌──────────────▼───────┐   ┌───────────▼────────────┐    │
//! │          │    │ Checkout             │   │ Catalog                │    │
//! │          ├───►│ place_order, history │   │ products / product /   │    │
//! │          │    └──────────────┬───────┘   │ categories / brands    │    │
//! │          │                   │           └───────────┬────────────┘    │
//! │  ┌───────▼───────────────────▼───────────────────────▼────────────┐    │
//! │  │ ApiClient ──► dyn Transport ──► HttpTransport (reqwest)        │    │
//! │  └───────┬────────────────────────────────────────────────────────┘    │
//! │          │                                                              │
//! │  ┌───────▼────────┐      ┌────────────────┐                            │
//! │  │ TokenSlot      │      │ AdminSession   │  separate slot, explicit   │
//! │  │ "token"        │      │ "admin_token"  │  bearer on every call      │
//! │  └────────────────┘      └────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - `ApiClient`: status mapping and session credential resolution
//! - [`transport`] - `Transport` seam and the reqwest implementation
//! - [`storage`] - key-value stores and token slots
//! - [`session`] - customer session state machine
//! - [`admin`] - admin login and product management
//! - [`cart_store`] - observable cart
//! - [`resource`] - cancellable keyed fetches
//! - [`catalog`] - catalog locators and resources
//! - [`checkout`] - order submission and history
//! - [`config`] - `storefront.toml` + environment overrides
//! - [`error`] - error types per operation family
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_client::{ApiClient, ClientConfig, FileStore, HttpTransport, SessionStore, TokenSlot};
//!
//! let config = ClientConfig::load_or_default(None);
//! let path = config.storage.file("session.json").expect("no data directory");
//! let store = Arc::new(FileStore::new(path));
//! let transport = Arc::new(HttpTransport::new(&config.api.base_url)?);
//! let api = ApiClient::new(transport, TokenSlot::session(store));
//!
//! let session = SessionStore::new(api);
//! session.bootstrap().await;
//! println!("Session: {}", session.status());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admin;
pub mod api;
pub mod cart_store;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod resource;
pub mod session;
pub mod storage;
pub mod transport;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use admin::AdminSession;
pub use api::ApiClient;
pub use cart_store::CartStore;
pub use catalog::{prepend_product, Catalog, ProductFilter};
pub use checkout::Checkout;
pub use config::ClientConfig;
pub use error::{AdminError, AuthError, ConfigError, FetchError, OrderError, StorageError, TransportError};
pub use resource::{AsyncResource, FetchState, ResourceKey};
pub use session::{Session, SessionStatus, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TokenSlot};
pub use transport::{ApiRequest, ApiResponse, Auth, HttpTransport, Method, Transport};
