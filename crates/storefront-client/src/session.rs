//! # Session Store
//!
//! Who is logged in, reconciled with the stored token.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Lifecycle                                 │
//! │                                                                         │
//! │              no stored token                                            │
//! │   Unknown ───────────────────────────────────────► Anonymous            │
//! │      │                                               ▲   │              │
//! │      │ stored token                 /auth/me fails   │   │ login ok     │
//! │      ▼                              (token deleted)  │   │ (token saved │
//! │   Verifying ─────────────────────────────────────────┘   │  first)      │
//! │      │                                                   ▼              │
//! │      └──────── /auth/me ok ────────────────────► Authenticated          │
//! │                                                       │                 │
//! │                                      logout           │                 │
//! │                                      (token deleted)  ▼                 │
//! │                                                   Anonymous             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Invariant
//! Once a transition completes, storage holds a token iff the status is
//! `Authenticated`. Token writes happen before the status flips to
//! `Authenticated`; token deletes happen before `logout` returns.
//!
//! The in-memory state lives in a `tokio::sync::watch` channel, so any
//! number of observers can `subscribe()` and react to changes.

use serde::{Deserialize, Serialize};
use serde_json::json;
use storefront_core::validation::{validate_login, validate_registration};
use storefront_core::{Registration, UserProfile};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{AuthError, StorageError};
use crate::storage::TokenSlot;
use crate::transport::{ApiRequest, Auth};

// =============================================================================
// Session State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Bootstrap has not run yet.
    #[default]
    Unknown,

    /// A stored token is being checked against `/auth/me`.
    Verifying,

    Anonymous,

    Authenticated,
}

impl SessionStatus {
    /// True once bootstrap has reached a final answer.
    pub fn is_settled(&self) -> bool {
        matches!(self, SessionStatus::Anonymous | SessionStatus::Authenticated)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Unknown => write!(f, "unknown"),
            SessionStatus::Verifying => write!(f, "verifying"),
            SessionStatus::Anonymous => write!(f, "anonymous"),
            SessionStatus::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Snapshot of the session.
///
/// `user` is `Some` iff `status == Authenticated`. The token itself is
/// not kept here; storage is its only home.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub status: SessionStatus,
    pub user: Option<UserProfile>,
}

impl Session {
    fn anonymous() -> Self {
        Session {
            status: SessionStatus::Anonymous,
            user: None,
        }
    }

    fn authenticated(user: UserProfile) -> Self {
        Session {
            status: SessionStatus::Authenticated,
            user: Some(user),
        }
    }
}

/// `POST /auth/login` response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: UserProfile,
}

// =============================================================================
// SessionStore
// =============================================================================

/// The ordinary (customer) session. One per running client.
pub struct SessionStore {
    api: ApiClient,
    token: TokenSlot,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// Starts in `Unknown`; call [`SessionStore::bootstrap`] once at startup.
    pub fn new(api: ApiClient) -> Self {
        let token = api.session_token().clone();
        let (state, _) = watch::channel(Session::default());
        SessionStore { api, token, state }
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Reconciles the stored token with the server and returns the settled
    /// status.
    ///
    /// ## Flow
    /// 1. No token (or unreadable storage): `Unknown → Anonymous`, no request
    /// 2. Token present: `Unknown → Verifying`, then `GET /auth/me`
    /// 3. Profile returned: `Authenticated`
    /// 4. Any failure: token deleted, `Anonymous`
    ///
    /// A second call after the store left `Unknown` does nothing. If
    /// `logout()` runs while the check is in flight, its result is dropped.
    pub async fn bootstrap(&self) -> SessionStatus {
        let stored = match self.token.load() {
            Ok(token) => token,
            Err(err) => {
                warn!(%err, "Could not read stored session; starting anonymous");
                None
            }
        };

        let next = if stored.is_some() {
            SessionStatus::Verifying
        } else {
            SessionStatus::Anonymous
        };
        let started = self.state.send_if_modified(|session| {
            if session.status != SessionStatus::Unknown {
                return false;
            }
            session.status = next;
            true
        });
        if !started {
            debug!(status = %self.status(), "Bootstrap already ran");
            return self.status();
        }

        let Some(token) = stored else {
            info!("No stored session");
            return SessionStatus::Anonymous;
        };

        debug!("Verifying stored session");
        let verified = self
            .api
            .send_json::<UserProfile>(ApiRequest::get("/auth/me").with_auth(Auth::Bearer(token)))
            .await;

        match verified {
            Ok(user) => {
                let user_id = user.id;
                let applied = self.state.send_if_modified(|session| {
                    if session.status != SessionStatus::Verifying {
                        return false;
                    }
                    *session = Session::authenticated(user);
                    true
                });
                if applied {
                    info!(user_id, "Session restored");
                } else {
                    debug!("Session changed during verification; profile discarded");
                }
            }
            Err(err) => {
                if self.status() == SessionStatus::Verifying {
                    warn!(%err, "Stored session rejected; clearing token");
                    if let Err(err) = self.token.clear() {
                        warn!(%err, "Failed to delete rejected token");
                    }
                    self.state.send_if_modified(|session| {
                        if session.status != SessionStatus::Verifying {
                            return false;
                        }
                        *session = Session::anonymous();
                        true
                    });
                }
            }
        }

        self.status()
    }

    /// Waits until bootstrap has settled and returns the status.
    pub async fn ready(&self) -> SessionStatus {
        let mut receiver = self.state.subscribe();
        let settled = receiver
            .wait_for(|session| session.status.is_settled())
            .await
            .map(|session| session.status);
        settled.unwrap_or_else(|_| self.status())
    }

    // =========================================================================
    // Login / Register / Logout
    // =========================================================================

    /// Exchanges credentials for a token.
    ///
    /// The token is written to storage before the status becomes
    /// `Authenticated`. On any error the session is left as it was.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<UserProfile, AuthError> {
        validate_login(identifier, secret)?;

        let request = ApiRequest::post(
            "/auth/login",
            json!({ "email": identifier.trim(), "password": secret }),
        );
        let response: LoginResponse = self.api.send_json(request).await?;

        self.token.save(&response.access_token)?;
        self.state
            .send_replace(Session::authenticated(response.user.clone()));

        info!(user_id = response.user.id, "Logged in");
        Ok(response.user)
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, form: &Registration) -> Result<(), AuthError> {
        validate_registration(form)?;

        self.api
            .send(ApiRequest::post_json("/auth/register", form)?)
            .await?;

        info!("Account registered");
        Ok(())
    }

    /// Forgets the session immediately.
    ///
    /// The status is `Anonymous` afterwards no matter what; a failure to
    /// delete the stored token is still reported.
    pub fn logout(&self) -> Result<(), StorageError> {
        let cleared = self.token.clear();
        self.state.send_replace(Session::anonymous());

        match &cleared {
            Ok(()) => info!("Logged out"),
            Err(err) => warn!(%err, "Logged out but the stored token could not be deleted"),
        }
        cleared
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// Change feed for observers.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::testing::{RecordingStore, StubTransport};
    use crate::transport::Method;
    use std::sync::Arc;

    struct Fixture {
        stub: Arc<StubTransport>,
        store: Arc<MemoryStore>,
        session: SessionStore,
    }

    fn fixture() -> Fixture {
        let stub = StubTransport::new();
        let store = Arc::new(MemoryStore::new());
        let slot = TokenSlot::session(store.clone());
        let session = SessionStore::new(ApiClient::new(stub.clone(), slot));
        Fixture { stub, store, session }
    }

    fn user_json() -> serde_json::Value {
        json!({"id": 1, "name": "U", "email": "u1@example.com"})
    }

    #[tokio::test]
    async fn test_bootstrap_without_token_skips_network() {
        let f = fixture();
        assert_eq!(f.session.status(), SessionStatus::Unknown);

        assert_eq!(f.session.bootstrap().await, SessionStatus::Anonymous);
        assert_eq!(f.stub.request_count(), 0);
        assert!(f.session.user().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_restores_valid_token() {
        let f = fixture();
        f.store.set("token", "tok123").unwrap();
        f.stub.respond(Method::Get, "/auth/me", 200, user_json());

        assert_eq!(f.session.bootstrap().await, SessionStatus::Authenticated);
        assert_eq!(f.session.user().map(|u| u.id), Some(1));
        assert_eq!(f.stub.requests()[0].auth, Auth::Bearer("tok123".into()));
        assert_eq!(f.store.get("token").unwrap().as_deref(), Some("tok123"));
    }

    #[tokio::test]
    async fn test_bootstrap_rejected_token_passes_through_verifying() {
        let f = fixture();
        f.store.set("token", "expired").unwrap();
        let gate = f.stub.gate(Method::Get, "/auth/me");

        let mut changes = f.session.subscribe();
        let (status, _) = tokio::join!(f.session.bootstrap(), async {
            changes.changed().await.unwrap();
            assert_eq!(changes.borrow_and_update().status, SessionStatus::Verifying);
            gate.release(401, json!({"msg": "Token has expired"}));
        });

        assert_eq!(status, SessionStatus::Anonymous);
        assert_eq!(f.store.get("token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_bootstrap_network_failure_clears_token() {
        let f = fixture();
        f.store.set("token", "tok").unwrap();
        f.stub.fail(
            Method::Get,
            "/auth/me",
            TransportError::Connection("refused".into()),
        );

        assert_eq!(f.session.bootstrap().await, SessionStatus::Anonymous);
        assert_eq!(f.store.get("token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_bootstrap_is_noop() {
        let f = fixture();
        f.session.bootstrap().await;

        f.store.set("token", "late").unwrap();
        assert_eq!(f.session.bootstrap().await, SessionStatus::Anonymous);
        assert_eq!(f.stub.request_count(), 0);
    }

    #[tokio::test]
    async fn test_logout_during_verification_wins() {
        let f = fixture();
        f.store.set("token", "tok123").unwrap();
        let gate = f.stub.gate(Method::Get, "/auth/me");

        let (status, _) = tokio::join!(f.session.bootstrap(), async {
            f.session.logout().unwrap();
            gate.release(200, user_json());
        });

        assert_eq!(status, SessionStatus::Anonymous);
        assert!(f.session.user().is_none());
        assert_eq!(f.store.get("token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_stores_token_then_authenticates() {
        let f = fixture();
        f.session.bootstrap().await;
        f.stub.respond(
            Method::Post,
            "/auth/login",
            200,
            json!({"access_token": "tok123", "user": {"id": 1, "name": "U"}}),
        );

        let user = f.session.login("u1", "p1").await.unwrap();

        assert_eq!(user.id, 1);
        assert!(f.session.is_authenticated());
        assert_eq!(f.store.get("token").unwrap().as_deref(), Some("tok123"));
        assert_eq!(
            f.stub.requests()[0].body,
            Some(json!({"email": "u1", "password": "p1"}))
        );
    }

    #[tokio::test]
    async fn test_login_writes_token_before_status_flips() {
        let stub = StubTransport::new();
        let store = RecordingStore::new();
        let session = SessionStore::new(ApiClient::new(
            stub.clone(),
            TokenSlot::session(store.clone()),
        ));
        session.bootstrap().await;
        stub.respond(
            Method::Post,
            "/auth/login",
            200,
            json!({"access_token": "tok123", "user": {"id": 1, "name": "U"}}),
        );

        let status = session.subscribe();
        store.observe(move || status.borrow().status == SessionStatus::Authenticated);

        let mut changes = session.subscribe();
        let reader = store.clone();
        let (login, stored_when_authenticated) = tokio::join!(session.login("u1", "p1"), async move {
            changes
                .wait_for(|s| s.status == SessionStatus::Authenticated)
                .await
                .unwrap();
            reader.get("token").unwrap()
        });

        login.unwrap();
        assert_eq!(stored_when_authenticated.as_deref(), Some("tok123"));
        // the single write happened while the session was still anonymous
        assert_eq!(store.writes(), vec![("token".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_login_failure_leaves_state_unchanged() {
        let f = fixture();
        f.session.bootstrap().await;
        f.stub.respond(
            Method::Post,
            "/auth/login",
            401,
            json!({"error": "invalid_credentials"}),
        );

        let err = f.session.login("u1", "wrong").await.unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(f.session.status(), SessionStatus::Anonymous);
        assert_eq!(f.store.get("token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_validation_sends_nothing() {
        let f = fixture();
        let err = f.session.login("", "p1").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(f.stub.request_count(), 0);
    }

    #[tokio::test]
    async fn test_register_does_not_log_in() {
        let f = fixture();
        f.session.bootstrap().await;
        f.stub.respond(
            Method::Post,
            "/auth/register",
            201,
            json!({"id": 5, "email": "a@b.c", "username": "a"}),
        );

        f.session
            .register(&Registration::new("a@b.c", "pw"))
            .await
            .unwrap();
        assert_eq!(f.session.status(), SessionStatus::Anonymous);

        f.stub.respond(
            Method::Post,
            "/auth/register",
            409,
            json!({"error": "email_already_registered"}),
        );
        let err = f
            .session
            .register(&Registration::new("a@b.c", "pw"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::Rejected {
                status: 409,
                message: "email_already_registered".into()
            }
        );
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let f = fixture();
        f.store.set("token", "tok123").unwrap();
        f.stub.respond(Method::Get, "/auth/me", 200, user_json());
        f.session.bootstrap().await;

        f.session.logout().unwrap();

        assert_eq!(f.session.snapshot(), Session::anonymous());
        assert_eq!(f.store.get("token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_ready_waits_for_bootstrap() {
        let f = fixture();
        f.store.set("token", "tok123").unwrap();
        let gate = f.stub.gate(Method::Get, "/auth/me");

        let (ready, _, _) = tokio::join!(f.session.ready(), f.session.bootstrap(), async {
            gate.release(200, user_json());
        });
        assert_eq!(ready, SessionStatus::Authenticated);
    }
}
