//! # Async Resource
//!
//! A cancellable fetch-and-cache cell for one piece of server data.
//!
//! ## Generation Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Out-of-order completion                              │
//! │                                                                         │
//! │  observe("/products?q=a")   gen 1 ──► request A ─────────────┐          │
//! │  observe("/products?q=ab")  gen 2 ──► request B ──┐          │          │
//! │                                                   ▼          │          │
//! │                              B resolves: gen 2 == 2 → APPLY   │          │
//! │                                                              ▼          │
//! │                              A resolves: gen 1 != 2 → DISCARD           │
//! │                                                                         │
//! │  Anything that bumps the generation (new key, refresh, stop, drop)      │
//! │  orphans every request issued before it.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The generation is bumped and checked while holding the state channel's
//! write lock, so a late completion can never interleave with a newer
//! `observe`.
//!
//! ## State Rules
//! | Event                    | data          | loading | error      |
//! |--------------------------|---------------|---------|------------|
//! | observe(present locator) | kept          | true    | cleared    |
//! | observe(absent locator)  | cleared       | false   | cleared    |
//! | current request ok       | replaced      | false   | cleared    |
//! | current request failed   | kept (stale)  | false   | set        |
//! | set_data / update_data   | overridden    | kept    | kept       |

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::FetchError;

// =============================================================================
// Key and State
// =============================================================================

/// What to fetch: a locator plus the extra values that force a refetch
/// when they change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    /// Path below the API base, e.g. `/products?q=lamp`. `None` means
    /// "nothing wanted right now".
    pub locator: Option<String>,

    pub deps: Vec<String>,
}

impl ResourceKey {
    pub fn new(locator: impl Into<String>) -> Self {
        ResourceKey {
            locator: Some(locator.into()),
            deps: Vec::new(),
        }
    }

    pub fn absent() -> Self {
        ResourceKey::default()
    }

    pub fn with_dep(mut self, dep: impl ToString) -> Self {
        self.deps.push(dep.to_string());
        self
    }
}

/// What observers see.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<FetchError>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState {
            data: None,
            loading: false,
            error: None,
        }
    }
}

// =============================================================================
// AsyncResource
// =============================================================================

struct Inner<T> {
    api: ApiClient,
    key: Mutex<Option<ResourceKey>>,
    generation: AtomicU64,
    state: watch::Sender<FetchState<T>>,
}

impl<T> Inner<T> {
    /// Applies a completed request if nothing newer was issued since.
    fn complete(&self, generation: u64, locator: &str, result: Result<T, FetchError>) {
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match result {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Err(err) => state.error = Some(err),
            }
            state.loading = false;
            true
        });

        if !applied {
            debug!(%locator, generation, "Discarding superseded response");
        }
    }
}

/// One observed server resource.
///
/// Must be driven from inside a Tokio runtime: requests run as spawned
/// tasks. Dropping the resource orphans any in-flight request.
pub struct AsyncResource<T> {
    inner: Arc<Inner<T>>,
}

impl<T> AsyncResource<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// An idle resource. Nothing is fetched until [`AsyncResource::observe`].
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        AsyncResource {
            inner: Arc::new(Inner {
                api,
                key: Mutex::new(None),
                generation: AtomicU64::new(0),
                state,
            }),
        }
    }

    /// Points the resource at `key`.
    ///
    /// Same key as before: nothing happens and `None` is returned.
    /// Otherwise the generation is bumped and, for a present locator, the
    /// request is spawned; the handle resolves once its result has been
    /// applied or discarded.
    pub fn observe(&self, key: ResourceKey) -> Option<JoinHandle<()>> {
        // held until the generation is bumped, so the last key stored is
        // always the last generation issued
        let mut current = self.lock_key();
        if current.as_ref() == Some(&key) {
            return None;
        }
        let locator = key.locator.clone();
        *current = Some(key);
        self.start(locator)
    }

    /// Re-issues the current key, superseding anything in flight.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        let current = self.lock_key();
        let locator = current.as_ref()?.locator.clone();
        self.start(locator)
    }

    /// Stops observing. In-flight results will be discarded; data stays.
    pub fn stop(&self) {
        let mut current = self.lock_key();
        *current = None;
        self.inner.state.send_modify(|state| {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            state.loading = false;
        });
    }

    /// Overrides `data` directly; `loading`, `error` and the generation
    /// are untouched.
    pub fn set_data(&self, data: T) {
        self.inner.state.send_modify(|state| state.data = Some(data));
    }

    /// Edits `data` in place (it may be `None` if nothing has loaded yet).
    pub fn update_data(&self, edit: impl FnOnce(&mut Option<T>)) {
        self.inner.state.send_modify(|state| edit(&mut state.data));
    }

    pub fn key(&self) -> Option<ResourceKey> {
        self.lock_key().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn error(&self) -> Option<FetchError> {
        self.inner.state.borrow().error.clone()
    }

    /// Change feed for observers.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    /// Callers hold the key lock; it is always taken before the state lock.
    fn start(&self, locator: Option<String>) -> Option<JoinHandle<()>> {
        let mut generation = 0;
        self.inner.state.send_modify(|state| {
            generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.error = None;
            if locator.is_some() {
                state.loading = true;
            } else {
                state.data = None;
                state.loading = false;
            }
        });

        let Some(locator) = locator else {
            debug!(generation, "Resource locator absent; nothing to fetch");
            return None;
        };

        debug!(%locator, generation, "Fetching resource");
        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move {
            let result = inner
                .api
                .get_json::<T>(&locator)
                .await
                .map_err(FetchError::from);
            inner.complete(generation, &locator, result);
        }))
    }

    fn lock_key(&self) -> std::sync::MutexGuard<'_, Option<ResourceKey>> {
        self.inner
            .key
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> AsyncResource<T> {
    pub fn state(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    /// Waits until no request is loading and returns the state.
    pub async fn settled(&self) -> FetchState<T> {
        let mut receiver = self.inner.state.subscribe();
        let settled = receiver
            .wait_for(|state| !state.loading)
            .await
            .map(|state| (*state).clone());
        settled.unwrap_or_else(|_| self.state())
    }
}

impl<T> Drop for AsyncResource<T> {
    fn drop(&mut self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
    }
}
