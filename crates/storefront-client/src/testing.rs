//! Scripted in-process [`Transport`] for unit tests, plus a store that
//! records what the rest of the client looked like at each write.
//!
//! Replies are queued per `(method, path)` and consumed in order. A gated
//! reply parks the request until the test releases it, which is how the
//! out-of-order completion tests control which response lands first.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::error::{StorageError, TransportError};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

type Reply = Result<ApiResponse, TransportError>;

enum Scripted {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

struct Route {
    method: Method,
    path: String,
    reply: Scripted,
}

/// Releases one gated reply.
pub struct Gate {
    sender: oneshot::Sender<Reply>,
}

impl Gate {
    pub fn release(self, status: u16, body: Value) {
        let _ = self.sender.send(Ok(ApiResponse::new(status, body)));
    }

    pub fn fail(self, err: TransportError) {
        let _ = self.sender.send(Err(err));
    }
}

#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<VecDeque<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Scripted::Ready(Ok(ApiResponse::new(status, body))));
    }

    pub fn fail(&self, method: Method, path: &str, err: TransportError) {
        self.push(method, path, Scripted::Ready(Err(err)));
    }

    /// Queues a reply that is only delivered once the returned gate is released.
    pub fn gate(&self, method: Method, path: &str) -> Gate {
        let (sender, receiver) = oneshot::channel();
        self.push(method, path, Scripted::Gated(receiver));
        Gate { sender }
    }

    /// Every request seen so far, with auth already resolved.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn push(&self, method: Method, path: &str, reply: Scripted) {
        self.routes.lock().unwrap().push_back(Route {
            method,
            path: path.to_string(),
            reply,
        });
    }

    fn take(&self, request: &ApiRequest) -> Option<Scripted> {
        let mut routes = self.routes.lock().unwrap();
        let index = routes
            .iter()
            .position(|r| r.method == request.method && r.path == request.path)?;
        routes.remove(index).map(|route| route.reply)
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        match self.take(&request) {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Gated(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(TransportError::Connection("gate dropped".into()))),
            None => Ok(ApiResponse::new(
                404,
                json!({ "error": format!("no stub for {:?} {}", request.method, request.path) }),
            )),
        }
    }
}

// =============================================================================
// Recording Store
// =============================================================================

type Observer = Box<dyn Fn() -> bool + Send + Sync>;

/// [`MemoryStore`] that evaluates an observer on every `set` and keeps
/// `(key, observer result)` per write.
pub struct RecordingStore {
    inner: MemoryStore,
    observer: Mutex<Option<Observer>>,
    writes: Mutex<Vec<(String, bool)>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingStore {
            inner: MemoryStore::new(),
            observer: Mutex::new(None),
            writes: Mutex::new(Vec::new()),
        })
    }

    pub fn observe(&self, observer: impl Fn() -> bool + Send + Sync + 'static) {
        *self.observer.lock().unwrap() = Some(Box::new(observer));
    }

    pub fn writes(&self) -> Vec<(String, bool)> {
        self.writes.lock().unwrap().clone()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let seen = self.observer.lock().unwrap().as_ref().map_or(false, |f| f());
        self.writes.lock().unwrap().push((key.to_string(), seen));
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}
