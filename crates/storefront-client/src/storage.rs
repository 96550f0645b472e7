//! # Persistent Token Storage
//!
//! String-valued key-value storage that outlives the process, plus
//! [`TokenSlot`], the one-key view the session stores use.
//!
//! ## Slots
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Token Slots                                     │
//! │                                                                         │
//! │   SessionStore ──► TokenSlot::session ──► key "token"                  │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                                     session store file                 │
//! │                                                                         │
//! │   AdminSession ──► TokenSlot::admin ────► key "admin_token"            │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                                     admin store file                   │
//! │                                                                         │
//! │  Presence of a value is the only thing bootstrap looks at.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are synchronous and complete before the call returns, so a caller
//! that flips in-memory state after `save`/`clear` never gets ahead of disk.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::error::StorageError;

/// Key holding the ordinary session token.
pub const SESSION_TOKEN_KEY: &str = "token";

/// Key holding the administrative session token.
pub const ADMIN_TOKEN_KEY: &str = "admin_token";

// =============================================================================
// KeyValueStore
// =============================================================================

/// Persistent string storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-local store; used in tests and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// JSON map on disk.
///
/// ## File Format
/// ```json
/// { "token": "eyJhbGciOi..." }
/// ```
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so a crash mid-write leaves either the old or the new map.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// `<platform data dir>/<file_name>`, e.g.
    /// `~/.local/share/storefront/session.json` on Linux.
    pub fn default_path(file_name: &str) -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.data_dir().join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = ?self.path, keys = map.len(), "Token store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = lock(&self.guard);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = lock(&self.guard);
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = lock(&self.guard);
        let mut map = self.read_map()?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

// =============================================================================
// TokenSlot
// =============================================================================

/// One named key in a [`KeyValueStore`].
#[derive(Clone)]
pub struct TokenSlot {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
}

impl TokenSlot {
    /// Ordinary session token slot.
    pub fn session(store: Arc<dyn KeyValueStore>) -> Self {
        TokenSlot {
            store,
            key: SESSION_TOKEN_KEY,
        }
    }

    /// Administrative token slot.
    pub fn admin(store: Arc<dyn KeyValueStore>) -> Self {
        TokenSlot {
            store,
            key: ADMIN_TOKEN_KEY,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Stored token; blank values count as absent.
    pub fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .store
            .get(self.key)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn save(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(self.key, token)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(self.key)
    }
}

/// Never prints the token.
impl fmt::Debug for TokenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSlot").field("key", &self.key).finish()
    }
}
