//! Two-scope key-value persistence.
//!
//! Records are JSON strings stored under string keys, either in the durable
//! scope (survives restarts) or the session scope (lives as long as the
//! process). Reads and writes are whole-record read-modify-write sequences:
//! two writers racing on the same key resolve as last-write-wins.

pub mod keys;
mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{DEFAULT_CREDENTIALS, DEFAULT_DATABASE_NAME, DEFAULT_POOL_SIZE, PostgresStore};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Storage area a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Survives a restart.
    Durable,
    /// Cleared with the process.
    Session,
}

impl Scope {
    /// The other scope.
    pub fn other(self) -> Self {
        match self {
            Scope::Durable => Scope::Session,
            Scope::Session => Scope::Durable,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Durable => write!(f, "durable"),
            Scope::Session => write!(f, "session"),
        }
    }
}

/// Raw string key-value backend.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read raw value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace value under `key`.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Both scopes, injected into every learner component.
///
/// Typed accessors never fail: missing keys, backend failures and JSON
/// that does not match the expected shape are all reported as absent.
#[derive(Clone)]
pub struct SessionStore {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Create a new [`SessionStore`].
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self { durable, session }
    }

    /// Both scopes kept in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()), Arc::new(MemoryStore::default()))
    }

    /// Backend for `scope`.
    pub fn scope(&self, scope: Scope) -> &dyn KeyValueStore {
        match scope {
            Scope::Durable => self.durable.as_ref(),
            Scope::Session => self.session.as_ref(),
        }
    }

    /// Read and decode a record.
    pub async fn read<T: DeserializeOwned>(&self, scope: Scope, key: &str) -> Option<T> {
        let raw = match self.scope(scope).get(key).await {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::error!(%scope, key, error = %err, "storage read failed");
                return None;
            },
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(%scope, key, error = %err, "malformed record treated as absent");
                None
            },
        }
    }

    /// Whether a raw value exists under `key`, parseable or not.
    pub async fn contains(&self, scope: Scope, key: &str) -> bool {
        matches!(self.scope(scope).get(key).await, Ok(Some(_)))
    }

    /// Encode and write a record.
    pub async fn write<T: Serialize>(&self, scope: Scope, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(%scope, key, error = %err, "cannot encode record");
                return false;
            },
        };

        match self.scope(scope).set(key, raw).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(%scope, key, error = %err, "storage write failed");
                false
            },
        }
    }

    /// Delete a record.
    pub async fn remove(&self, scope: Scope, key: &str) -> bool {
        match self.scope(scope).remove(key).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(%scope, key, error = %err, "storage delete failed");
                false
            },
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
