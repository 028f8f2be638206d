use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by backing key-value stores.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or refused the operation.
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Raw text key-value store that encrypted records are persisted into.
///
/// Implementations only need single-key write atomicity; no transactions are assumed.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw text stored under `key`, or `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Persist `value` under `key`, overwriting any existing entry.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key and its value (idempotent).
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every key in order, stopping at the first failure.
    async fn remove_many(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// In-memory backing store for tests and ephemeral sessions.
/// Clones share the same underlying map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKeyValueStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.inner.lock().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.inner.lock().map_err(poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.inner.lock().map_err(poisoned)?;
        map.remove(key);
        Ok(())
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Unavailable {
        reason: format!("lock poisoned: {err}"),
    }
}
