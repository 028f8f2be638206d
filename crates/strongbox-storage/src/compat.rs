//! Flattening adapter with the historical store surface: reads never fail, they return
//! the empty sentinel; writes and deletes never fail, they become no-ops.

use strongbox_core::{config::ConfigResolver, storage::KeyValueStore, value::StoredValue};
use tracing::debug;

use crate::encrypted_store::EncryptedStore;

pub struct FlatteningStore<B: KeyValueStore, R: ConfigResolver> {
    inner: EncryptedStore<B, R>,
}

impl<B: KeyValueStore, R: ConfigResolver> FlatteningStore<B, R> {
    pub fn new(inner: EncryptedStore<B, R>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &EncryptedStore<B, R> {
        &self.inner
    }

    pub fn into_inner(self) -> EncryptedStore<B, R> {
        self.inner
    }

    /// Absent, corrupt, undecryptable, and unreachable records all read as empty text.
    pub async fn get_item(&self, key: &str) -> StoredValue {
        let lookup = self.inner.get(key).await;
        if !lookup.is_found() {
            debug!(key, outcome = lookup.label(), "flattened to empty");
        }
        lookup.into_value_or_empty()
    }

    pub async fn set_item(&self, key: &str, value: &str) {
        if let Err(err) = self.inner.set(key, value).await {
            debug!(key, %err, "write dropped");
        }
    }

    pub async fn remove_item(&self, key: &str) {
        if let Err(err) = self.inner.remove(key).await {
            debug!(key, %err, "remove dropped");
        }
    }

    pub async fn remove_items(&self, keys: &[String]) {
        for key in keys {
            self.remove_item(key).await;
        }
    }
}
