use std::sync::Arc;

use strongbox_core::config::ConfigResolver;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum KeyringError {
    #[error("keyring error: {0}")]
    Keyring(String),
}

/// Resolver whose passphrase lives in the OS keyring (via the `keyring` crate).
///
/// The entry is read on every call. A missing or unreadable entry resolves to an
/// empty secret, which leaves encryption inactive.
#[derive(Debug, Clone)]
pub struct KeyringResolver {
    enabled: bool,
    service: String,
    account: String,
    entry: Arc<keyring::Entry>,
}

impl KeyringResolver {
    pub fn new(
        enabled: bool,
        service: impl Into<String>,
        account: impl Into<String>,
    ) -> Result<Self, KeyringError> {
        let service = service.into();
        let account = account.into();
        let entry = keyring::Entry::new(&service, &account)
            .map_err(|e| KeyringError::Keyring(e.to_string()))?;
        Ok(Self {
            enabled,
            service,
            account,
            entry: Arc::new(entry),
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Store `secret` in this resolver's keyring entry, replacing any previous value.
    pub fn store_secret(&self, secret: &str) -> Result<(), KeyringError> {
        self.entry
            .set_password(secret)
            .map_err(|e| KeyringError::Keyring(e.to_string()))
    }

    fn read_secret(&self) -> Result<String, KeyringError> {
        self.entry
            .get_password()
            .map_err(|e| KeyringError::Keyring(e.to_string()))
    }
}

impl ConfigResolver for KeyringResolver {
    fn encryption_enabled(&self) -> bool {
        self.enabled
    }

    fn secret(&self) -> String {
        match self.read_secret() {
            Ok(secret) => secret,
            Err(err) => {
                warn!(service = %self.service, %err, "keyring secret unavailable");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use strongbox_core::{
        config::EncryptionSettings,
        storage::{InMemoryKeyValueStore, KeyValueStore},
    };

    use super::*;
    use crate::encrypted_store::{EncryptedStore, Lookup};

    // The mock backend keeps the password on the entry itself, which the resolver shares.
    fn mock_resolver(enabled: bool) -> KeyringResolver {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeyringResolver::new(enabled, "strongbox-test", "passphrase").expect("mock entry")
    }

    #[test]
    fn flag_comes_from_construction() {
        let resolver = mock_resolver(false);
        assert!(!resolver.encryption_enabled());
        assert_eq!(resolver.service(), "strongbox-test");
        assert_eq!(resolver.account(), "passphrase");
    }

    #[test]
    fn stored_secret_is_read_back() {
        let resolver = mock_resolver(true);
        resolver.store_secret("s3cr3t").expect("store secret");

        assert_eq!(resolver.snapshot(), EncryptionSettings::new(true, "s3cr3t"));
        assert!(resolver.snapshot().is_active());

        resolver.store_secret("rotated").expect("replace secret");
        assert_eq!(resolver.secret(), "rotated");
    }

    #[test]
    fn missing_entry_leaves_encryption_inactive() {
        let resolver = mock_resolver(true);
        assert_eq!(resolver.secret(), "");
        assert!(!resolver.snapshot().is_active());
    }

    #[tokio::test]
    async fn store_encrypts_with_keyring_secret() {
        let resolver = mock_resolver(true);
        resolver.store_secret("s3cr3t").expect("store secret");
        let store = EncryptedStore::new(InMemoryKeyValueStore::new(), resolver);

        store.set("note", "hello").await.expect("set");
        let raw = store
            .backend()
            .get("note")
            .await
            .expect("backend get")
            .expect("record present");
        assert_ne!(raw, "hello");
        assert_eq!(store.get("note").await.into_value_or_empty().into_text(), "hello");
        assert!(matches!(store.get("note").await, Lookup::Found(_)));
    }
}
