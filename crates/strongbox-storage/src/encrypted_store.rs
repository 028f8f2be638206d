use serde::Serialize;
use strongbox_core::{
    config::{ConfigResolver, EncryptionSettings},
    storage::KeyValueStore,
    value::StoredValue,
};
use tracing::{debug, instrument, warn};

use crate::{
    error::{CryptoError, EncryptedStoreError},
    frame,
};

/// Outcome of a read. Distinguishes a missing key from data that could not be recovered.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(StoredValue),
    NotFound,
    /// Tag verification failed; usually a wrong secret or tampered record.
    DecryptionFailed,
    /// The record is not a readable frame.
    Corrupt,
    /// The backing store could not be read.
    Unavailable,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn into_option(self) -> Option<StoredValue> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Collapse every non-`Found` outcome into the empty sentinel.
    pub fn into_value_or_empty(self) -> StoredValue {
        self.into_option().unwrap_or_else(StoredValue::empty)
    }

    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Lookup::Found(_) => "found",
            Lookup::NotFound => "not found",
            Lookup::DecryptionFailed => "decryption failed",
            Lookup::Corrupt => "corrupt",
            Lookup::Unavailable => "unavailable",
        }
    }

    fn from_crypto(err: &CryptoError) -> Self {
        match err {
            CryptoError::Authentication | CryptoError::KeyDerivation { .. } => {
                Lookup::DecryptionFailed
            }
            CryptoError::FrameFormat { .. }
            | CryptoError::InvalidUtf8
            | CryptoError::Encryption { .. } => Lookup::Corrupt,
        }
    }
}

/// Key-value facade that encrypts values when the live configuration asks for it.
///
/// The encryption mode is evaluated on every call, so records written in one mode
/// are not readable in the other: an encrypted record read with encryption off comes
/// back as its base64 frame text, and a plain record read with encryption on is `Corrupt`.
pub struct EncryptedStore<B: KeyValueStore, R: ConfigResolver> {
    backend: B,
    resolver: R,
}

impl<B: KeyValueStore, R: ConfigResolver> EncryptedStore<B, R> {
    pub fn new(backend: B, resolver: R) -> Self {
        Self { backend, resolver }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Read `key` using the resolver's current settings.
    pub async fn get(&self, key: &str) -> Lookup {
        let settings = self.resolver.snapshot();
        self.get_with(&settings, key).await
    }

    /// Write `value` under `key` using the resolver's current settings.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), EncryptedStoreError> {
        let settings = self.resolver.snapshot();
        self.set_with(&settings, key, value).await
    }

    /// Serialize `value` as JSON and write it under `key`.
    pub async fn set_json<T: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), EncryptedStoreError> {
        let text = serde_json::to_string(value)?;
        self.set(key, &text).await
    }

    /// Read `key` under an explicit settings snapshot.
    #[instrument(skip_all, fields(key = %key, encrypted = settings.is_active()))]
    pub async fn get_with(&self, settings: &EncryptionSettings, key: &str) -> Lookup {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no record");
                return Lookup::NotFound;
            }
            Err(err) => {
                warn!(%err, "backing store read failed");
                return Lookup::Unavailable;
            }
        };

        if !settings.is_active() {
            return Lookup::Found(StoredValue::parse(&raw));
        }

        match frame::open(&settings.secret, &raw) {
            Ok(plaintext) => Lookup::Found(StoredValue::parse(&plaintext)),
            Err(err) => {
                warn!(%err, "record could not be decrypted");
                Lookup::from_crypto(&err)
            }
        }
    }

    /// Write `value` under an explicit settings snapshot.
    #[instrument(skip_all, fields(key = %key, encrypted = settings.is_active()))]
    pub async fn set_with(
        &self,
        settings: &EncryptionSettings,
        key: &str,
        value: &str,
    ) -> Result<(), EncryptedStoreError> {
        let payload = if settings.is_active() {
            frame::seal(&settings.secret, value)?
        } else {
            value.to_string()
        };

        self.backend.set(key, &payload).await?;
        debug!(bytes = payload.len(), "record written");
        Ok(())
    }

    /// Delete `key`; absent keys are not an error.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn remove(&self, key: &str) -> Result<(), EncryptedStoreError> {
        self.backend.remove(key).await?;
        Ok(())
    }

    /// Delete every key in `keys`.
    #[instrument(skip_all, fields(count = keys.len()))]
    pub async fn remove_many(&self, keys: &[String]) -> Result<(), EncryptedStoreError> {
        self.backend.remove_many(keys).await?;
        Ok(())
    }
}
