use strongbox_core::storage::StoreError;
use thiserror::Error;

/// Failures from key derivation, encryption, and frame parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The derivation parameters or key material were rejected.
    #[error("key derivation failed: {reason}")]
    KeyDerivation { reason: String },
    /// The cipher refused to encrypt the payload.
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },
    /// Tag verification failed: tampered data, wrong key, or wrong nonce.
    #[error("authentication failed")]
    Authentication,
    /// Persisted text is not a well-formed frame.
    #[error("malformed frame: {reason}")]
    FrameFormat { reason: String },
    /// Authenticated plaintext was not UTF-8 text.
    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors surfaced by `EncryptedStore` write operations.
#[derive(Debug, Error)]
pub enum EncryptedStoreError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
