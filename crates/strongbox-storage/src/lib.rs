//! Encrypted key-value persistence.
//! PBKDF2-derived keys, AES-256-GCM, and a base64 `salt || nonce || ciphertext` frame
//! layered over any `KeyValueStore`.

pub mod cipher;
pub mod compat;
pub mod encrypted_store;
pub mod error;
pub mod file_store;
pub mod frame;
pub mod kdf;
pub mod keyring_resolver;

pub use encrypted_store::{EncryptedStore, Lookup};
pub use error::{CryptoError, EncryptedStoreError};
