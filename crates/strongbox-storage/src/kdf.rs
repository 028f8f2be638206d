use std::fmt;

use hmac::Hmac;
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Iteration count used for every stored record.
pub const DEFAULT_ITERATIONS: u32 = 1 << 10;
/// Key size for AES-256.
pub const KEY_BITS: usize = 256;
/// PRF used for every stored record.
pub const DEFAULT_HASH: HashAlgorithm = HashAlgorithm::Sha256;

/// HMAC digest used as the PBKDF2 pseudo-random function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

/// Symmetric key material. Zeroed on drop; never logged.
#[derive(Clone)]
pub struct DerivedKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Stretch `secret` into `output_bits` of key material with PBKDF2-HMAC.
///
/// Deterministic in all five inputs. An empty secret is accepted; callers decide
/// whether that is meaningful.
pub fn derive_key(
    secret: &str,
    salt: &[u8],
    iterations: u32,
    hash: HashAlgorithm,
    output_bits: usize,
) -> Result<DerivedKey, CryptoError> {
    if iterations == 0 {
        return Err(CryptoError::KeyDerivation {
            reason: "iteration count must be positive".to_string(),
        });
    }
    if output_bits == 0 || output_bits % 8 != 0 {
        return Err(CryptoError::KeyDerivation {
            reason: format!("output length must be a positive multiple of 8 bits, got {output_bits}"),
        });
    }

    let mut out = Zeroizing::new(vec![0u8; output_bits / 8]);
    let password = secret.as_bytes();
    let result = match hash {
        HashAlgorithm::Sha256 => {
            pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, out.as_mut_slice())
        }
        HashAlgorithm::Sha384 => {
            pbkdf2::pbkdf2::<Hmac<Sha384>>(password, salt, iterations, out.as_mut_slice())
        }
        HashAlgorithm::Sha512 => {
            pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, iterations, out.as_mut_slice())
        }
    };
    result.map_err(|e| CryptoError::KeyDerivation {
        reason: e.to_string(),
    })?;

    Ok(DerivedKey { bytes: out })
}

/// Derive a 256-bit record key with the fixed production parameters.
pub fn derive_record_key(secret: &str, salt: &[u8]) -> Result<DerivedKey, CryptoError> {
    derive_key(secret, salt, DEFAULT_ITERATIONS, DEFAULT_HASH, KEY_BITS)
}
