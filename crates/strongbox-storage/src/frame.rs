//! Self-describing record encoding: base64 of `salt(16) || nonce(12) || ciphertext+tag`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{
    cipher::{self, NONCE_LEN, SALT_LEN},
    error::CryptoError,
    kdf,
};

/// Smallest decodable frame: salt and nonce with an empty ciphertext segment.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;

/// Decoded frame parts. The tag travels inside `ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherFrame {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Concatenate the frame and encode it as padded standard base64.
pub fn encode(frame: &CipherFrame) -> String {
    let mut bytes = Vec::with_capacity(HEADER_LEN + frame.ciphertext.len());
    bytes.extend_from_slice(&frame.salt);
    bytes.extend_from_slice(&frame.nonce);
    bytes.extend_from_slice(&frame.ciphertext);
    STANDARD.encode(bytes)
}

/// Decode base64 text and split it at the fixed offsets.
pub fn decode(text: &str) -> Result<CipherFrame, CryptoError> {
    let bytes = STANDARD
        .decode(text)
        .map_err(|e| CryptoError::FrameFormat {
            reason: format!("base64 decode failed: {e}"),
        })?;

    if bytes.len() < HEADER_LEN {
        return Err(CryptoError::FrameFormat {
            reason: format!("expected at least {HEADER_LEN} bytes, got {}", bytes.len()),
        });
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&bytes[..SALT_LEN]);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&bytes[SALT_LEN..HEADER_LEN]);

    Ok(CipherFrame {
        salt,
        nonce,
        ciphertext: bytes[HEADER_LEN..].to_vec(),
    })
}

/// Encrypt `plaintext` under `secret` with a fresh salt and nonce, returning frame text.
pub fn seal(secret: &str, plaintext: &str) -> Result<String, CryptoError> {
    let salt = cipher::random_salt();
    let key = kdf::derive_record_key(secret, &salt)?;
    let nonce = cipher::random_nonce();
    let ciphertext = cipher::encrypt(&key, &nonce, plaintext.as_bytes())?;

    Ok(encode(&CipherFrame {
        salt,
        nonce,
        ciphertext,
    }))
}

/// Decode frame text, re-derive the key from its salt, and decrypt.
pub fn open(secret: &str, text: &str) -> Result<String, CryptoError> {
    let frame = decode(text)?;
    let key = kdf::derive_record_key(secret, &frame.salt)?;
    let plaintext = cipher::decrypt(&key, &frame.nonce, &frame.ciphertext)?;
    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::TAG_LEN;

    #[test]
    fn splits_at_fixed_offsets() {
        let frame = CipherFrame {
            salt: [1u8; SALT_LEN],
            nonce: [2u8; NONCE_LEN],
            ciphertext: vec![3, 4, 5],
        };
        let text = encode(&frame);
        let raw = STANDARD.decode(&text).expect("valid base64");
        assert_eq!(&raw[..16], &[1u8; 16]);
        assert_eq!(&raw[16..28], &[2u8; 12]);
        assert_eq!(&raw[28..], &[3, 4, 5]);

        assert_eq!(decode(&text).expect("decode"), frame);
    }

    #[test]
    fn header_only_frame_is_parseable() {
        let text = STANDARD.encode([0u8; HEADER_LEN]);
        let frame = decode(&text).expect("28 bytes is the minimum");
        assert!(frame.ciphertext.is_empty());
    }

    #[test]
    fn rejects_short_frames() {
        let text = STANDARD.encode([0u8; HEADER_LEN - 1]);
        let err = decode(&text).expect_err("27 bytes is too short");
        assert!(matches!(err, CryptoError::FrameFormat { .. }));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode("not base64!").expect_err("invalid alphabet");
        assert!(matches!(err, CryptoError::FrameFormat { .. }));

        let err = decode("").expect_err("empty text");
        assert!(matches!(err, CryptoError::FrameFormat { .. }));
    }

    #[test]
    fn seal_then_open_returns_plaintext() {
        for plaintext in ["", "a", "plain text", r#"{"id":1,"title":"Welcome"}"#, "üñïçødé"] {
            let text = seal("s3cr3t", plaintext).expect("seal");
            assert_eq!(open("s3cr3t", &text).expect("open"), plaintext);
        }
    }

    #[test]
    fn frame_length_is_header_plus_plaintext_plus_tag() {
        for plaintext in ["", "x", "a longer value with some length"] {
            let text = seal("s3cr3t", plaintext).expect("seal");
            let raw = STANDARD.decode(&text).expect("valid base64");
            assert_eq!(raw.len(), HEADER_LEN + plaintext.len() + TAG_LEN);
            assert!(raw.len() >= HEADER_LEN);
        }
    }

    #[test]
    fn each_seal_uses_fresh_salt_and_nonce() {
        let first = decode(&seal("s3cr3t", "same").expect("seal")).expect("decode");
        let second = decode(&seal("s3cr3t", "same").expect("seal")).expect("decode");
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let text = seal("s1", "payload").expect("seal");
        assert_eq!(open("s2", &text), Err(CryptoError::Authentication));
    }

    #[test]
    fn flipping_any_byte_fails_authentication() {
        let text = seal("s3cr3t", "tamper me").expect("seal");
        let raw = STANDARD.decode(&text).expect("valid base64");

        for index in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[index] ^= 0x01;
            let result = open("s3cr3t", &STANDARD.encode(&tampered));
            assert_eq!(
                result,
                Err(CryptoError::Authentication),
                "byte {index} flip must not decrypt"
            );
        }
    }
}
