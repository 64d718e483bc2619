//! AES-256-GCM sealing and opening
//!
//! No associated data is bound into the tag. Output of `seal` is the
//! ciphertext (same length as the plaintext) followed by a 16-byte tag.

use crate::error::{ErrorCategory, ErrorKind, Result, SealcryptError};
use crate::kdf::KEY_LEN;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Encrypt and authenticate `plaintext`.
pub fn seal(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| {
            SealcryptError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::InternalInvariant,
                format!("encryption failed: {}", e),
            )
        })
}

/// Verify the tag and decrypt.
///
/// Nothing is returned unless the tag verifies.
pub fn open(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < TAG_LEN {
        return Err(SealcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "sealed data shorter than authentication tag",
        ));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher.decrypt(Nonce::from_slice(nonce), sealed).map_err(|_| {
        SealcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "corrupt input, tampered-with data, or wrong secret",
        )
    })
}
