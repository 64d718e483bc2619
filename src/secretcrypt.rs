//! Password-based encryption using PBKDF2 + AES-256-GCM
//!
//! `encrypt` derives a key from the secret and a fresh random salt, seals the
//! plaintext under a fresh random nonce, and returns envelope text.
//! `decrypt` reverses this and fails closed.
//!
//! Every call derives its own key; nothing is cached between calls and no
//! state is shared other than the operating system random source, so all
//! functions here are safe to call concurrently.

use crate::aead::{self, NONCE_LEN};
use crate::envelope;
use crate::error::{DECRYPT_FAILURE_MSG, ErrorCategory, ErrorKind, Result, SealcryptError};
use crate::kdf::{self, KdfParams, SALT_LEN};
use log::debug;
use rand::RngCore;
use rand::rngs::OsRng;

/// Encrypt `plaintext` under `secret` with the default key derivation parameters.
pub fn encrypt(plaintext: &[u8], secret: &[u8]) -> Result<String> {
    encrypt_with(plaintext, secret, &KdfParams::default())
}

/// Encrypt `plaintext` under `secret` with explicit key derivation parameters.
pub fn encrypt_with(plaintext: &[u8], secret: &[u8], params: &KdfParams) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;

    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;

    encrypt_deterministic(plaintext, secret, &salt, &nonce, params)
}

/// Encrypt with a provided salt and nonce.
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` which generates random salt/nonce.
pub fn encrypt_deterministic(
    plaintext: &[u8],
    secret: &[u8],
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
    params: &KdfParams,
) -> Result<String> {
    let key = kdf::derive_key(secret, salt, params)?;
    let sealed = aead::seal(&key, nonce, plaintext)?;
    Ok(envelope::encode(salt, nonce, &sealed))
}

/// Decrypt envelope `text` with `secret` using the default key derivation parameters.
///
/// A malformed envelope and a failed authentication produce the same
/// message; the precise reason is kept in `kind` and the source chain.
pub fn decrypt(text: &str, secret: &[u8]) -> Result<Vec<u8>> {
    decrypt_with(text, secret, &KdfParams::default())
}

/// Decrypt envelope `text` with `secret` and explicit key derivation parameters.
pub fn decrypt_with(text: &str, secret: &[u8], params: &KdfParams) -> Result<Vec<u8>> {
    let parts = envelope::decode(text).map_err(conceal)?;
    let key = kdf::derive_key(secret, &parts.salt, params)?;
    aead::open(&key, &parts.nonce, &parts.sealed).map_err(conceal)
}

/// Encrypt UTF-8 text, returning envelope text.
pub fn encrypt_str(plaintext: &str, secret: &str) -> Result<String> {
    encrypt(plaintext.as_bytes(), secret.as_bytes())
}

/// Decrypt envelope text whose plaintext is expected to be UTF-8.
pub fn decrypt_str(text: &str, secret: &str) -> Result<String> {
    let plaintext = decrypt(text, secret.as_bytes())?;
    String::from_utf8(plaintext).map_err(|e| {
        SealcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidUtf8,
            "decrypted data is not valid UTF-8",
            e,
        )
    })
}

fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(map_rng_error)
}

fn map_rng_error(err: rand::Error) -> SealcryptError {
    SealcryptError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::RandomSourceExhausted,
        "OS random generator unavailable",
        err,
    )
}

/// Replace the message of a decrypt-path error with the uniform one, keeping
/// the original reachable as the source.
fn conceal(err: SealcryptError) -> SealcryptError {
    match err.kind {
        Some(kind @ (ErrorKind::MalformedEnvelope | ErrorKind::AuthenticationFailed)) => {
            debug!("envelope rejected ({:?}): {}", kind, err.message());
            SealcryptError::with_kind_and_source(
                ErrorCategory::User,
                kind,
                DECRYPT_FAILURE_MSG,
                err,
            )
        }
        _ => err,
    }
}
