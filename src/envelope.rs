//! Envelope text codec
//!
//! An envelope is the standard (padded) base64 encoding of
//!
//! - salt: 16 bytes
//! - nonce: 12 bytes
//! - sealed box: variable length (ciphertext followed by a 16-byte tag)
//!
//! Field boundaries are fixed offsets; there are no separators or length
//! prefixes. This module only checks structure. Whether the sealed box is
//! authentic is decided by the cipher.

use crate::aead::{NONCE_LEN, TAG_LEN};
use crate::error::{ErrorCategory, ErrorKind, Result, SealcryptError};
use crate::kdf::SALT_LEN;
use base64::{Engine, engine::general_purpose::STANDARD};

/// Smallest decoded envelope: an empty plaintext still carries a tag.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// The decoded parts of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub sealed: Vec<u8>,
}

/// Concatenate salt, nonce and sealed box and encode as base64 text.
pub fn encode(salt: &[u8; SALT_LEN], nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> String {
    let mut body = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
    body.extend_from_slice(salt);
    body.extend_from_slice(nonce);
    body.extend_from_slice(sealed);
    STANDARD.encode(body)
}

/// Decode envelope text and split it into salt, nonce and sealed box.
pub fn decode(text: &str) -> Result<Envelope> {
    let body = STANDARD.decode(text).map_err(|e| {
        SealcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })?;

    if body.len() < MIN_ENVELOPE_LEN {
        return Err(SealcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            format!(
                "envelope is {} bytes, shorter than the {} byte minimum; likely truncated",
                body.len(),
                MIN_ENVELOPE_LEN
            ),
        ));
    }

    let (salt, rest) = body.split_at(SALT_LEN);
    let (nonce, sealed) = rest.split_at(NONCE_LEN);

    Ok(Envelope {
        salt: salt.try_into().map_err(|_| invariant("salt"))?,
        nonce: nonce.try_into().map_err(|_| invariant("nonce"))?,
        sealed: sealed.to_vec(),
    })
}

fn invariant(field: &str) -> SealcryptError {
    SealcryptError::with_kind(
        ErrorCategory::Internal,
        ErrorKind::InternalInvariant,
        format!("failed to split {} from envelope", field),
    )
}
