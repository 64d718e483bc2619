//! Password-based key derivation
//!
//! Keys are derived with PBKDF2-HMAC-SHA-256. The same (secret, salt,
//! iterations) triple always yields the same 256-bit key. Derivation is
//! CPU-bound and deliberately slow; callers on a cooperative scheduler
//! should run it on a worker thread.

use crate::error::{ErrorCategory, ErrorKind, Result, SealcryptError};
use log::trace;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Length of salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// A derived key, wiped from memory when dropped.
pub type DerivedKey = Zeroizing<[u8; KEY_LEN]>;

/// Tunable key derivation parameters.
///
/// Envelopes do not record the iteration count, so an envelope can only be
/// opened with the parameters it was sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    pub fn new(iterations: u32) -> Result<Self> {
        let params = Self { iterations };
        params.validate()?;
        Ok(params)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(SealcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidKdfParams,
                "pbkdf2 iteration count must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from a secret and a 16-byte salt.
///
/// The secret may be empty; password policy belongs to the caller.
pub fn derive_key(secret: &[u8], salt: &[u8], params: &KdfParams) -> Result<DerivedKey> {
    if salt.len() != SALT_LEN {
        return Err(SealcryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InvalidSaltLength,
            format!("salt must be {} bytes, got {}", SALT_LEN, salt.len()),
        ));
    }
    params.validate()?;

    trace!("deriving key with {} pbkdf2 iterations", params.iterations);
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(secret, salt, params.iterations, &mut *key);

    Ok(key)
}
