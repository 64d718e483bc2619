//! sealcrypt - password-based authenticated encryption envelopes
//!
//! `encrypt` turns a plaintext and a secret into a single base64 envelope
//! (salt, nonce, AES-256-GCM ciphertext and tag) that only the same secret
//! can open. `decrypt` reverses it and reports a wrong secret or a damaged
//! envelope as one uniform failure.
//!
//! ```no_run
//! let envelope = sealcrypt::encrypt(b"42.50", b"correct-secret")?;
//! let plaintext = sealcrypt::decrypt(&envelope, b"correct-secret")?;
//! assert_eq!(plaintext, b"42.50");
//! # Ok::<(), sealcrypt::SealcryptError>(())
//! ```

#![forbid(unsafe_code)]

pub mod aead;
pub mod envelope;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod secret;
pub mod secretcrypt;

pub use error::{ErrorCategory, ErrorKind, Result, SealcryptError};
pub use kdf::KdfParams;
pub use secretcrypt::{
    decrypt, decrypt_str, decrypt_with, encrypt, encrypt_str, encrypt_with,
};
