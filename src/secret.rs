//! Secret acquisition for the command-line caller
//!
//! Secrets are handed around as `Zeroizing<Vec<u8>>` so they are wiped when
//! the last copy is dropped.

use crate::error::{ErrorCategory, ErrorKind, Result, SealcryptError};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Trait for reading secrets from various sources
pub trait SecretReader {
    /// Read a secret as arbitrary bytes (not necessarily UTF-8)
    fn read_secret(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Returns a fixed secret (for testing)
pub struct ConstantSecretReader {
    secret: Zeroizing<Vec<u8>>,
}

impl ConstantSecretReader {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret: Zeroizing::new(secret),
        }
    }
}

impl SecretReader for ConstantSecretReader {
    fn read_secret(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(self.secret.clone())
    }
}

/// Reads a secret from any io::Read source until EOF.
///
/// One trailing line terminator (`\n` or `\r\n`) is dropped so that
/// `echo secret | sealcrypt --secret-stdin ...` behaves as expected.
pub struct ReaderSecretReader {
    reader: Box<dyn Read>,
}

impl ReaderSecretReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl SecretReader for ReaderSecretReader {
    fn read_secret(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::with_capacity(INITIAL_SECRET_CAPACITY));
        let mut chunk = Zeroizing::new([0u8; READ_CHUNK_LEN]);
        loop {
            let n = match self.reader.read(&mut *chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(SealcryptError::with_kind_and_source(
                        ErrorCategory::Internal,
                        ErrorKind::Io,
                        format!("error reading secret: {}", e),
                        e,
                    ));
                }
            };
            append_zeroizing(&mut data, &chunk[..n]);
        }
        if data.ends_with(b"\n") {
            data.pop();
            if data.ends_with(b"\r") {
                data.pop();
            }
        }
        Ok(data)
    }
}

/// Secrets up to this length are read without reallocating.
const INITIAL_SECRET_CAPACITY: usize = 1024;

const READ_CHUNK_LEN: usize = 256;

/// Append `bytes` to `data` without leaving stale copies of the secret in
/// freed memory: when capacity runs out, the contents move into a larger
/// buffer and the old one is wiped as it drops.
fn append_zeroizing(data: &mut Zeroizing<Vec<u8>>, bytes: &[u8]) {
    let needed = data.len() + bytes.len();
    if needed > data.capacity() {
        let mut grown = Zeroizing::new(Vec::with_capacity(needed.max(data.capacity() * 2)));
        grown.extend_from_slice(data);
        *data = grown;
    }
    data.extend_from_slice(bytes);
}

/// Reads a secret from the terminal with no echo
#[derive(Default)]
pub struct TerminalSecretReader;

impl TerminalSecretReader {
    pub fn new() -> Self {
        Self
    }
}

impl SecretReader for TerminalSecretReader {
    /// Terminal input is limited to UTF-8 by rpassword. Use a
    /// `ReaderSecretReader` for arbitrary bytes.
    fn read_secret(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(SealcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::SecretUnavailable,
                "cannot read secret from terminal - stdin is not a terminal",
            ));
        }

        let mut stderr = io::stderr();
        stderr
            .write_all(b"Secret (sealcrypt): ")
            .and_then(|()| stderr.flush())
            .map_err(|e| {
                SealcryptError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to write prompt: {}", e),
                    e,
                )
            })?;

        let secret = rpassword::read_password().map_err(|e| {
            SealcryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::SecretUnavailable,
                format!("failure reading secret: {}", e),
                e,
            )
        })?;

        Ok(Zeroizing::new(secret.into_bytes()))
    }
}

/// Wraps another SecretReader and refuses empty secrets.
///
/// The core accepts any byte string as a secret; requiring a non-empty one
/// is caller policy.
pub struct NonEmptySecretReader {
    upstream: Box<dyn SecretReader>,
}

impl NonEmptySecretReader {
    pub fn new(upstream: Box<dyn SecretReader>) -> Self {
        Self { upstream }
    }
}

impl SecretReader for NonEmptySecretReader {
    fn read_secret(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let secret = self.upstream.read_secret()?;
        if secret.is_empty() {
            return Err(SealcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::EmptySecret,
                "a non-empty secret is required",
            ));
        }
        Ok(secret)
    }
}
