//! File encryption/decryption operations
//!
//! High-level operations used by the `sealcrypt` binary. An encrypted file
//! holds exactly one envelope as text.

use crate::error::{DECRYPT_FAILURE_MSG, ErrorCategory, ErrorKind, Result, SealcryptError};
use crate::kdf::KdfParams;
use crate::secret::SecretReader;
use crate::secretcrypt;
use log::debug;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encrypt a file with a secret
///
/// Reads plaintext from `input_path`, encrypts it using a secret from
/// `secret_reader`, and writes the envelope text to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    secret_reader: &mut dyn SecretReader,
    params: &KdfParams,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let secret = secret_reader.read_secret()?;
    let envelope = secretcrypt::encrypt_with(&plaintext, &secret, params)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, envelope.as_bytes())?;
    debug!(
        "sealed {} bytes from {} into {}",
        plaintext.len(),
        input_path.display(),
        output_path.display()
    );
    Ok(())
}

/// Decrypt a file with a secret
///
/// Reads envelope text from `input_path`, decrypts it using a secret from
/// `secret_reader`, and writes the plaintext to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    secret_reader: &mut dyn SecretReader,
    params: &KdfParams,
) -> Result<()> {
    let envelope = read_envelope(input_path)?;
    let secret = secret_reader.read_secret()?;
    let plaintext = secretcrypt::decrypt_with(&envelope, &secret, params)?;
    write_file_secure(output_path, &plaintext)?;
    Ok(())
}

/// Update an encrypted file with new plaintext using the same secret
///
/// This function:
/// 1. Decrypts the existing file at `crypt_path` to validate the secret
/// 2. Reads new plaintext from `plain_path`
/// 3. Encrypts the new plaintext with the validated secret
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// Either the old file or the new file exists afterwards, never a partial one.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    secret_reader: &mut dyn SecretReader,
    params: &KdfParams,
) -> Result<()> {
    let envelope = read_envelope(crypt_path)?;
    let secret = secret_reader.read_secret()?;

    // Validate the secret by decrypting the existing file (discard plaintext).
    secretcrypt::decrypt_with(&envelope, &secret, params)?;

    let crypt_dir = match crypt_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => {
            return Err(SealcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::Io,
                "crypt_path has no parent directory",
            ));
        }
    };
    let new_plaintext = fs::read(plain_path).map_err(|e| read_error(plain_path, e))?;
    let new_envelope = secretcrypt::encrypt_with(&new_plaintext, &secret, params)
        .map_err(|e| e.with_context("encryption failed"))?;

    let mut temp_file = tempfile::NamedTempFile::new_in(crypt_dir)
        .map_err(|e| io_error("failed to create tempfile", e))?;
    temp_file
        .write_all(new_envelope.as_bytes())
        .map_err(|e| io_error("failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| io_error("failed to flush tempfile", e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| io_error("failed to sync file prior to rename", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| io_error("failed to set tempfile permissions", e))?;
    }
    temp_file.persist(crypt_path).map_err(|e| {
        SealcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", crypt_path.display()),
            e,
        )
    })?;
    debug!("resealed {}", crypt_path.display());
    Ok(())
}

/// Read envelope text, ignoring surrounding whitespace such as a trailing
/// newline added by an editor.
///
/// Bytes that are not UTF-8 cannot be base64 either, so they are reported
/// as a malformed envelope with the same message as any other decrypt
/// failure.
fn read_envelope(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        debug!("envelope rejected (MalformedEnvelope): {} is not UTF-8", path.display());
        SealcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            DECRYPT_FAILURE_MSG,
            e,
        )
    })?;
    Ok(text.trim().to_string())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    let file = {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
    };

    #[cfg(not(unix))]
    let file = fs::File::create(path);

    let mut file = file.map_err(|e| {
        SealcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to open {}", path.display()),
            e,
        )
    })?;
    file.write_all(contents)
        .map_err(|e| io_error(format!("failed to write {}", path.display()), e))
}

fn io_error(msg: impl Into<String>, err: io::Error) -> SealcryptError {
    SealcryptError::with_kind_and_source(ErrorCategory::Internal, ErrorKind::Io, msg, err)
}

fn read_error(path: &Path, err: io::Error) -> SealcryptError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    SealcryptError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
