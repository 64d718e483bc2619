use std::error::Error as StdError;

use thiserror::Error;

/// The single message shown to callers for any envelope that fails to
/// decrypt, regardless of whether the envelope was malformed or failed
/// authentication.
pub const DECRYPT_FAILURE_MSG: &str = "could not decrypt: check secret or data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee the error is not, for example,
    /// due to a user error - merely that it cannot be confidently determined
    /// by the code.
    Internal,

    /// The user provided invalid input (a wrong secret, a damaged envelope,
    /// a missing file) or asked for something impossible.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A salt of the wrong length reached key derivation.
    InvalidSaltLength,
    /// Key derivation parameters are out of range.
    InvalidKdfParams,
    /// Envelope text is not valid base64 or is too short to hold
    /// salt, nonce and tag.
    MalformedEnvelope,
    /// The AEAD tag did not verify: wrong secret, tampering, or corruption.
    AuthenticationFailed,
    /// The operating system random source could not supply bytes.
    RandomSourceExhausted,
    /// Authenticated plaintext was requested as text but is not UTF-8.
    InvalidUtf8,
    /// The secret could not be obtained from the configured reader.
    SecretUnavailable,
    /// An empty secret was supplied where one is required.
    EmptySecret,
    /// Unexpected state reached within sealcrypt logic.
    InternalInvariant,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SealcryptError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl SealcryptError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that retains the originating source error.
    pub fn with_source(
        category: ErrorCategory,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: None,
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }

    /// True for the two envelope rejections that callers see as one
    /// "could not decrypt" outcome.
    pub fn is_decrypt_failure(&self) -> bool {
        matches!(
            self.kind,
            Some(ErrorKind::MalformedEnvelope | ErrorKind::AuthenticationFailed)
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SealcryptError>;
