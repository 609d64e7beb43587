//! Engine error types.

/// Errors produced by container engine operations.
///
/// Every failure is local to one call. Messages never carry key material or
/// plaintext, and the two authentication failures deliberately do not say
/// which input was wrong.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Truncated, over-length, or structurally invalid container bytes.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Well-formed header with a method tag this build does not know.
    #[error("unsupported method tag: {0:#04x}")]
    UnsupportedMethod(u8),

    /// Well-formed header with a format version this build does not know.
    #[error("unsupported container version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// The credential variant does not match the container's method.
    #[error("credential mismatch: container expects a {expected}, got a {actual}")]
    CredentialTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// AEAD authentication failed (wrong password/key or tampered data).
    #[error("decryption failed")]
    DecryptionFailure,

    /// RSA-OAEP unwrap of the session key failed.
    #[error("session key unwrap failed")]
    KeyDecryptionFailure,

    /// PEM text is not a well-formed key of the expected kind.
    #[error("key parse error: {0}")]
    KeyParseFailure(String),

    /// Key-pair creation failed (bad bit length or RNG failure).
    #[error("key generation failed: {0}")]
    KeyGenerationFailure(String),

    /// Argon2 cost parameters or salt are out of range.
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    /// Sealing or key wrapping failed while encrypting.
    #[error("encryption failed: {0}")]
    EncryptionFailure(String),
}

impl EngineError {
    /// Stable machine-readable code for this error kind.
    ///
    /// Collaborators map these to user-facing statuses without matching on
    /// the display string.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedContainer(_) => "malformed_container",
            Self::UnsupportedMethod(_) => "unsupported_method",
            Self::UnsupportedVersion(_) => "unsupported_version",
            Self::CredentialTypeMismatch { .. } => "credential_type_mismatch",
            Self::DecryptionFailure => "decryption_failure",
            Self::KeyDecryptionFailure => "key_decryption_failure",
            Self::KeyParseFailure(_) => "key_parse_failure",
            Self::KeyGenerationFailure(_) => "key_generation_failure",
            Self::InvalidKdfParams(_) => "invalid_kdf_params",
            Self::EncryptionFailure(_) => "encryption_failure",
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContainer(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
