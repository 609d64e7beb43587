use encfile_engine::EngineError;

/// Errors from the text and file surfaces.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Decryption succeeded but the plaintext is not text.
    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("payload of {size} bytes exceeds the {limit}-byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Stable machine-readable code; engine errors keep their own codes.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Engine(e) => e.kind(),
            Self::InvalidBase64(_) => "invalid_base64",
            Self::InvalidUtf8 => "invalid_utf8",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Io { .. } => "io",
        }
    }
}

/// Attach a description of the failed operation to an I/O error.
pub(crate) fn io_context(context: String) -> impl FnOnce(std::io::Error) -> TransportError {
    move |source| TransportError::Io { context, source }
}

pub type Result<T> = std::result::Result<T, TransportError>;
