use thiserror::Error;

/// Unified error type for the key codec.
///
/// Decoding never returns a partially decoded key: any failure is fatal to
/// the operation that asked for the decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed or truncated key bytes (bad tag, missing group end, etc).
    #[error("Corruption: {0}")]
    Corruption(String),
    /// Caller protocol violation, e.g. trailing bytes after a full decode.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The value type cannot be represented by the requested format.
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl Error {
    /// Put `context` in front of the message, keeping the error kind.
    pub fn prepend(self, context: impl AsRef<str>) -> Self {
        let context = context.as_ref();
        match self {
            Error::Corruption(msg) => Error::Corruption(format!("{context}: {msg}")),
            Error::InvalidArgument(msg) => Error::InvalidArgument(format!("{context}: {msg}")),
            Error::NotSupported(msg) => Error::NotSupported(format!("{context}: {msg}")),
        }
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
