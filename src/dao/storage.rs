use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable context for the failure.
        message: String,
        /// Backend specific cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored value exists but does not have the expected shape.
    #[error("corrupted value for `{key}`: {reason}")]
    Corrupted {
        /// Key holding the unexpected value.
        key: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a corrupted-value error for the given key.
    pub fn corrupted(key: impl Into<String>, reason: impl Into<String>) -> Self {
        StorageError::Corrupted {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
