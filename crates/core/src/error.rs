//! Error types shared by the storage and barrier layers
//!
//! These errors describe failures of the key-value store itself. Barrier
//! level failures (missing descriptor, unknown action, failed invocation)
//! live in the facade crate and wrap this type.

use thiserror::Error;

/// Result type alias for storage-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the key-value store layer
#[derive(Debug, Error)]
pub enum Error {
    /// A command was applied to a key holding the other kind of value
    #[error("wrong type for key '{key}': expected {expected}, got {actual}")]
    WrongType {
        /// Key the command targeted
        key: String,
        /// Kind of value the command expects
        expected: &'static str,
        /// Kind of value actually stored
        actual: &'static str,
    },

    /// The store answered a command with a reply of the wrong shape
    #[error("unexpected reply to {command}: {reply}")]
    UnexpectedReply {
        /// Command name
        command: &'static str,
        /// Debug rendering of the reply received
        reply: String,
    },

    /// Descriptor could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend failure (connectivity, capacity, poisoned state)
    #[error("storage error: {0}")]
    Storage(String),

    /// Key rejected by the store
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl Error {
    /// Create a storage error from any displayable message
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Check if this error came from the backend rather than from the data
    ///
    /// Backend errors may succeed if the caller retries; the barrier layer
    /// never retries on its own.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
