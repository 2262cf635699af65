//! Unified error types for deferred barriers.
//!
//! This module provides a clean error type that wraps the storage and
//! dispatch layers and presents a consistent interface to users.

use deferred_dispatch::DispatchError;
use thiserror::Error;

/// All barrier errors.
///
/// This is the canonical error type for every client and barrier operation.
#[derive(Debug, Error)]
pub enum Error {
    /// No descriptor exists for this id (never created, destroyed, or fired)
    #[error("no such deferred job: {0}")]
    NotFound(String),

    /// The stored action name is not in the registry
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The action failed while being dispatched
    ///
    /// The barrier has already been destroyed when this is returned.
    #[error("action '{action}' failed: {source}")]
    Invocation {
        /// Name of the failing action
        action: String,
        /// Error raised by the action
        #[source]
        source: anyhow::Error,
    },

    /// The key mapper sends a barrier's pending set onto its descriptor key
    #[error("pending-set key for '{0}' collides with its descriptor key")]
    KeyCollision(String),

    /// Wrong value type at a key
    #[error("wrong type for key '{key}': expected {expected}, got {actual}")]
    WrongType {
        /// Key holding the value
        key: String,
        /// Expected type
        expected: String,
        /// Actual type found
        actual: String,
    },

    /// The execution substrate refused the job
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Invalid configuration (file, environment, builder)
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for barrier operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if the stored action could not be resolved.
    pub fn is_unknown_action(&self) -> bool {
        matches!(self, Error::UnknownAction(_))
    }

    /// Check if the action itself failed during a fire.
    pub fn is_invocation(&self) -> bool {
        matches!(self, Error::Invocation { .. })
    }

    /// Check if repeating the failed call may succeed.
    ///
    /// Only backend failures qualify. A `Dispatch` or `Invocation` error
    /// comes out of a fire, after the barrier was destroyed, so calling
    /// `done` again can never re-fire it. Nothing in this crate retries on
    /// its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}

// Convert from storage-level errors
impl From<deferred_core::Error> for Error {
    fn from(e: deferred_core::Error) -> Self {
        use deferred_core::Error as CoreError;
        match e {
            CoreError::WrongType { key, expected, actual } => Error::WrongType {
                key,
                expected: expected.to_string(),
                actual: actual.to_string(),
            },
            CoreError::UnexpectedReply { command, reply } => {
                Error::Storage(format!("unexpected reply to {}: {}", command, reply))
            }
            CoreError::Serialization(msg) => Error::Serialization(msg),
            CoreError::Storage(msg) => Error::Storage(msg),
            CoreError::InvalidKey(key) => Error::Storage(format!("invalid key: {}", key)),
        }
    }
}

// Convert from dispatch errors
impl From<DispatchError> for Error {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::UnknownAction { name } => Error::UnknownAction(name),
            DispatchError::Invocation { action, source } => Error::Invocation { action, source },
            full @ DispatchError::QueueFull { .. } => Error::Dispatch(full.to_string()),
            DispatchError::Store(e) => e.into(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
