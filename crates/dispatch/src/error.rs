//! Dispatch error types

use thiserror::Error;

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors raised while resolving or dispatching an action
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No action is registered under this name
    #[error("unknown action: {name}")]
    UnknownAction {
        /// The name that failed to resolve
        name: String,
    },

    /// The action itself failed while being enqueued
    #[error("action '{action}' failed: {source}")]
    Invocation {
        /// Name of the failing action
        action: String,
        /// Error returned by the action
        #[source]
        source: anyhow::Error,
    },

    /// The worker queue refused the job
    #[error("worker queue '{queue}' is full")]
    QueueFull {
        /// Queue name
        queue: String,
    },

    /// The substrate's store failed
    #[error(transparent)]
    Store(#[from] deferred_core::Error),
}

impl DispatchError {
    /// Check if this error came from the action rather than the substrate
    pub fn is_invocation(&self) -> bool {
        matches!(self, DispatchError::Invocation { .. })
    }
}
