//! Worker-style queue substrate

use std::sync::Arc;

use deferred_core::Value;
use deferred_storage::Store;

use crate::error::Result;

/// A queue that runs named workers asynchronously
///
/// Implementations may target any job runner; the barrier never waits on
/// the job's result.
pub trait WorkerQueue: Send + Sync {
    /// Queue name, for logs and errors
    fn name(&self) -> &str;

    /// Schedule `action` with `args`, returning the queue's message id
    fn perform_async(&self, action: &str, args: Vec<Value>) -> Result<String>;

    /// The queue's own store connection, if it keeps one
    fn store(&self) -> Option<Arc<dyn Store>> {
        None
    }
}
