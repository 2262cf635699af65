//! Dispatch strategies
//!
//! A [`Dispatcher`] hands a fired action to whatever execution substrate it
//! was registered with. Two strategies exist:
//!
//! | Strategy | Entry point | Store |
//! |----------|-------------|-------|
//! | [`GenericDispatcher`] | `Handler::enqueue(args)` | none |
//! | [`WorkerDispatcher`] | `WorkerQueue::perform_async(action, args)` | the queue's own |

use std::sync::Arc;

use deferred_core::Value;
use deferred_storage::Store;

use crate::error::{DispatchError, Result};
use crate::handler::Handler;
use crate::worker::WorkerQueue;

/// Hands a resolved action to an execution substrate
pub trait Dispatcher: Send + Sync {
    /// Strategy name, for logs
    fn name(&self) -> &'static str;

    /// Schedule `action` with `args`
    fn enqueue(&self, action: &str, args: &[Value]) -> Result<()>;

    /// The substrate's own store connection, if it has one
    fn store(&self) -> Option<Arc<dyn Store>> {
        None
    }
}

impl dyn Dispatcher {
    /// Run `f` against the substrate's store, or `fallback` if it has none
    ///
    /// Lets a substrate reuse its own connection pool for bookkeeping
    /// instead of opening a second one.
    pub fn with_store<R>(&self, fallback: &dyn Store, f: impl FnOnce(&dyn Store) -> R) -> R {
        match self.store() {
            Some(store) => f(store.as_ref()),
            None => f(fallback),
        }
    }
}

/// Calls the action's own `enqueue` entry point
pub struct GenericDispatcher {
    handler: Arc<dyn Handler>,
}

impl GenericDispatcher {
    /// Dispatch through `handler`
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }
}

impl Dispatcher for GenericDispatcher {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn enqueue(&self, action: &str, args: &[Value]) -> Result<()> {
        self.handler
            .enqueue(args)
            .map_err(|source| DispatchError::Invocation {
                action: action.to_string(),
                source,
            })
    }
}

/// Posts the action to a worker queue's async entry point
pub struct WorkerDispatcher {
    queue: Arc<dyn WorkerQueue>,
}

impl WorkerDispatcher {
    /// Dispatch onto `queue`
    pub fn new(queue: Arc<dyn WorkerQueue>) -> Self {
        Self { queue }
    }
}

impl Dispatcher for WorkerDispatcher {
    fn name(&self) -> &'static str {
        "worker"
    }

    fn enqueue(&self, action: &str, args: &[Value]) -> Result<()> {
        let message_id = self.queue.perform_async(action, args.to_vec())?;
        tracing::debug!(
            queue = self.queue.name(),
            action,
            message_id = %message_id,
            "posted to worker queue"
        );
        Ok(())
    }

    fn store(&self) -> Option<Arc<dyn Store>> {
        self.queue.store()
    }
}
