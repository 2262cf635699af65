//! Convenient imports for deferred barriers.
//!
//! ```ignore
//! use deferred::prelude::*;
//!
//! let client = Deferred::ephemeral(Arc::new(ActionRegistry::new()));
//! ```

pub use std::sync::Arc;

// Main entry point
pub use crate::barrier::Barrier;
pub use crate::client::{Deferred, DeferredBuilder};
pub use crate::config::Config;

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use deferred_core::{DoneOutcome, KeyMapper, Value};

// Dispatch
pub use deferred_dispatch::{ActionRegistry, Handler, InMemoryWorkerQueue, WorkerQueue};

// Storage
pub use deferred_storage::{Namespaced, ShardedStore, Store};
