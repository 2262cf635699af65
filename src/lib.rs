//! # Deferred
//!
//! Distributed join barriers backed by a shared key-value store.
//!
//! A barrier ("deferred job") pairs an action with a set of pending tokens.
//! Producers anywhere mark tokens done; the call that removes the last one
//! dispatches the action exactly once and deletes the barrier.
//!
//! ## Quick Start
//!
//! ```ignore
//! use deferred::prelude::*;
//!
//! let registry = Arc::new(ActionRegistry::new());
//! registry.register("Publish", |args: &[Value]| -> anyhow::Result<()> {
//!     println!("publishing {:?}", args);
//!     Ok(())
//! });
//!
//! let client = Deferred::ephemeral(registry);
//! let job = client.create("release-7", "Publish", vec![Value::from(7)])?;
//! job.wait_for(["build-linux", "build-macos"])?;
//!
//! assert_eq!(job.done(["build-linux"])?, DoneOutcome::NotFired);
//! assert_eq!(job.done(["build-macos"])?, DoneOutcome::Fired);
//! assert!(client.find("release-7").unwrap_err().is_not_found());
//! ```
//!
//! ## Layout
//!
//! | Layer | Crate |
//! |-------|-------|
//! | Descriptor codec, key mapping, outcomes | `deferred-core` |
//! | Store contract and in-memory backend | `deferred-storage` |
//! | Action registry and dispatch strategies | `deferred-dispatch` |
//!
//! ## Store Layout
//!
//! - key `id` holds the descriptor `["ActionName", [args...]]`
//! - key `set_key(id)` (default `deferred-job:{id}`) holds the pending set
//!
//! ## Backends
//!
//! [`ShardedStore`] keeps everything in process memory. With the `redis`
//! feature, `RedisStore` shares barriers between every process connected
//! to the same server.

#![warn(missing_docs)]

mod barrier;
mod client;
mod config;
mod error;

pub mod prelude;

pub use barrier::Barrier;
pub use client::{Deferred, DeferredBuilder};
pub use config::{Config, ENV_KEY_PREFIX, ENV_VERBOSE};
pub use error::{Error, Result};

pub use deferred_core::{Descriptor, DoneOutcome, KeyMapper, Value, DEFAULT_KEY_PREFIX};
pub use deferred_dispatch::{
    Action, ActionKind, ActionRegistry, Dispatcher, Handler, InMemoryWorkerQueue, QueueEntry,
    WorkerQueue,
};
pub use deferred_storage::{Command, Namespaced, Reply, ShardedStore, Store};
#[cfg(feature = "redis")]
pub use deferred_storage::RedisStore;
