//! Dispatch layer for deferred barriers
//!
//! When a barrier fires, its action is handed to an execution substrate.
//! This crate provides:
//!
//! - [`Handler`]: an action with its own `enqueue` entry point
//! - [`WorkerQueue`]: a worker-style queue with an async-invocation entry point
//! - [`ActionRegistry`]: explicit name → [`Action`] table populated at startup
//! - [`Dispatcher`]: strategy that hands a resolved action to its substrate
//! - [`InMemoryWorkerQueue`]: in-process worker queue for tests and tools
//!
//! ## Strategy Selection
//!
//! An action's strategy is fixed when it is registered:
//! `register` selects [`GenericDispatcher`], `register_worker` selects
//! [`WorkerDispatcher`]. Resolution is a table lookup, never type inspection.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod memory;
pub mod registry;
pub mod worker;

pub use dispatcher::{Dispatcher, GenericDispatcher, WorkerDispatcher};
pub use error::{DispatchError, Result};
pub use handler::Handler;
pub use memory::{InMemoryWorkerQueue, QueueEntry};
pub use registry::{Action, ActionKind, ActionRegistry};
pub use worker::WorkerQueue;
