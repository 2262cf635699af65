//! Core types for deferred barriers
//!
//! This crate defines the types shared by every layer:
//! - [`Descriptor`]: the persisted `(action, args)` pair of a barrier
//! - [`KeyMapper`]: derives the pending-set key from a barrier id
//! - [`Transition`] / [`DoneOutcome`]: the decision taken after a `done` batch
//! - [`Error`]: storage-level error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod descriptor;
pub mod error;
pub mod key;
pub mod outcome;

pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use key::{KeyMapper, DEFAULT_KEY_PREFIX};
pub use outcome::{DoneOutcome, Transition};

/// Opaque argument value passed to an action when a barrier fires.
pub use serde_json::Value;
