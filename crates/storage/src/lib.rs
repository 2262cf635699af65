//! Storage layer for deferred barriers
//!
//! This crate implements the key-value contract barriers rely on:
//! - Command / Reply: the string and set commands a backend must answer
//! - Store: the backend trait, with typed helpers and an atomic `multi`
//! - ShardedStore: DashMap-based in-memory backend
//! - Namespaced: key-prefixing wrapper for isolated namespaces
//! - RedisStore: networked backend shared across processes (`redis` feature)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod namespaced;
#[cfg(feature = "redis")]
pub mod remote;
pub mod sharded;
pub mod traits;

pub use command::{Command, Reply};
pub use namespaced::Namespaced;
#[cfg(feature = "redis")]
pub use remote::RedisStore;
pub use sharded::ShardedStore;
pub use traits::Store;
