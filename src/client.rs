//! Client entry point for deferred barriers.
//!
//! This module provides the `Deferred` struct, which holds the store
//! connection, the action registry and the configuration every barrier
//! operation reads. Nothing is process-global: several clients with
//! different stores or key mappings can coexist.

use std::sync::Arc;

use deferred_core::{Descriptor, Value};
use deferred_dispatch::ActionRegistry;
use deferred_storage::{Command, ShardedStore, Store};

use crate::barrier::Barrier;
use crate::config::Config;
use crate::error::{Error, Result};

/// A barrier client.
///
/// Create barriers with [`Deferred::create`] and look them up again from any
/// process sharing the store with [`Deferred::find`]. Cloning is cheap.
///
/// # Example
///
/// ```ignore
/// use deferred::prelude::*;
///
/// let registry = Arc::new(ActionRegistry::new());
/// registry.register("Report", |_args: &[Value]| -> anyhow::Result<()> { Ok(()) });
///
/// let client = Deferred::builder().registry(registry).build()?;
/// let job = client.create("report-42", "Report", vec![])?;
/// job.wait_for(["upload-a", "upload-b"])?;
///
/// // Later, possibly from another process:
/// let job = client.find("report-42")?;
/// job.done(["upload-a"])?; // NotFired
/// job.done(["upload-b"])?; // Fired
/// ```
#[derive(Clone)]
pub struct Deferred {
    store: Arc<dyn Store>,
    registry: Arc<ActionRegistry>,
    config: Config,
}

impl Deferred {
    /// Create a client over an existing store and registry.
    pub fn new(store: Arc<dyn Store>, registry: Arc<ActionRegistry>, config: Config) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    /// Create a client over a fresh in-memory store.
    ///
    /// Data is lost when the last clone of the client is dropped. Use this
    /// for unit tests and single-process tools.
    pub fn ephemeral(registry: Arc<ActionRegistry>) -> Self {
        Self::new(Arc::new(ShardedStore::new()), registry, Config::default())
    }

    /// Create a builder for client configuration.
    pub fn builder() -> DeferredBuilder {
        DeferredBuilder::new()
    }

    /// The store every barrier operation runs against.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// The action registry.
    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// The client configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pending-set key for `id` under this client's key mapper.
    pub fn set_key_for(&self, id: &str) -> String {
        self.config.set_key(id)
    }

    /// Create (or re-create) a barrier.
    ///
    /// Writes the descriptor under `id` and clears any pending set left by a
    /// previous barrier with the same id, in one atomic batch. Tokens
    /// registered against the old barrier can no longer fire it.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownAction`] if `action` is not registered; nothing is written
    /// - [`Error::KeyCollision`] if the key mapper maps `id` onto itself
    pub fn create(&self, id: &str, action: &str, args: Vec<Value>) -> Result<Barrier> {
        let action = self.registry.resolve(action)?;
        let descriptor = Descriptor::new(action.name(), args);
        let encoded = descriptor.encode()?;

        let barrier = Barrier::new(self.clone(), id, action, descriptor.into_parts().1)?;
        self.store.multi(vec![
            Command::Set {
                key: id.to_string(),
                value: encoded,
            },
            Command::Del {
                keys: vec![barrier.set_key().to_string()],
            },
        ])?;

        tracing::debug!(
            barrier = id,
            action = barrier.action_name(),
            set_key = barrier.set_key(),
            "created deferred job"
        );
        Ok(barrier)
    }

    /// Find an existing barrier by id.
    ///
    /// The returned handle is bound to the existing pending set.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no descriptor exists (never created, destroyed, or fired)
    /// - [`Error::UnknownAction`] if the stored action is no longer registered
    pub fn find(&self, id: &str) -> Result<Barrier> {
        let raw = self
            .store
            .get(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let (action, args) = Descriptor::decode(&raw)?.into_parts();
        let action = self.registry.resolve(&action)?;
        Barrier::new(self.clone(), id, action, args)
    }

    /// Check if a descriptor exists for `id`.
    ///
    /// Does not look at the pending set.
    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.store.get(id)?.is_some())
    }
}

impl std::fmt::Debug for Deferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for client configuration.
///
/// # Example
///
/// ```ignore
/// // Shared store, custom key layout, verbose tracing
/// let client = Deferred::builder()
///     .store(store)
///     .registry(registry)
///     .key_mapper(KeyMapper::new(|id| format!("{}:pending", id)))
///     .verbose(true)
///     .build()?;
/// ```
#[derive(Default)]
pub struct DeferredBuilder {
    store: Option<Arc<dyn Store>>,
    registry: Option<Arc<ActionRegistry>>,
    config: Config,
}

impl DeferredBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this store. Defaults to a fresh in-memory store.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use this action registry.
    pub fn registry(mut self, registry: Arc<ActionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the id → pending-set key mapping.
    pub fn key_mapper(mut self, key_mapper: deferred_core::KeyMapper) -> Self {
        self.config.key_mapper = key_mapper;
        self
    }

    /// Toggle per-token tracing.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if no registry was supplied.
    pub fn build(self) -> Result<Deferred> {
        let registry = self
            .registry
            .ok_or_else(|| Error::InvalidConfig("an action registry is required".into()))?;
        let store: Arc<dyn Store> = match self.store {
            Some(store) => store,
            None => Arc::new(ShardedStore::new()),
        };
        Ok(Deferred::new(store, registry, self.config))
    }
}
