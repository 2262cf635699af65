//! Action registry
//!
//! Barriers persist only an action *name*. The registry turns that name
//! back into something invocable, together with the strategy used to
//! dispatch it. It is populated at startup; a name missing from the
//! registry is [`DispatchError::UnknownAction`], which callers keep
//! distinct from "no such barrier".

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::dispatcher::{Dispatcher, GenericDispatcher, WorkerDispatcher};
use crate::error::{DispatchError, Result};
use crate::handler::Handler;
use crate::worker::WorkerQueue;

/// How a registered action is executed
#[derive(Clone)]
pub enum ActionKind {
    /// The action enqueues itself
    Handler(Arc<dyn Handler>),
    /// The action runs as a named worker on a queue
    Worker(Arc<dyn WorkerQueue>),
}

/// A resolved action
#[derive(Clone)]
pub struct Action {
    name: String,
    kind: ActionKind,
}

impl Action {
    /// Registered name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution kind
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Check if the action runs on a worker queue
    pub fn is_worker(&self) -> bool {
        matches!(self.kind, ActionKind::Worker(_))
    }

    /// Build the dispatch strategy for this action
    pub fn dispatcher(&self) -> Box<dyn Dispatcher> {
        match &self.kind {
            ActionKind::Handler(handler) => Box::new(GenericDispatcher::new(Arc::clone(handler))),
            ActionKind::Worker(queue) => Box::new(WorkerDispatcher::new(Arc::clone(queue))),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ActionKind::Handler(_) => "handler".to_string(),
            ActionKind::Worker(queue) => format!("worker({})", queue.name()),
        };
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// Name → action table
///
/// Thread-safe; registration normally happens once at startup but is
/// allowed at any time.
#[derive(Default)]
pub struct ActionRegistry {
    actions: RwLock<HashMap<String, Action>>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action that enqueues itself
    ///
    /// Returns the action previously registered under `name`, if any.
    pub fn register(&self, name: impl Into<String>, handler: impl Handler + 'static) -> Option<Action> {
        self.insert(name.into(), ActionKind::Handler(Arc::new(handler)))
    }

    /// Register an action that runs as a worker on `queue`
    pub fn register_worker(
        &self,
        name: impl Into<String>,
        queue: Arc<dyn WorkerQueue>,
    ) -> Option<Action> {
        self.insert(name.into(), ActionKind::Worker(queue))
    }

    fn insert(&self, name: String, kind: ActionKind) -> Option<Action> {
        let action = Action {
            name: name.clone(),
            kind,
        };
        self.actions.write().insert(name, action)
    }

    /// Remove an action
    pub fn unregister(&self, name: &str) -> Option<Action> {
        self.actions.write().remove(name)
    }

    /// Look up an action by name
    pub fn resolve(&self, name: &str) -> Result<Action> {
        self.actions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownAction {
                name: name.to_string(),
            })
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.actions.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered actions
    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
