//! Key-prefixing store wrapper
//!
//! Wraps any [`Store`] and rewrites every key to `"{namespace}:{key}"`.
//! Several independently configured clients can then share one backing
//! store without seeing each other's barriers, which is how test suites
//! isolate themselves.

use deferred_core::Result;

use crate::command::{Command, Reply};
use crate::traits::Store;

/// A store view confined to one namespace
#[derive(Debug)]
pub struct Namespaced<S> {
    inner: S,
    namespace: String,
}

impl<S: Store> Namespaced<S> {
    /// Confine `inner` to `namespace`
    pub fn new(inner: S, namespace: impl Into<String>) -> Self {
        Self {
            inner,
            namespace: namespace.into(),
        }
    }

    /// The namespace prefix (without the trailing `:`)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The physical key for a logical key
    pub fn physical_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

impl<S: Store> Store for Namespaced<S> {
    fn execute(&self, command: Command) -> Result<Reply> {
        self.inner.execute(command.map_keys(|k| self.physical_key(k)))
    }

    fn multi(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        let commands = commands
            .into_iter()
            .map(|c| c.map_keys(|k| self.physical_key(k)))
            .collect();
        self.inner.multi(commands)
    }
}
