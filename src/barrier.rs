//! Barrier handle
//!
//! A [`Barrier`] is bound to one id: a descriptor at key `id` and a pending
//! set at `set_key(id)`. Handles hold no state of their own beyond the
//! resolved action; every read goes to the store, so any number of handles
//! (in any number of processes) can point at the same barrier.
//!
//! ## Firing
//!
//! [`Barrier::done`] runs `GET id; SCARD; SREM tokens...; SCARD` as one
//! atomic batch. Only the call that sees the set go from non-empty to empty
//! fires, and only if the descriptor still exists. Firing dispatches the
//! stored action and then destroys the barrier; destruction runs even when
//! the action fails or panics.

use std::collections::BTreeSet;
use std::fmt;

use deferred_core::{Descriptor, DoneOutcome, Transition, Value};
use deferred_dispatch::Action;
use deferred_storage::traits::unexpected;
use deferred_storage::{Command, Reply, Store};
use tracing::{debug, error};

use crate::client::Deferred;
use crate::error::{Error, Result};

/// A deferred job waiting on a set of tokens
#[derive(Clone)]
pub struct Barrier {
    client: Deferred,
    id: String,
    set_key: String,
    action: Action,
    args: Vec<Value>,
}

impl Barrier {
    pub(crate) fn new(client: Deferred, id: &str, action: Action, args: Vec<Value>) -> Result<Self> {
        let set_key = client.set_key_for(id);
        if set_key == id {
            return Err(Error::KeyCollision(id.to_string()));
        }
        Ok(Self {
            client,
            id: id.to_string(),
            set_key,
            action,
            args,
        })
    }

    /// Barrier id (also the descriptor key)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key of the pending set
    pub fn set_key(&self) -> &str {
        &self.set_key
    }

    /// Name of the action run on fire
    pub fn action_name(&self) -> &str {
        self.action.name()
    }

    /// The resolved action
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Arguments passed to the action on fire
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Name of the dispatch strategy used on fire
    pub fn dispatcher_name(&self) -> &'static str {
        self.action.dispatcher().name()
    }

    fn store(&self) -> &dyn Store {
        self.client.store().as_ref()
    }

    fn verbose(&self) -> bool {
        self.client.config().verbose
    }

    // ========================================================================
    // Pending set
    // ========================================================================

    /// Add preconditions to wait for
    ///
    /// Duplicates are absorbed. Returns how many tokens were newly added.
    pub fn wait_for<I, T>(&self, tokens: I) -> Result<u64>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Ok(0);
        }
        if self.verbose() {
            for token in &tokens {
                debug!(barrier = %self.id, token = %token, "waiting for");
            }
        }
        Ok(self.store().sadd(&self.set_key, tokens)?)
    }

    /// All pending tokens
    pub fn waiting_for(&self) -> Result<BTreeSet<String>> {
        Ok(self.store().smembers(&self.set_key)?.into_iter().collect())
    }

    /// Check if `token` is pending
    pub fn is_waiting_for(&self, token: &str) -> Result<bool> {
        Ok(self.store().sismember(&self.set_key, token)?)
    }

    /// Number of pending tokens
    pub fn count(&self) -> Result<u64> {
        Ok(self.store().scard(&self.set_key)?)
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    // ========================================================================
    // Transition
    // ========================================================================

    /// Mark preconditions as satisfied
    ///
    /// Removing a token that is not pending is a no-op. If this call removes
    /// the last pending token, the action is dispatched and the barrier is
    /// destroyed, and `Fired` is returned. Concurrent callers never both
    /// observe the final removal.
    ///
    /// # Errors
    ///
    /// An action failure is returned as [`Error::Invocation`] after the
    /// barrier has been destroyed. The barrier cannot be fired again.
    pub fn done<I, T>(&self, tokens: I) -> Result<DoneOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if self.verbose() {
            for token in &tokens {
                debug!(barrier = %self.id, token = %token, "done");
            }
        }

        let mut batch = Vec::with_capacity(4);
        batch.push(Command::Get {
            key: self.id.clone(),
        });
        batch.push(Command::SCard {
            key: self.set_key.clone(),
        });
        if !tokens.is_empty() {
            batch.push(Command::SRem {
                key: self.set_key.clone(),
                members: tokens,
            });
        }
        batch.push(Command::SCard {
            key: self.set_key.clone(),
        });

        let replies = self.store().multi(batch)?;
        let descriptor = match replies.first() {
            Some(Reply::Bulk(raw)) => Some(raw.as_str()),
            Some(Reply::Nil) => None,
            Some(other) => return Err(unexpected("GET", other.clone()).into()),
            None => return Err(Error::Storage("empty reply to done batch".into())),
        };
        let before = cardinality(replies.get(1))?;
        let after = cardinality(replies.last())?;

        match Transition::from_counts(before, after) {
            Transition::Satisfied => match descriptor {
                Some(raw) => {
                    self.fire(raw)?;
                    Ok(DoneOutcome::Fired)
                }
                None => {
                    // Tokens were added through a handle that outlived its barrier
                    debug!(barrier = %self.id, "pending set emptied without a descriptor");
                    Ok(DoneOutcome::NotFired)
                }
            },
            transition => {
                if let Transition::Waiting { remaining } = transition {
                    if self.verbose() {
                        debug!(barrier = %self.id, remaining, "still waiting");
                    }
                }
                Ok(transition.into())
            }
        }
    }

    /// Dispatch the descriptor read by the winning batch, then destroy
    fn fire(&self, raw: &str) -> Result<()> {
        let cleanup = Cleanup::new(self);
        let invoked = self.dispatch(raw);
        let cleaned = cleanup.run();

        match (invoked, cleaned) {
            (Ok(()), cleaned) => cleaned,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                error!(
                    barrier = %self.id,
                    error = %cleanup_err,
                    "failed to destroy barrier after action failure"
                );
                Err(e)
            }
        }
    }

    fn dispatch(&self, raw: &str) -> Result<()> {
        // The barrier may have been re-created under this id since the
        // handle was built; the stored descriptor is authoritative.
        let (name, args) = Descriptor::decode(raw)?.into_parts();
        let action = if name == self.action.name() {
            self.action.clone()
        } else {
            self.client.registry().resolve(&name)?
        };

        let dispatcher = action.dispatcher();
        debug!(
            barrier = %self.id,
            action = action.name(),
            dispatcher = dispatcher.name(),
            "firing deferred job"
        );
        dispatcher.enqueue(action.name(), &args)?;
        Ok(())
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove the pending set, keeping the descriptor
    pub fn clear(&self) -> Result<()> {
        self.store().del(&[self.set_key.as_str()])?;
        Ok(())
    }

    /// Remove the descriptor and the pending set
    ///
    /// A later `find` fails with [`Error::NotFound`].
    pub fn destroy(&self) -> Result<()> {
        self.store().del(&[self.id.as_str(), self.set_key.as_str()])?;
        debug!(barrier = %self.id, "destroyed deferred job");
        Ok(())
    }

    /// Run `f` against the action's substrate store, or the client's store
    /// if the substrate has none.
    pub fn with_store<R>(&self, f: impl FnOnce(&dyn Store) -> R) -> R {
        self.action.dispatcher().with_store(self.store(), f)
    }
}

impl fmt::Debug for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Barrier")
            .field("id", &self.id)
            .field("set_key", &self.set_key)
            .field("action", &self.action)
            .field("args", &self.args)
            .finish()
    }
}

fn cardinality(reply: Option<&Reply>) -> Result<u64> {
    match reply {
        Some(Reply::Integer(n)) => Ok(*n),
        Some(other) => Err(unexpected("SCARD", other.clone()).into()),
        None => Err(Error::Storage("empty reply to done batch".into())),
    }
}

/// Destroys the barrier when dropped unless already run
///
/// Covers a panicking action.
struct Cleanup<'a> {
    barrier: &'a Barrier,
    armed: bool,
}

impl<'a> Cleanup<'a> {
    fn new(barrier: &'a Barrier) -> Self {
        Self {
            barrier,
            armed: true,
        }
    }

    fn run(mut self) -> Result<()> {
        self.armed = false;
        self.barrier.destroy()
    }
}

impl Drop for Cleanup<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.barrier.destroy() {
                error!(barrier = %self.barrier.id, error = %e, "failed to destroy barrier");
            }
        }
    }
}
