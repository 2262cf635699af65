//! Sharded in-memory store
//!
//! DashMap keyed by store key, holding either a string or an FxHashSet.
//!
//! # Design
//!
//! - DashMap: 16-way sharded by default, per-key locking
//! - FxHashSet: O(1) membership for pending sets
//! - Batch lock: single commands share a read guard, `multi` takes the
//!   write guard, so a batch never interleaves with any other command
//!
//! # Atomicity
//!
//! A `multi` batch is all-or-nothing. Every key the batch touches is
//! snapshotted before the first command runs; if a command fails, the
//! snapshot is restored and the error returned.

use dashmap::DashMap;
use deferred_core::{Error, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::command::{Command, Reply};
use crate::traits::Store;

/// A stored value
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Str(String),
    Set(FxHashSet<String>),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Str(_) => "string",
            Entry::Set(_) => "set",
        }
    }

    fn as_set(&self, key: &str) -> Result<&FxHashSet<String>> {
        match self {
            Entry::Set(set) => Ok(set),
            other => Err(wrong_type(key, "set", other)),
        }
    }

    fn as_set_mut(&mut self, key: &str) -> Result<&mut FxHashSet<String>> {
        match self {
            Entry::Set(set) => Ok(set),
            other => Err(wrong_type(key, "set", other)),
        }
    }

    fn is_empty_set(&self) -> bool {
        matches!(self, Entry::Set(set) if set.is_empty())
    }
}

fn wrong_type(key: &str, expected: &'static str, actual: &Entry) -> Error {
    Error::WrongType {
        key: key.to_string(),
        expected,
        actual: actual.kind(),
    }
}

/// In-memory store sharded by key
///
/// # Thread Safety
///
/// All operations are thread-safe:
/// - single commands only lock the shard holding their key
/// - `multi` excludes every other command for the duration of the batch
///
/// # Example
///
/// ```
/// use deferred_storage::{ShardedStore, Store};
///
/// let store = ShardedStore::new();
/// store.sadd("pending", vec!["a".into(), "b".into()]).unwrap();
/// assert_eq!(store.scard("pending").unwrap(), 2);
/// ```
pub struct ShardedStore {
    data: DashMap<String, Entry>,
    /// Read for single commands, write for batches
    batch_lock: RwLock<()>,
}

impl ShardedStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            batch_lock: RwLock::new(()),
        }
    }

    /// Create with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: DashMap::with_capacity(capacity),
            batch_lock: RwLock::new(()),
        }
    }

    /// Number of keys currently stored
    pub fn key_count(&self) -> usize {
        self.data.len()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if a key exists (of either type)
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Remove every key
    pub fn clear(&self) {
        let _guard = self.batch_lock.write();
        self.data.clear();
    }

    /// Apply one command. The caller holds the batch lock.
    fn apply(&self, command: Command) -> Result<Reply> {
        match command {
            Command::Get { key } => match self.data.get(&key) {
                Some(entry) => match entry.value() {
                    Entry::Str(value) => Ok(Reply::Bulk(value.clone())),
                    other => Err(wrong_type(&key, "string", other)),
                },
                None => Ok(Reply::Nil),
            },
            Command::Set { key, value } => {
                self.data.insert(key, Entry::Str(value));
                Ok(Reply::Ok)
            }
            Command::Del { keys } => {
                let removed = keys
                    .iter()
                    .filter(|k| self.data.remove(k.as_str()).is_some())
                    .count();
                Ok(Reply::Integer(removed as u64))
            }
            Command::SAdd { key, members } => {
                if members.is_empty() {
                    // Never materialize an empty set
                    return match self.data.get(&key) {
                        Some(entry) => entry.as_set(&key).map(|_| Reply::Integer(0)),
                        None => Ok(Reply::Integer(0)),
                    };
                }
                let mut entry = self
                    .data
                    .entry(key.clone())
                    .or_insert_with(|| Entry::Set(FxHashSet::default()));
                let set = entry.as_set_mut(&key)?;
                let added = members.into_iter().filter(|m| set.insert(m.clone())).count();
                Ok(Reply::Integer(added as u64))
            }
            Command::SRem { key, members } => {
                let removed = {
                    let Some(mut entry) = self.data.get_mut(&key) else {
                        return Ok(Reply::Integer(0));
                    };
                    let set = entry.as_set_mut(&key)?;
                    let removed = members.iter().filter(|m| set.remove(m.as_str())).count();
                    removed
                };
                // Empty sets cease to exist
                self.data.remove_if(&key, |_, entry| entry.is_empty_set());
                Ok(Reply::Integer(removed as u64))
            }
            Command::SCard { key } => match self.data.get(&key) {
                Some(entry) => Ok(Reply::Integer(entry.as_set(&key)?.len() as u64)),
                None => Ok(Reply::Integer(0)),
            },
            Command::SIsMember { key, member } => match self.data.get(&key) {
                Some(entry) => Ok(Reply::Bool(entry.as_set(&key)?.contains(&member))),
                None => Ok(Reply::Bool(false)),
            },
            Command::SMembers { key } => match self.data.get(&key) {
                Some(entry) => {
                    let mut members: Vec<String> =
                        entry.as_set(&key)?.iter().cloned().collect();
                    members.sort();
                    Ok(Reply::Members(members))
                }
                None => Ok(Reply::Members(Vec::new())),
            },
        }
    }

    fn snapshot(&self, commands: &[Command]) -> Vec<(String, Option<Entry>)> {
        commands
            .iter()
            .flat_map(|c| c.keys())
            .map(|k| (k.to_string(), self.data.get(k).map(|e| e.value().clone())))
            .collect()
    }

    fn restore(&self, snapshot: Vec<(String, Option<Entry>)>) {
        // Reverse order so the earliest (pre-batch) image of a key wins
        for (key, entry) in snapshot.into_iter().rev() {
            match entry {
                Some(entry) => {
                    self.data.insert(key, entry);
                }
                None => {
                    self.data.remove(&key);
                }
            }
        }
    }
}

impl Store for ShardedStore {
    fn execute(&self, command: Command) -> Result<Reply> {
        let _guard = self.batch_lock.read();
        self.apply(command)
    }

    fn multi(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        let _guard = self.batch_lock.write();
        let snapshot = self.snapshot(&commands);

        let mut replies = Vec::with_capacity(commands.len());
        for command in commands {
            let name = command.name();
            match self.apply(command) {
                Ok(reply) => replies.push(reply),
                Err(e) => {
                    tracing::debug!(command = name, error = %e, "batch aborted, restoring keys");
                    self.restore(snapshot);
                    return Err(e);
                }
            }
        }
        Ok(replies)
    }
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShardedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedStore")
            .field("key_count", &self.key_count())
            .finish()
    }
}
