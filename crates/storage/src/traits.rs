//! The storage contract barriers depend on
//!
//! A backend implements two methods: [`Store::execute`] for a single command
//! and [`Store::multi`] for an atomic batch. The typed helpers (`get`,
//! `sadd`, `scard`, ...) are provided on top of `execute` and map each
//! reply back to a Rust type.
//!
//! # Atomicity
//!
//! `multi` is the single correctness-critical primitive: the commands of a
//! batch must be applied with no other command on the store observable in
//! between, and one reply must be returned per command, in order.

use std::sync::Arc;

use deferred_core::{Error, Result};

use crate::command::{Command, Reply};

/// A key-value store with string and set values
///
/// Implementations must be thread-safe; one store is shared by every
/// barrier handle of a client.
pub trait Store: Send + Sync {
    /// Apply a single command
    fn execute(&self, command: Command) -> Result<Reply>;

    /// Apply a batch of commands as one indivisible unit
    ///
    /// Returns one reply per command, in order. If any command fails the
    /// whole batch fails.
    fn multi(&self, commands: Vec<Command>) -> Result<Vec<Reply>>;

    /// Read a string value
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.execute(Command::Get { key: key.to_string() })? {
            Reply::Bulk(value) => Ok(Some(value)),
            Reply::Nil => Ok(None),
            other => Err(unexpected("GET", other)),
        }
    }

    /// Write a string value
    fn set(&self, key: &str, value: &str) -> Result<()> {
        match self.execute(Command::Set {
            key: key.to_string(),
            value: value.to_string(),
        })? {
            Reply::Ok => Ok(()),
            other => Err(unexpected("SET", other)),
        }
    }

    /// Remove keys, returning how many existed
    fn del(&self, keys: &[&str]) -> Result<u64> {
        match self.execute(Command::Del {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        })? {
            Reply::Integer(n) => Ok(n),
            other => Err(unexpected("DEL", other)),
        }
    }

    /// Add members to a set, returning how many were new
    fn sadd(&self, key: &str, members: Vec<String>) -> Result<u64> {
        match self.execute(Command::SAdd {
            key: key.to_string(),
            members,
        })? {
            Reply::Integer(n) => Ok(n),
            other => Err(unexpected("SADD", other)),
        }
    }

    /// Remove members from a set, returning how many were present
    fn srem(&self, key: &str, members: Vec<String>) -> Result<u64> {
        match self.execute(Command::SRem {
            key: key.to_string(),
            members,
        })? {
            Reply::Integer(n) => Ok(n),
            other => Err(unexpected("SREM", other)),
        }
    }

    /// Cardinality of a set (0 if absent)
    fn scard(&self, key: &str) -> Result<u64> {
        match self.execute(Command::SCard { key: key.to_string() })? {
            Reply::Integer(n) => Ok(n),
            other => Err(unexpected("SCARD", other)),
        }
    }

    /// Membership test (false if the set is absent)
    fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        match self.execute(Command::SIsMember {
            key: key.to_string(),
            member: member.to_string(),
        })? {
            Reply::Bool(b) => Ok(b),
            other => Err(unexpected("SISMEMBER", other)),
        }
    }

    /// All members of a set (empty if absent)
    fn smembers(&self, key: &str) -> Result<Vec<String>> {
        match self.execute(Command::SMembers { key: key.to_string() })? {
            Reply::Members(members) => Ok(members),
            other => Err(unexpected("SMEMBERS", other)),
        }
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn execute(&self, command: Command) -> Result<Reply> {
        (**self).execute(command)
    }

    fn multi(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        (**self).multi(commands)
    }
}

/// Build the error for a reply of the wrong shape
pub fn unexpected(command: &'static str, reply: Reply) -> Error {
    Error::UnexpectedReply {
        command,
        reply: format!("{:?}", reply),
    }
}
