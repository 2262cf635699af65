//! Commands and replies understood by a [`Store`](crate::Store)
//!
//! The command set is the minimum a barrier needs: descriptor storage
//! (`GET`, `SET`, `DEL`) and pending-set manipulation (`SADD`, `SREM`,
//! `SCARD`, `SISMEMBER`, `SMEMBERS`).

/// A single key-value command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read a string value
    Get {
        /// Key to read
        key: String,
    },
    /// Write a string value, replacing whatever the key held
    Set {
        /// Key to write
        key: String,
        /// Value to store
        value: String,
    },
    /// Remove keys of any type
    Del {
        /// Keys to remove
        keys: Vec<String>,
    },
    /// Add members to a set
    SAdd {
        /// Set key
        key: String,
        /// Members to add
        members: Vec<String>,
    },
    /// Remove members from a set
    SRem {
        /// Set key
        key: String,
        /// Members to remove
        members: Vec<String>,
    },
    /// Cardinality of a set
    SCard {
        /// Set key
        key: String,
    },
    /// Membership test
    SIsMember {
        /// Set key
        key: String,
        /// Member to test
        member: String,
    },
    /// All members of a set
    SMembers {
        /// Set key
        key: String,
    },
}

impl Command {
    /// Command name, as used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SCard { .. } => "SCARD",
            Command::SIsMember { .. } => "SISMEMBER",
            Command::SMembers { .. } => "SMEMBERS",
        }
    }

    /// Keys this command reads or writes
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Command::Del { keys } => keys.iter().map(String::as_str).collect(),
            Command::Get { key }
            | Command::Set { key, .. }
            | Command::SAdd { key, .. }
            | Command::SRem { key, .. }
            | Command::SCard { key }
            | Command::SIsMember { key, .. }
            | Command::SMembers { key } => vec![key.as_str()],
        }
    }

    /// Rewrite every key with `f`, leaving values and members untouched
    pub fn map_keys(self, f: impl Fn(&str) -> String) -> Self {
        match self {
            Command::Get { key } => Command::Get { key: f(&key) },
            Command::Set { key, value } => Command::Set { key: f(&key), value },
            Command::Del { keys } => Command::Del {
                keys: keys.iter().map(|k| f(k)).collect(),
            },
            Command::SAdd { key, members } => Command::SAdd { key: f(&key), members },
            Command::SRem { key, members } => Command::SRem { key: f(&key), members },
            Command::SCard { key } => Command::SCard { key: f(&key) },
            Command::SIsMember { key, member } => Command::SIsMember { key: f(&key), member },
            Command::SMembers { key } => Command::SMembers { key: f(&key) },
        }
    }
}

/// Reply to a single command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Write acknowledged
    Ok,
    /// Key absent
    Nil,
    /// String value
    Bulk(String),
    /// Count (added, removed, deleted, cardinality)
    Integer(u64),
    /// Membership answer
    Bool(bool),
    /// Set members
    Members(Vec<String>),
}
