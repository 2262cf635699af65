//! Redis backend
//!
//! [`RedisStore`] sends every command to a Redis server, so one barrier can
//! be shared by any number of processes on any number of machines. `multi`
//! is sent as a `MULTI`/`EXEC` pipeline: Redis applies the queued commands
//! with nothing else interleaved and returns one reply per command.
//!
//! ## Limitations
//!
//! - Redis does not roll back a transaction when one of its commands fails
//!   at runtime (e.g. `WRONGTYPE`). The error is still returned, but earlier
//!   commands of the batch stay applied.
//! - `SADD`/`SREM` with no members and `DEL` with no keys are answered
//!   locally with `0`; Redis rejects them as malformed.

use std::fmt;

use ::redis::{Client, Cmd, Connection, FromRedisValue, RedisError, Value as RedisValue};
use deferred_core::{Error, Result};
use parking_lot::Mutex;

use crate::command::{Command, Reply};
use crate::traits::Store;

/// A store backed by a Redis server
///
/// Holds one connection, reopened on the next call after it drops.
/// Commands from threads sharing a `RedisStore` are serialized on that
/// connection; open one store per thread for parallel round trips.
pub struct RedisStore {
    client: Client,
    conn: Mutex<Option<Connection>>,
}

impl RedisStore {
    /// Connect to `url` (`redis://host:port/db`)
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(backend)?;
        let conn = client.get_connection().map_err(backend)?;
        tracing::debug!(url, "connected to redis");
        Ok(Self {
            client,
            conn: Mutex::new(Some(conn)),
        })
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> std::result::Result<T, RedisError>,
    ) -> std::result::Result<T, RedisError> {
        let mut slot = self.conn.lock();
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => self.client.get_connection()?,
        };
        let result = f(&mut conn);
        match &result {
            Err(e) if e.is_connection_dropped() || e.is_io_error() => {
                tracing::debug!(error = %e, "dropping redis connection");
            }
            _ => *slot = Some(conn),
        }
        result
    }
}

impl Store for RedisStore {
    fn execute(&self, command: Command) -> Result<Reply> {
        let Some(cmd) = to_cmd(&command) else {
            return Ok(Reply::Integer(0));
        };
        let value = self
            .with_connection(|conn| cmd.query::<RedisValue>(conn))
            .map_err(|e| command_error(&command, e))?;
        decode(&command, &value).map_err(|e| command_error(&command, e))
    }

    fn multi(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        let mut pipe = ::redis::pipe();
        pipe.atomic();
        let mut sent = 0;
        for cmd in commands.iter().filter_map(to_cmd) {
            pipe.add_command(cmd);
            sent += 1;
        }

        let values: Vec<RedisValue> = if sent == 0 {
            Vec::new()
        } else {
            self.with_connection(|conn| pipe.query::<Vec<RedisValue>>(conn))
                .map_err(backend)?
        };
        if values.len() != sent {
            return Err(Error::storage(format!(
                "redis transaction returned {} replies for {} commands",
                values.len(),
                sent
            )));
        }

        let mut values = values.iter();
        commands
            .iter()
            .map(|command| {
                if to_cmd(command).is_none() {
                    return Ok(Reply::Integer(0));
                }
                match values.next() {
                    Some(value) => decode(command, value).map_err(|e| command_error(command, e)),
                    None => Err(Error::storage("redis transaction ended early")),
                }
            })
            .collect()
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("connected", &self.conn.lock().is_some())
            .finish()
    }
}

/// Wire form of a command; `None` when it needs no round trip
fn to_cmd(command: &Command) -> Option<Cmd> {
    let mut cmd = Cmd::new();
    cmd.arg(command.name());
    match command {
        Command::Get { key } | Command::SCard { key } | Command::SMembers { key } => {
            cmd.arg(key);
        }
        Command::Set { key, value } => {
            cmd.arg(key).arg(value);
        }
        Command::SIsMember { key, member } => {
            cmd.arg(key).arg(member);
        }
        Command::Del { keys } => {
            if keys.is_empty() {
                return None;
            }
            cmd.arg(keys);
        }
        Command::SAdd { key, members } | Command::SRem { key, members } => {
            if members.is_empty() {
                return None;
            }
            cmd.arg(key).arg(members);
        }
    }
    Some(cmd)
}

/// Map a raw Redis reply to the shape `command` is answered with
fn decode(command: &Command, value: &RedisValue) -> std::result::Result<Reply, RedisError> {
    Ok(match command {
        Command::Get { .. } => match Option::<String>::from_redis_value(value)? {
            Some(v) => Reply::Bulk(v),
            None => Reply::Nil,
        },
        Command::Set { .. } => {
            <()>::from_redis_value(value)?;
            Reply::Ok
        }
        Command::Del { .. } | Command::SAdd { .. } | Command::SRem { .. } | Command::SCard { .. } => {
            Reply::Integer(u64::from_redis_value(value)?)
        }
        Command::SIsMember { .. } => Reply::Bool(bool::from_redis_value(value)?),
        Command::SMembers { .. } => {
            let mut members = Vec::<String>::from_redis_value(value)?;
            members.sort();
            Reply::Members(members)
        }
    })
}

fn command_error(command: &Command, e: RedisError) -> Error {
    if e.code() == Some("WRONGTYPE") {
        let (expected, actual) = match command {
            Command::Get { .. } | Command::Set { .. } | Command::Del { .. } => ("string", "set"),
            _ => ("set", "string"),
        };
        return Error::WrongType {
            key: command.keys().first().map(|k| k.to_string()).unwrap_or_default(),
            expected,
            actual,
        };
    }
    backend(e)
}

fn backend(e: RedisError) -> Error {
    Error::storage(format!("redis: {}", e))
}
