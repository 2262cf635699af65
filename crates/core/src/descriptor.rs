//! Persisted barrier descriptor
//!
//! A descriptor records what to run when a barrier fires. It is stored under
//! the barrier id as a two-element JSON array:
//!
//! ```json
//! ["SomethingWorker", ["a1", "a2"]]
//! ```
//!
//! The pending set lives under a separate key, so clearing it never loses
//! the descriptor.

use serde_json::Value;

use crate::error::{Error, Result};

/// The `(action, args)` pair of a barrier
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    action: String,
    args: Vec<Value>,
}

impl Descriptor {
    /// Create a descriptor for a named action
    pub fn new(action: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            action: action.into(),
            args,
        }
    }

    /// Registered name of the action
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Arguments handed to the action at fire time
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Split into action name and arguments
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.action, self.args)
    }

    /// Encode to the stored wire form
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&(&self.action, &self.args))?)
    }

    /// Decode from the stored wire form
    pub fn decode(raw: &str) -> Result<Self> {
        let (action, args): (String, Vec<Value>) = serde_json::from_str(raw)
            .map_err(|e| Error::Serialization(format!("malformed descriptor: {}", e)))?;
        Ok(Self { action, args })
    }
}
