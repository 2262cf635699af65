//! In-memory worker queue
//!
//! [`InMemoryWorkerQueue`] records every job posted to it so tests and
//! tools can inspect what fired.
//!
//! ## Limitations
//!
//! - **Single-process only**: jobs are not visible across process boundaries
//! - **Nothing runs**: jobs sit in the queue until taken

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use deferred_core::Value;
use deferred_storage::Store;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DispatchError, Result};
use crate::worker::WorkerQueue;

/// A job posted to the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// Queue-assigned message id
    pub message_id: String,
    /// Action name
    pub action: String,
    /// Arguments
    pub args: Vec<Value>,
    /// When the job was posted
    pub enqueued_at: DateTime<Utc>,
}

/// In-process worker queue
///
/// ## Example
///
/// ```
/// use deferred_dispatch::{InMemoryWorkerQueue, WorkerQueue};
///
/// let queue = InMemoryWorkerQueue::new("default");
/// queue.perform_async("Reindex", vec![]).unwrap();
/// assert_eq!(queue.len(), 1);
/// ```
pub struct InMemoryWorkerQueue {
    name: String,
    jobs: Mutex<VecDeque<QueueEntry>>,
    max_capacity: Option<usize>,
    store: Option<Arc<dyn Store>>,
}

impl InMemoryWorkerQueue {
    /// Create an unbounded queue
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: Mutex::new(VecDeque::new()),
            max_capacity: None,
            store: None,
        }
    }

    /// Create a queue holding at most `max_capacity` jobs
    pub fn with_capacity(name: impl Into<String>, max_capacity: usize) -> Self {
        Self {
            max_capacity: Some(max_capacity),
            ..Self::new(name)
        }
    }

    /// Attach the store connection this queue exposes to dispatchers
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Take the oldest job
    pub fn take(&self) -> Option<QueueEntry> {
        self.jobs.lock().pop_front()
    }

    /// Look at the oldest job without removing it
    pub fn peek(&self) -> Option<QueueEntry> {
        self.jobs.lock().front().cloned()
    }

    /// Take every job, oldest first
    pub fn drain(&self) -> Vec<QueueEntry> {
        self.jobs.lock().drain(..).collect()
    }

    /// Number of queued jobs
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Check if no jobs are queued
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

impl WorkerQueue for InMemoryWorkerQueue {
    fn name(&self) -> &str {
        &self.name
    }

    fn perform_async(&self, action: &str, args: Vec<Value>) -> Result<String> {
        let mut jobs = self.jobs.lock();
        if let Some(max) = self.max_capacity {
            if jobs.len() >= max {
                return Err(DispatchError::QueueFull {
                    queue: self.name.clone(),
                });
            }
        }

        let message_id = Uuid::new_v4().to_string();
        jobs.push_back(QueueEntry {
            message_id: message_id.clone(),
            action: action.to_string(),
            args,
            enqueued_at: Utc::now(),
        });
        Ok(message_id)
    }

    fn store(&self) -> Option<Arc<dyn Store>> {
        self.store.clone()
    }
}

impl fmt::Debug for InMemoryWorkerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryWorkerQueue")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("max_capacity", &self.max_capacity)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}
