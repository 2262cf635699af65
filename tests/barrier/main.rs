//! Barrier Integration Test Suite
//!
//! Exercises the public client end to end: creation and lookup, the `done`
//! transition, dispatch strategies, key mapping, and exactly-once firing
//! under concurrent producers.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all barrier tests
//! cargo test --test barrier
//!
//! # Run concurrency tests only
//! cargo test --test barrier concurrency::
//!
//! # Redis backend (needs a server)
//! DEFERRED_REDIS_URL=redis://127.0.0.1/ cargo test --test barrier --features redis -- --ignored
//! ```

use std::sync::Arc;

use deferred::{ActionRegistry, Deferred, InMemoryWorkerQueue, Value};
use parking_lot::Mutex;

// Test modules
pub mod concurrency;
pub mod dispatch;
pub mod done;
pub mod properties;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Generic action that records every invocation
pub const RECORDED: &str = "SomethingWorker";

/// Worker-queue action posted to [`Harness::queue`]
pub const QUEUED: &str = "QueuedWorker";

/// Action whose handler always fails
pub const FAILING: &str = "FailingWorker";

/// Action whose handler panics
pub const PANICKING: &str = "PanickingWorker";

/// Client plus handles on everything its actions touch
pub struct Harness {
    pub client: Deferred,
    pub registry: Arc<ActionRegistry>,
    pub calls: Arc<Mutex<Vec<Vec<Value>>>>,
    pub queue: Arc<InMemoryWorkerQueue>,
}

impl Harness {
    /// Client over a fresh in-memory store with the standard actions
    pub fn new() -> Self {
        let registry = Arc::new(standard_registry());
        let calls = Arc::new(Mutex::new(Vec::new()));
        let queue = Arc::new(InMemoryWorkerQueue::new("default"));

        let sink = Arc::clone(&calls);
        registry.register(RECORDED, move |args: &[Value]| -> anyhow::Result<()> {
            sink.lock().push(args.to_vec());
            Ok(())
        });
        registry.register_worker(QUEUED, queue.clone());

        Self {
            client: Deferred::ephemeral(Arc::clone(&registry)),
            registry,
            calls,
            queue,
        }
    }

    /// Number of times the recorded action ran
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry with the failing and panicking actions
pub fn standard_registry() -> ActionRegistry {
    let registry = ActionRegistry::new();
    registry.register(FAILING, |_: &[Value]| -> anyhow::Result<()> {
        anyhow::bail!("mailer unavailable")
    });
    registry.register(PANICKING, |_: &[Value]| -> anyhow::Result<()> {
        panic!("handler panicked")
    });
    registry
}

/// Install a test subscriber so `verbose` traces are exercised
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
