//! Dispatch Strategy Tests

use crate::*;
use deferred::{Error, Namespaced, ShardedStore, Store, WorkerQueue};
use serde_json::json;

#[test]
fn generic_action_uses_generic_strategy() {
    let h = Harness::new();
    let job = h.client.create("job", RECORDED, vec![]).unwrap();

    assert_eq!(job.dispatcher_name(), "generic");
    assert!(!job.action().is_worker());
}

#[test]
fn worker_action_posts_to_queue() {
    let h = Harness::new();
    let job = h
        .client
        .create("job", QUEUED, vec![json!("a1"), json!(2)])
        .unwrap();
    assert_eq!(job.dispatcher_name(), "worker");
    job.wait_for(["a"]).unwrap();

    assert!(job.done(["a"]).unwrap().is_fired());

    let entry = h.queue.take().unwrap();
    assert_eq!(entry.action, QUEUED);
    assert_eq!(entry.args, vec![json!("a1"), json!(2)]);
    assert!(h.queue.is_empty());
    assert_eq!(h.call_count(), 0);
}

#[test]
fn full_queue_destroys_and_cannot_be_retried() {
    let registry = Arc::new(ActionRegistry::new());
    let queue = Arc::new(InMemoryWorkerQueue::with_capacity("tiny", 0));
    registry.register_worker("Job", queue.clone());
    let client = Deferred::ephemeral(registry);

    let job = client.create("job", "Job", vec![]).unwrap();
    job.wait_for(["a"]).unwrap();
    let err = job.done(["a"]).unwrap_err();

    assert!(matches!(err, Error::Dispatch(_)));
    assert!(!err.is_retryable());
    assert!(!client.exists("job").unwrap());
    assert!(queue.is_empty());

    // The fire was spent; repeating the call does nothing
    assert!(!job.done(["a"]).unwrap().is_fired());
    assert!(queue.is_empty());
}

#[test]
fn with_store_prefers_queue_store() {
    let queue_store: Arc<dyn Store> = Arc::new(ShardedStore::new());
    queue_store.set("marker", "queue").unwrap();
    let queue = Arc::new(InMemoryWorkerQueue::new("q").with_store(Arc::clone(&queue_store)));
    assert!(queue.store().is_some());

    let registry = Arc::new(ActionRegistry::new());
    registry.register_worker("Job", queue);
    registry.register("Plain", |_: &[Value]| -> anyhow::Result<()> { Ok(()) });
    let client = Deferred::ephemeral(registry);

    let worker_job = client.create("w", "Job", vec![]).unwrap();
    let plain_job = client.create("p", "Plain", vec![]).unwrap();

    let seen = worker_job.with_store(|s| s.get("marker").unwrap());
    assert_eq!(seen.as_deref(), Some("queue"));

    let seen = plain_job.with_store(|s| s.get("p").unwrap());
    assert_eq!(seen.as_deref(), Some(r#"["Plain",[]]"#));
}

#[test]
fn namespaced_clients_are_isolated() {
    let backing = Arc::new(ShardedStore::new());
    let registry = Arc::new(standard_registry());
    registry.register("Noop", |_: &[Value]| -> anyhow::Result<()> { Ok(()) });

    let a = Deferred::builder()
        .store(Arc::new(Namespaced::new(Arc::clone(&backing), "a")))
        .registry(Arc::clone(&registry))
        .build()
        .unwrap();
    let b = Deferred::builder()
        .store(Arc::new(Namespaced::new(Arc::clone(&backing), "b")))
        .registry(registry)
        .build()
        .unwrap();

    let job = a.create("job", "Noop", vec![]).unwrap();
    job.wait_for(["t"]).unwrap();

    assert!(a.exists("job").unwrap());
    assert!(!b.exists("job").unwrap());
    assert!(backing.contains("a:job"));
    assert!(backing.contains("a:deferred-job:job"));
}
