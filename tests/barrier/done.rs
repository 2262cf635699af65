//! Done Transition Tests
//!
//! The `done` batch and the fire that follows it.

use crate::*;
use deferred::{DoneOutcome, Error};
use serde_json::json;
use std::panic::{self, AssertUnwindSafe};

// ============================================================================
// Firing
// ============================================================================

#[test]
fn two_token_scenario() {
    let h = Harness::new();
    let job = h.client.create("job1", RECORDED, vec![]).unwrap();
    job.wait_for(["a", "b"]).unwrap();
    assert_eq!(job.count().unwrap(), 2);

    assert_eq!(job.done(["a"]).unwrap(), DoneOutcome::NotFired);
    assert_eq!(job.count().unwrap(), 1);
    assert_eq!(h.call_count(), 0);

    assert_eq!(job.done(["b"]).unwrap(), DoneOutcome::Fired);
    assert_eq!(*h.calls.lock(), vec![Vec::<Value>::new()]);
    assert!(h.client.find("job1").unwrap_err().is_not_found());
}

#[test]
fn fire_passes_args() {
    let h = Harness::new();
    let job = h
        .client
        .create("job", RECORDED, vec![json!("a1"), json!({"n": 2})])
        .unwrap();
    job.wait_for(["x"]).unwrap();

    job.done(["x"]).unwrap();

    assert_eq!(*h.calls.lock(), vec![vec![json!("a1"), json!({"n": 2})]]);
}

#[test]
fn done_with_several_tokens_at_once() {
    let h = Harness::new();
    let job = h.client.create("job", RECORDED, vec![]).unwrap();
    job.wait_for(["a", "b", "c"]).unwrap();

    assert!(!job.done(["a", "b"]).unwrap().is_fired());
    assert!(job.done(["c", "a"]).unwrap().is_fired());
    assert_eq!(h.call_count(), 1);
}

#[test]
fn handle_found_elsewhere_fires() {
    let h = Harness::new();
    let job = h.client.create("job", RECORDED, vec![]).unwrap();
    job.wait_for(["a", "b"]).unwrap();
    job.done(["a"]).unwrap();

    let other = h.client.find("job").unwrap();

    assert!(other.done(["b"]).unwrap().is_fired());
    assert_eq!(h.call_count(), 1);
}

// ============================================================================
// Not Firing
// ============================================================================

#[test]
fn done_with_absent_token_changes_nothing() {
    let h = Harness::new();
    let job = h.client.create("job", RECORDED, vec![]).unwrap();
    job.wait_for(["a", "b"]).unwrap();

    for _ in 0..3 {
        assert_eq!(job.done(["zzz"]).unwrap(), DoneOutcome::NotFired);
        assert_eq!(job.count().unwrap(), 2);
    }
    assert_eq!(h.call_count(), 0);
}

#[test]
fn done_on_barrier_without_preconditions_never_fires() {
    let h = Harness::new();
    let job = h.client.create("job", RECORDED, vec![]).unwrap();

    assert_eq!(job.done(["a"]).unwrap(), DoneOutcome::NotFired);
    assert_eq!(h.call_count(), 0);
    assert!(h.client.exists("job").unwrap());
}

#[test]
fn done_after_fire_is_not_fired() {
    let h = Harness::new();
    let job = h.client.create("job", RECORDED, vec![]).unwrap();
    job.wait_for(["a"]).unwrap();
    assert!(job.done(["a"]).unwrap().is_fired());

    assert_eq!(job.done(["a"]).unwrap(), DoneOutcome::NotFired);
    assert_eq!(h.call_count(), 1);
}

#[test]
fn handle_kept_after_fire_never_fires_again() {
    let h = Harness::new();
    let job = h.client.create("job", RECORDED, vec![]).unwrap();
    job.wait_for(["a"]).unwrap();
    assert!(job.done(["a"]).unwrap().is_fired());

    // Tokens added through the spent handle land in an orphan set
    job.wait_for(["x"]).unwrap();
    assert_eq!(job.done(["x"]).unwrap(), DoneOutcome::NotFired);

    assert_eq!(h.call_count(), 1);
    assert_eq!(job.count().unwrap(), 0);
    assert!(h.client.find("job").unwrap_err().is_not_found());
}

#[test]
fn handle_kept_after_destroy_never_fires() {
    let h = Harness::new();
    let job = h.client.create("job", RECORDED, vec![]).unwrap();
    job.destroy().unwrap();

    job.wait_for(["x"]).unwrap();

    assert_eq!(job.done(["x"]).unwrap(), DoneOutcome::NotFired);
    assert_eq!(h.call_count(), 0);
}

#[test]
fn old_handle_fires_the_recreated_descriptor() {
    let h = Harness::new();
    let old = h.client.create("job", FAILING, vec![json!("old")]).unwrap();
    let new = h.client.create("job", RECORDED, vec![json!("new")]).unwrap();
    new.wait_for(["a"]).unwrap();

    assert!(old.done(["a"]).unwrap().is_fired());

    assert_eq!(*h.calls.lock(), vec![vec![json!("new")]]);
    assert!(!h.client.exists("job").unwrap());
}

#[test]
fn verbose_client_behaves_the_same() {
    init_tracing();
    let registry = Arc::new(standard_registry());
    registry.register("Noop", |_: &[Value]| -> anyhow::Result<()> { Ok(()) });
    let client = Deferred::builder()
        .registry(registry)
        .verbose(true)
        .build()
        .unwrap();

    let job = client.create("job", "Noop", vec![]).unwrap();
    job.wait_for(["a", "b"]).unwrap();

    assert!(!job.done(["a"]).unwrap().is_fired());
    assert!(job.done(["b"]).unwrap().is_fired());
}

// ============================================================================
// Failure Cleanup
// ============================================================================

#[test]
fn failing_action_propagates_and_destroys() {
    let h = Harness::new();
    let job = h.client.create("job", FAILING, vec![]).unwrap();
    job.wait_for(["a"]).unwrap();

    let err = job.done(["a"]).unwrap_err();

    assert!(err.is_invocation());
    match err {
        Error::Invocation { action, source } => {
            assert_eq!(action, FAILING);
            assert_eq!(source.to_string(), "mailer unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!h.client.exists("job").unwrap());
    assert_eq!(job.count().unwrap(), 0);
    assert!(h.client.find("job").unwrap_err().is_not_found());
}

#[test]
fn panicking_action_still_destroys() {
    let h = Harness::new();
    let job = h.client.create("job", PANICKING, vec![]).unwrap();
    job.wait_for(["a"]).unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| job.done(["a"])));

    assert!(result.is_err());
    assert!(!h.client.exists("job").unwrap());
    assert_eq!(job.count().unwrap(), 0);
}
