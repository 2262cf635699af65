//! Concurrency Tests
//!
//! Many producers racing on one barrier must fire it exactly once.

use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier as StartLine;
use std::thread;

fn counting_client() -> (Deferred, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&fired);
    let registry = Arc::new(ActionRegistry::new());
    registry.register("Count", move |_: &[Value]| -> anyhow::Result<()> {
        sink.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (Deferred::ephemeral(registry), fired)
}

#[test]
fn one_token_per_thread_fires_once() {
    const THREADS: usize = 16;

    for round in 0..20 {
        let (client, fired) = counting_client();
        let id = format!("job-{}", round);
        let job = client.create(&id, "Count", vec![]).unwrap();
        job.wait_for((0..THREADS).map(|i| format!("t{}", i))).unwrap();

        let start = Arc::new(StartLine::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let client = client.clone();
                let start = Arc::clone(&start);
                let id = id.clone();
                thread::spawn(move || {
                    let job = client.find(&id).unwrap();
                    start.wait();
                    job.done([format!("t{}", i)]).unwrap().is_fired()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|fired| *fired)
            .count();

        assert_eq!(winners, 1, "round {}", round);
        assert_eq!(fired.load(Ordering::SeqCst), 1, "round {}", round);
        assert!(!client.exists(&id).unwrap());
    }
}

#[test]
fn overlapping_tokens_fire_once() {
    const THREADS: usize = 8;
    let (client, fired) = counting_client();
    let job = client.create("job", "Count", vec![]).unwrap();
    job.wait_for(["a", "b"]).unwrap();

    // Every thread marks both tokens done
    let start = Arc::new(StartLine::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let job = job.clone();
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                job.done(["a", "b"]).unwrap().is_fired()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|fired| *fired)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn independent_barriers_fire_independently() {
    const BARRIERS: usize = 8;
    let (client, fired) = counting_client();

    let handles: Vec<_> = (0..BARRIERS)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                let job = client.create(&format!("job-{}", i), "Count", vec![]).unwrap();
                job.wait_for(["a", "b"]).unwrap();
                assert!(!job.done(["a"]).unwrap().is_fired());
                assert!(job.done(["b"]).unwrap().is_fired());
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(fired.load(Ordering::SeqCst), BARRIERS);
}
