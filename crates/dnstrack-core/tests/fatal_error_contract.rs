//! Architectural Contract Test: Fatal Errors Stop the Loop
//!
//! This test verifies that failures outside the transient taxonomy are
//! surfaced to the caller instead of being retried.
//!
//! Constraints verified:
//! - An unclassified resolver failure ends the loop with an error naming the domain
//! - Nothing is persisted or tracked for that cycle
//! - A state load failure at startup ends the loop before any query
//!
//! If this test fails, someone has:
//! - Swallowed unknown resolver errors
//! - Counted unknown errors as ordinary retries

mod common;

use common::*;
use dnstrack_core::traits::FailureKind;
use dnstrack_core::{
    Error, FileStateStore, MemoryTracker, PollWorker, StateStore, StopReason, TrackerConfig,
};

#[tokio::test(start_paused = true)]
async fn unclassified_failure_is_fatal_and_leaves_state_alone() {
    let resolver = ScriptedResolver::new().fail("broken.example", FailureKind::Other);
    let seeded = vec![record("broken.example", 3, 120, NOW - 500)];
    let mut h = harness(seeded.clone(), resolver);

    let result = h.worker.run_with_shutdown(None).await;

    match result {
        Err(Error::Resolver { domain, .. }) => assert_eq!(domain, "broken.example"),
        other => panic!("expected resolver error, got {:?}", other),
    }
    assert_eq!(h.store.persist_count(), 0);
    assert_eq!(h.store.load().await.unwrap().into_records(), seeded);
    assert!(h.tracker.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn missing_state_file_fails_before_any_query() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStateStore::new(dir.path().join("domainlist.json"), 5)
        .await
        .unwrap();
    let resolver = ScriptedResolver::new();

    let (mut worker, _events) = PollWorker::new(
        Box::new(resolver.clone()),
        Box::new(store),
        Box::new(MemoryTracker::new()),
        Box::new(ManualClock::new(NOW)),
        &TrackerConfig::default(),
    )
    .unwrap();

    let result = worker.run_with_shutdown(None).await;

    assert!(matches!(result, Err(Error::StorageRead(_))));
    assert_eq!(resolver.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn empty_stored_set_stops_immediately() {
    let mut h = harness(vec![record("gone.example", 6, 0, NOW)], ScriptedResolver::new());

    let reason = h.worker.run_with_shutdown(None).await.unwrap();

    assert_eq!(reason, StopReason::Exhausted);
    assert_eq!(h.resolver.call_count(), 0);
}

#[test]
fn mismatched_expiry_threshold_is_rejected() {
    let store = dnstrack_core::MemoryStateStore::new(3);
    let result = PollWorker::new(
        Box::new(ScriptedResolver::new()),
        Box::new(store),
        Box::new(MemoryTracker::new()),
        Box::new(ManualClock::new(NOW)),
        &memory_config(),
    );

    assert!(matches!(result, Err(Error::Config(_))));
}
