//! Architectural Contract Test: Write-Through Persistence
//!
//! This test verifies that every poll is persisted before the next one
//! starts, and that the worker continues from what storage returns.
//!
//! Constraints verified:
//! - Exactly one persist and one reload per cycle
//! - Track entries are appended only after the state is durable
//! - A failed persist stops the loop without writing a track entry
//!
//! If this test fails, someone has:
//! - Batched state writes across cycles
//! - Kept polling from an in-memory copy instead of the reloaded set

mod common;

use common::*;
use dnstrack_core::state::MemoryStateStore;
use dnstrack_core::{Error, StateStore};
use std::net::Ipv4Addr;

#[tokio::test(start_paused = true)]
async fn each_cycle_persists_and_reloads_once() {
    let resolver = ScriptedResolver::new()
        .answer("a.example", 60, &[Ipv4Addr::new(1, 2, 3, 4)])
        .answer("b.example", 60, &[Ipv4Addr::new(5, 6, 7, 8)])
        .answer("a.example", 60, &[Ipv4Addr::new(1, 2, 3, 4)]);
    let mut h = harness(
        vec![record("a.example", 0, 0, 0), record("b.example", 0, 0, 0)],
        resolver,
    );

    let mut set = h.store.load().await.unwrap();
    let loads_before = h.store.load_count();

    for cycle in 1..=3 {
        // Each cycle moves time forward so answers go stale in order
        h.clock.set(NOW + 100 * cycle);
        let report = h.worker.poll_once(set).await.expect("cycle succeeds");
        assert_eq!(h.store.persist_count(), cycle as usize);
        assert_eq!(h.store.load_count(), loads_before + cycle as usize);
        set = report.working_set;
    }

    assert_eq!(
        h.resolver.calls(),
        vec!["a.example", "b.example", "a.example"]
    );
    assert_eq!(h.tracker.len().await, 3);
}

#[tokio::test(start_paused = true)]
async fn reloaded_set_matches_storage() {
    let resolver = ScriptedResolver::new().answer("a.example", 45, &[]);
    let mut h = harness(vec![record("a.example", 2, 0, 0)], resolver);

    let set = h.store.load().await.unwrap();
    let report = h.worker.poll_once(set).await.unwrap();

    assert_eq!(report.working_set, h.store.load().await.unwrap());
    assert_eq!(report.working_set.get("a.example").unwrap().attempts, 0);
}

#[tokio::test(start_paused = true)]
async fn persist_failure_stops_before_tracking() {
    let store = CountingStateStore::new(MemoryStateStore::with_records(
        vec![record("a.example", 0, 0, 0)],
        5,
    ))
    .failing_persist();
    let resolver = ScriptedResolver::new().answer("a.example", 60, &[Ipv4Addr::new(1, 2, 3, 4)]);
    let mut h = harness_with_store(store, resolver);

    let result = h.worker.run_with_shutdown(None).await;

    assert!(matches!(result, Err(Error::StorageWrite(_))));
    assert_eq!(h.resolver.call_count(), 1);
    assert!(h.tracker.is_empty().await, "nothing is tracked for an unsaved poll");
}
