//! Test doubles and common utilities for poll loop contract tests
//!
//! This module provides minimal test doubles that let the contract tests
//! script resolver answers, pin the clock and observe store traffic.

#![allow(dead_code)]

use dnstrack_core::config::{StateStoreConfig, TrackStoreConfig, TrackerConfig};
use dnstrack_core::error::{Error, Result};
use dnstrack_core::record::{DomainRecord, WorkingSet};
use dnstrack_core::scheduler::Scheduler;
use dnstrack_core::state::MemoryStateStore;
use dnstrack_core::traits::{
    Clock, FailureKind, Resolution, ResolveFailure, Resolver, StateStore,
};
use dnstrack_core::worker::{PollEvent, PollWorker};
use dnstrack_core::MemoryTracker;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Fixed "now" used across the contract tests
pub const NOW: i64 = 1_700_000_000;

/// A resolver that replays scripted answers per domain
///
/// Once a domain's script is used up, further lookups fail with
/// `FailureKind::Other` so unexpected queries stop the loop loudly.
#[derive(Clone, Default)]
pub struct ScriptedResolver {
    scripts: Arc<Mutex<HashMap<String, VecDeque<std::result::Result<Resolution, ResolveFailure>>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer for `domain`
    pub fn answer(self, domain: &str, ttl: u32, addresses: &[Ipv4Addr]) -> Self {
        self.push(domain, Ok(Resolution::new(ttl, addresses.to_vec())));
        self
    }

    /// Queue a failure for `domain`
    pub fn fail(self, domain: &str, kind: FailureKind) -> Self {
        self.push(domain, Err(ResolveFailure::new(kind, "scripted failure")));
        self
    }

    /// Queue the same failure `times` times
    pub fn fail_times(self, domain: &str, kind: FailureKind, times: usize) -> Self {
        (0..times).fold(self, |resolver, _| resolver.fail(domain, kind))
    }

    /// Domains queried so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, domain: &str, result: std::result::Result<Resolution, ResolveFailure>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push_back(result);
    }
}

#[async_trait::async_trait]
impl Resolver for ScriptedResolver {
    async fn resolve(&self, name: &str) -> std::result::Result<Resolution, ResolveFailure> {
        self.calls.lock().unwrap().push(name.to_string());
        self.scripts
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ResolveFailure::new(
                    FailureKind::Other,
                    format!("no scripted answer left for {}", name),
                ))
            })
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// A clock the test sets by hand
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A StateStore wrapper that counts traffic and can be told to fail
#[derive(Clone)]
pub struct CountingStateStore {
    inner: MemoryStateStore,
    load_count: Arc<AtomicUsize>,
    persist_count: Arc<AtomicUsize>,
    fail_persist: bool,
}

impl CountingStateStore {
    pub fn new(inner: MemoryStateStore) -> Self {
        Self {
            inner,
            load_count: Arc::new(AtomicUsize::new(0)),
            persist_count: Arc::new(AtomicUsize::new(0)),
            fail_persist: false,
        }
    }

    /// Make every persist fail with a write error
    pub fn failing_persist(mut self) -> Self {
        self.fail_persist = true;
        self
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn persist_count(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateStore for CountingStateStore {
    async fn load(&self) -> Result<WorkingSet> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        self.inner.load().await
    }

    async fn persist(&self, set: &WorkingSet) -> Result<()> {
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist {
            return Err(Error::storage_write("disk full"));
        }
        self.inner.persist(set).await
    }

    fn max_attempts(&self) -> u32 {
        self.inner.max_attempts()
    }
}

/// Build a record with explicit fields
pub fn record(name: &str, attempts: u32, last_ttl: u32, last_query_ts: i64) -> DomainRecord {
    DomainRecord {
        name: name.to_string(),
        attempts,
        last_ttl,
        last_query_ts,
    }
}

/// Helper to create a memory-backed TrackerConfig for testing
pub fn memory_config() -> TrackerConfig {
    let mut config = TrackerConfig::new();
    config.state_store = StateStoreConfig::Memory;
    config.track_store = TrackStoreConfig::Memory;
    config
}

/// Everything a contract test needs to drive and observe a worker
pub struct Harness {
    pub worker: PollWorker,
    pub events: mpsc::Receiver<PollEvent>,
    pub store: CountingStateStore,
    pub tracker: MemoryTracker,
    pub resolver: ScriptedResolver,
    pub clock: ManualClock,
}

/// Wire a worker over memory stores seeded with `records`
pub fn harness(records: Vec<DomainRecord>, resolver: ScriptedResolver) -> Harness {
    harness_with_store(
        CountingStateStore::new(MemoryStateStore::with_records(records, 5)),
        resolver,
    )
}

/// Wire a worker over a caller-provided store
pub fn harness_with_store(store: CountingStateStore, resolver: ScriptedResolver) -> Harness {
    let tracker = MemoryTracker::new();
    let clock = ManualClock::new(NOW);

    let (worker, events) = PollWorker::new(
        Box::new(resolver.clone()),
        Box::new(store.clone()),
        Box::new(tracker.clone()),
        Box::new(clock.clone()),
        &memory_config(),
    )
    .expect("worker construction succeeds");

    let worker = worker.with_scheduler(Scheduler::with_rng(50, StdRng::seed_from_u64(42)));

    Harness {
        worker,
        events,
        store,
        tracker,
        resolver,
        clock,
    }
}

/// Drain all events emitted so far
pub fn drain(events: &mut mpsc::Receiver<PollEvent>) -> Vec<PollEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
