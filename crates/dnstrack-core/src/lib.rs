// # dnstrack-core
//
// Core library for TTL-driven DNS resolution tracking.
//
// ## Architecture Overview
//
// This library repeatedly resolves a list of domains, spacing queries by
// each domain's observed TTL, and records the addresses seen over time:
// - **StateStore**: Trait for the durable working set (load / persist)
// - **Resolver**: Trait for `A` lookups with a closed failure taxonomy
// - **Tracker**: Trait for the append-only resolution history
// - **Scheduler**: Picks the next domain and the wait before querying it
// - **PollWorker**: Single-worker loop tying the pieces together
//
// ## Design Principles
//
// 1. **Write-through**: The working set is persisted and reloaded after every poll
// 2. **Sequential**: One domain at a time; the scheduler sleep is the only wait
// 3. **Closed failure taxonomy**: Unknown resolver failures stop the loop
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod record;
pub mod scheduler;
pub mod query;
pub mod worker;
pub mod obfuscate;
pub mod seed;
pub mod config;
pub mod error;
pub mod state;
pub mod history;

// Re-export core types for convenience
pub use traits::{Clock, Resolver, StateStore, SystemClock, Tracker};
pub use record::{DomainRecord, WorkingSet};
pub use scheduler::Scheduler;
pub use worker::{PollEvent, PollWorker, StopReason};
pub use config::{PollerConfig, StateStoreConfig, TrackStoreConfig, TrackerConfig};
pub use error::{Error, Result};
pub use state::{FileStateStore, MemoryStateStore};
pub use history::{FileTracker, MemoryTracker};
