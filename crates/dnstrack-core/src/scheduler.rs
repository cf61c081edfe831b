//! Adaptive polling scheduler
//!
//! Picks which domain to poll next and how long to wait before polling it.
//!
//! ## Selection
//!
//! Every record has a freshness score `last_ttl + last_query_ts`, the
//! moment its previously observed answer stops being valid. The record
//! with the lowest score is polled next; ties go to the earliest record in
//! working-set order. Never-polled records score their TTL alone and so
//! come first.
//!
//! ## Sleep
//!
//! A never-polled record waits 1 second. Otherwise a jitter `j` is drawn
//! uniformly from `[0, max_jitter)` and
//!
//! ```text
//! elapsed = now - last_query_ts + j
//! sleep   = (last_ttl - elapsed) + floor(5 * j / 4)   if elapsed < last_ttl
//!         = j                                         otherwise
//! ```
//!
//! The jitter spreads out domains that share a TTL so they are not
//! re-queried in lockstep.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::record::{DomainRecord, WorkingSet};

/// Sleep used for records that were never polled
pub const FIRST_POLL_SLEEP_SECS: u64 = 1;

/// Chooses the next domain and the wait before querying it
#[derive(Debug)]
pub struct Scheduler {
    max_jitter_secs: u32,
    rng: StdRng,
}

impl Scheduler {
    /// Create a scheduler with an entropy-seeded random source
    pub fn new(max_jitter_secs: u32) -> Self {
        Self::with_rng(max_jitter_secs, StdRng::from_entropy())
    }

    /// Create a scheduler with a caller-provided random source
    pub fn with_rng(max_jitter_secs: u32, rng: StdRng) -> Self {
        Self {
            max_jitter_secs,
            rng,
        }
    }

    /// Pick the record with the lowest freshness score
    ///
    /// # Returns
    ///
    /// - `Ok(&DomainRecord)`: The record to poll next
    /// - `Err(Error::EmptyWorkingSet)`: Nothing left to poll
    pub fn select_next<'a>(&self, set: &'a WorkingSet) -> Result<&'a DomainRecord> {
        // min_by_key keeps the first of equal minima
        set.iter()
            .min_by_key(|record| record.freshness())
            .ok_or(Error::EmptyWorkingSet)
    }

    /// Seconds to wait before polling a record with the given history
    pub fn sleep_duration(&mut self, last_query_ts: i64, last_ttl: u32, now: i64) -> u64 {
        if last_query_ts == 0 {
            return FIRST_POLL_SLEEP_SECS;
        }

        let jitter = self.draw_jitter();
        sleep_with_jitter(last_query_ts, last_ttl, now, jitter)
    }

    /// Whole seconds drawn uniformly from `[0, max_jitter_secs)`
    fn draw_jitter(&mut self) -> u64 {
        if self.max_jitter_secs == 0 {
            return 0;
        }
        u64::from(self.rng.gen_range(0..self.max_jitter_secs))
    }
}

/// Sleep computation for an already-drawn jitter
///
/// Callers must handle never-polled records (`last_query_ts == 0`)
/// before calling this.
pub fn sleep_with_jitter(last_query_ts: i64, last_ttl: u32, now: i64, jitter: u64) -> u64 {
    let jitter = jitter as i64;
    let last_ttl = i64::from(last_ttl);
    let elapsed = now.saturating_sub(last_query_ts).saturating_add(jitter);

    let sleep = if elapsed < last_ttl {
        last_ttl.saturating_sub(elapsed).saturating_add((5 * jitter) / 4)
    } else {
        jitter
    };

    sleep.max(0) as u64
}
