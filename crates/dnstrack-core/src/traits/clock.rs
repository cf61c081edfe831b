//! Wall-clock source
//!
//! The poll loop stamps records and history entries through a [`Clock`]
//! so tests can pin time without touching the system clock.

/// Source of Unix time in whole seconds
pub trait Clock: Send + Sync {
    /// Current Unix timestamp
    fn now(&self) -> i64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
