//! Poll worker
//!
//! The PollWorker is responsible for:
//! - Asking the Scheduler which domain is due and how long to wait
//! - Querying the domain through the Resolver
//! - Applying the retry state machine to the domain's record
//! - Persisting and reloading the working set after every poll
//! - Appending successful resolutions to the track history
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────┐
//!                    │  StateStore  │◄──── persist + reload ────┐
//!                    └──────────────┘                           │
//!                           │ load                              │
//!                           ▼                                   │
//! ┌─────────────┐    ┌──────────────┐    ┌─────────────┐        │
//! │  Scheduler  │◄───│  PollWorker  │───►│  Resolver   │        │
//! │ (select,    │    └──────────────┘    │ (A lookup)  │        │
//! │  sleep)     │           │            └─────────────┘        │
//! └─────────────┘           ├───────────────────────────────────┘
//!                           ▼
//!                    ┌──────────────┐    ┌─────────────┐
//!                    │   Tracker    │    │   Events    │
//!                    │ (append)     │    │  (notify)   │
//!                    └──────────────┘    └─────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Select the record with the lowest freshness score
//! 2. Sleep for the scheduler's duration (the only suspension point)
//! 3. Query the domain and fold the result into the retry policy
//! 4. Update the record in place, stamped with the current time
//! 5. Persist the working set, then reload it from storage
//! 6. On success, append a track entry
//! 7. On expiry, log a warning; the reload already excluded the domain
//!
//! The loop ends when a reload returns an empty working set.

use std::future;

use crate::config::TrackerConfig;
use crate::error::{Error, Result};
use crate::query::{DomainState, QueryOutcome, query_domain};
use crate::record::WorkingSet;
use crate::scheduler::Scheduler;
use crate::traits::{Clock, FailureKind, Resolver, StateStore, TrackEntry, Tracker};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Why the poll loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every domain expired; nothing left to poll
    Exhausted,
    /// A shutdown signal arrived while sleeping
    Shutdown,
}

/// Events emitted by the PollWorker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// Loop started with this many active domains
    Started {
        domains: usize,
    },

    /// A domain was picked and the worker is about to sleep
    DomainSelected {
        domain: String,
        sleep_secs: u64,
    },

    /// The domain resolved and a track entry was written
    Resolved {
        domain: String,
        ttl: u32,
        addresses: usize,
    },

    /// The domain failed transiently
    ResolveFailed {
        domain: String,
        kind: FailureKind,
        attempts: u32,
    },

    /// The domain ran out of attempts
    Expired {
        domain: String,
    },

    /// Loop stopped
    Stopped {
        reason: StopReason,
    },
}

/// Summary of one completed poll cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Domain that was polled
    pub domain: String,
    /// Seconds slept before the query
    pub sleep_secs: u64,
    /// What the query produced
    pub outcome: QueryOutcome,
    /// State of the domain after the transition
    pub state: DomainState,
    /// Working set as reloaded from storage
    pub working_set: WorkingSet,
}

/// Outcome of the sleep-then-query sequence
enum Cycle {
    Completed(CycleReport),
    Interrupted,
}

/// Source of shutdown requests observed during the scheduler sleep
///
/// A request that arrives mid-cycle stays pending in the channel and is
/// picked up by the next sleep.
enum ShutdownSignal {
    Channel(oneshot::Receiver<()>),
    Disabled,
}

impl ShutdownSignal {
    /// Resolve once shutdown is requested; never resolves if that cannot happen
    async fn recv(&mut self) {
        match self {
            ShutdownSignal::Channel(rx) => {
                if rx.await.is_err() {
                    // Sender dropped without signalling
                    *self = ShutdownSignal::Disabled;
                    future::pending::<()>().await;
                }
            }
            ShutdownSignal::Disabled => future::pending::<()>().await,
        }
    }
}

/// Single-worker poll loop
///
/// Processes one domain at a time, end to end. The worker exclusively owns
/// the working set and its state store for as long as it runs.
///
/// ## Lifecycle
///
/// 1. Create with [`PollWorker::new()`]
/// 2. Start with [`PollWorker::run()`]
/// 3. Runs until the working set is exhausted or Ctrl-C arrives
pub struct PollWorker {
    /// DNS lookups
    resolver: Box<dyn Resolver>,

    /// Durable working set
    state_store: Box<dyn StateStore>,

    /// Resolution history
    tracker: Box<dyn Tracker>,

    /// Time source for query timestamps
    clock: Box<dyn Clock>,

    /// Selection and sleep policy
    scheduler: Scheduler,

    /// Expiry threshold
    max_attempts: u32,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<PollEvent>,
}

impl PollWorker {
    /// Create a new poll worker
    ///
    /// # Returns
    ///
    /// A tuple of (worker, event_receiver) where event_receiver yields worker events
    pub fn new(
        resolver: Box<dyn Resolver>,
        state_store: Box<dyn StateStore>,
        tracker: Box<dyn Tracker>,
        clock: Box<dyn Clock>,
        config: &TrackerConfig,
    ) -> Result<(Self, mpsc::Receiver<PollEvent>)> {
        config.validate()?;

        if state_store.max_attempts() != config.poller.max_attempts {
            return Err(Error::config(format!(
                "State store expires after {} attempts but poller is configured for {}",
                state_store.max_attempts(),
                config.poller.max_attempts
            )));
        }

        let (tx, rx) = mpsc::channel(config.poller.event_channel_capacity);

        let worker = Self {
            resolver,
            state_store,
            tracker,
            clock,
            scheduler: Scheduler::new(config.poller.max_jitter_secs),
            max_attempts: config.poller.max_attempts,
            event_tx: tx,
        };

        Ok((worker, rx))
    }

    /// Replace the scheduler (e.g. one with a seeded random source)
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Run the poll loop
    ///
    /// Stops cleanly when the working set is exhausted or on Ctrl-C.
    ///
    /// # Returns
    ///
    /// - `Ok(StopReason)`: Clean stop
    /// - `Err(Error)`: Storage failure or unclassified resolver failure
    pub async fn run(&mut self) -> Result<StopReason> {
        // One listener for the whole run so no Ctrl-C is missed between sleeps
        let (tx, rx) = oneshot::channel();
        let listener = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = tx.send(());
                }
                Err(e) => warn!("Cannot listen for Ctrl-C, shutdown signal disabled: {}", e),
            }
        });

        let result = self.run_internal(ShutdownSignal::Channel(rx)).await;
        listener.abort();
        result
    }

    /// Run the poll loop with an explicit shutdown channel
    ///
    /// With `None`, the loop only stops on exhaustion or error.
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<StopReason> {
        let shutdown = match shutdown_rx {
            Some(rx) => ShutdownSignal::Channel(rx),
            None => ShutdownSignal::Disabled,
        };
        self.run_internal(shutdown).await
    }

    /// Run exactly one cycle over `working_set`
    ///
    /// # Returns
    ///
    /// - `Ok(CycleReport)`: The cycle completed; the report carries the reloaded set
    /// - `Err(Error::EmptyWorkingSet)`: Nothing to poll
    /// - `Err(Error)`: Storage failure or unclassified resolver failure
    pub async fn poll_once(&mut self, working_set: WorkingSet) -> Result<CycleReport> {
        match self
            .run_cycle(working_set, &mut ShutdownSignal::Disabled)
            .await?
        {
            Cycle::Completed(report) => Ok(report),
            Cycle::Interrupted => Err(Error::Other("Poll cycle interrupted".to_string())),
        }
    }

    async fn run_internal(&mut self, mut shutdown: ShutdownSignal) -> Result<StopReason> {
        let mut working_set = self.state_store.load().await?;
        info!(
            ">>> Loaded {} domain(s), resolving with {}",
            working_set.len(),
            self.resolver.resolver_name()
        );

        self.emit_event(PollEvent::Started {
            domains: working_set.len(),
        });

        let reason = loop {
            if working_set.is_empty() {
                info!("No active domains left, stopping");
                break StopReason::Exhausted;
            }

            match self.run_cycle(working_set, &mut shutdown).await? {
                Cycle::Completed(report) => working_set = report.working_set,
                Cycle::Interrupted => {
                    info!("Shutdown signal received");
                    break StopReason::Shutdown;
                }
            }
        };

        self.emit_event(PollEvent::Stopped { reason });
        Ok(reason)
    }

    async fn run_cycle(
        &mut self,
        mut working_set: WorkingSet,
        shutdown: &mut ShutdownSignal,
    ) -> Result<Cycle> {
        let selected = self.scheduler.select_next(&working_set)?.clone();
        info!(">>> Select domain {}", selected.name);

        let sleep_secs = self.scheduler.sleep_duration(
            selected.last_query_ts,
            selected.last_ttl,
            self.clock.now(),
        );
        info!(">>> The scheduler staying sleep for {} seconds", sleep_secs);

        self.emit_event(PollEvent::DomainSelected {
            domain: selected.name.clone(),
            sleep_secs,
        });

        tokio::select! {
            _ = tokio::time::sleep(tokio::time::Duration::from_secs(sleep_secs)) => {}
            _ = shutdown.recv() => return Ok(Cycle::Interrupted),
        }

        // No cancellation from here on: the query runs to completion
        let outcome =
            query_domain(self.resolver.as_ref(), &selected.name, selected.attempts).await?;
        let now = self.clock.now();

        let record = working_set.get_mut(&selected.name).ok_or_else(|| {
            Error::Other(format!("Selected domain {} vanished from working set", selected.name))
        })?;
        outcome.apply(record, now);
        let state = DomainState::of(record, self.max_attempts);

        self.state_store.persist(&working_set).await?;
        let working_set = self.state_store.load().await?;
        info!(">>> List updated on disk and reloaded");

        match &outcome {
            QueryOutcome::Resolved(resolution) => {
                let entry =
                    TrackEntry::new(now, &selected.name, resolution.ttl, &resolution.addresses);
                self.tracker.append(&entry).await?;
                info!(">>> Tracker updated");

                self.emit_event(PollEvent::Resolved {
                    domain: selected.name.clone(),
                    ttl: resolution.ttl,
                    addresses: resolution.addresses.len(),
                });
            }
            QueryOutcome::Failed { kind, attempts } => {
                debug!(
                    "Domain {} failed with {} ({} attempt(s))",
                    selected.name, kind, attempts
                );
                self.emit_event(PollEvent::ResolveFailed {
                    domain: selected.name.clone(),
                    kind: *kind,
                    attempts: *attempts,
                });
            }
        }

        if state == DomainState::Expired {
            warn!(">>> The domain {} seems expired", selected.name);
            self.emit_event(PollEvent::Expired {
                domain: selected.name.clone(),
            });
        }

        Ok(Cycle::Completed(CycleReport {
            domain: selected.name,
            sleep_secs,
            outcome,
            state,
            working_set,
        }))
    }

    /// Emit a worker event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: PollEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
