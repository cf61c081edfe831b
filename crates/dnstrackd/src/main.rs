// # dnstrackd - DNS Tracking Daemon
//
// This daemon is a thin integration layer. All polling, scheduling and
// retry logic lives in dnstrack-core; nothing here decides when or what
// to query.
//
// The dnstrackd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Seeding the state file on first start
// 4. Wiring the resolver, stores and clock into a PollWorker and running it
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Storage
// - `DNSTRACK_STATE_PATH`: Working set file (default: domainlist.json)
// - `DNSTRACK_TRACK_PATH`: Track history file (default: domain_tracker.jsonl)
// - `DNSTRACK_SEED_LIST`: Plain domain list used when the state file does not exist
//
// ### Poller
// - `DNSTRACK_MAX_ATTEMPTS`: Failures tolerated before a domain expires (0-100)
// - `DNSTRACK_MAX_JITTER_SECS`: Upper bound (exclusive) of the sleep jitter (1-3600)
//
// ### Resolver
// - `DNSTRACK_RESOLVER_TIMEOUT_SECS`: Per-query timeout (1-60)
// - `DNSTRACK_RESOLVER_ATTEMPTS`: Nameserver attempts per lookup (1-10)
//
// ### Logging
// - `DNSTRACK_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
//
// ## Example
//
// ```bash
// export DNSTRACK_STATE_PATH=/var/lib/dnstrack/domainlist.json
// export DNSTRACK_TRACK_PATH=/var/lib/dnstrack/domain_tracker.jsonl
// export DNSTRACK_SEED_LIST=/etc/dnstrack/domains.txt
//
// dnstrackd
// ```

use anyhow::Result;
use dnstrack_core::config::{
    PollerConfig, ResolverSettings, StateStoreConfig, TrackStoreConfig, TrackerConfig,
};
use dnstrack_core::{PollEvent, PollWorker, Resolver, StopReason, SystemClock};
use std::env;
use std::process::ExitCode;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (storage or unclassified resolver failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnstrackExitCode {
    /// Working set exhausted or shutdown signal
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DnstrackExitCode> for ExitCode {
    fn from(code: DnstrackExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    state_path: String,
    track_path: String,
    seed_list: Option<String>,
    max_attempts: Option<u32>,
    max_jitter_secs: Option<u32>,
    resolver_timeout_secs: Option<u64>,
    resolver_attempts: Option<usize>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            state_path: non_empty("DNSTRACK_STATE_PATH")
                .unwrap_or_else(|| "domainlist.json".to_string()),
            track_path: non_empty("DNSTRACK_TRACK_PATH")
                .unwrap_or_else(|| "domain_tracker.jsonl".to_string()),
            seed_list: non_empty("DNSTRACK_SEED_LIST"),
            max_attempts: parse_var(&non_empty, "DNSTRACK_MAX_ATTEMPTS")?,
            max_jitter_secs: parse_var(&non_empty, "DNSTRACK_MAX_JITTER_SECS")?,
            resolver_timeout_secs: parse_var(&non_empty, "DNSTRACK_RESOLVER_TIMEOUT_SECS")?,
            resolver_attempts: parse_var(&non_empty, "DNSTRACK_RESOLVER_ATTEMPTS")?,
            log_level: non_empty("DNSTRACK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks numeric ranges, the log level and that the parent directories
    /// of both storage paths exist.
    fn validate(&self) -> Result<()> {
        if let Some(max_attempts) = self.max_attempts
            && max_attempts > 100
        {
            anyhow::bail!(
                "DNSTRACK_MAX_ATTEMPTS must be between 0 and 100. Got: {}",
                max_attempts
            );
        }

        if let Some(jitter) = self.max_jitter_secs
            && !(1..=3600).contains(&jitter)
        {
            anyhow::bail!(
                "DNSTRACK_MAX_JITTER_SECS must be between 1 and 3600 seconds. Got: {}",
                jitter
            );
        }

        if let Some(timeout) = self.resolver_timeout_secs
            && !(1..=60).contains(&timeout)
        {
            anyhow::bail!(
                "DNSTRACK_RESOLVER_TIMEOUT_SECS must be between 1 and 60 seconds. Got: {}",
                timeout
            );
        }

        if let Some(attempts) = self.resolver_attempts
            && !(1..=10).contains(&attempts)
        {
            anyhow::bail!(
                "DNSTRACK_RESOLVER_ATTEMPTS must be between 1 and 10. Got: {}",
                attempts
            );
        }

        for (var, path) in [
            ("DNSTRACK_STATE_PATH", &self.state_path),
            ("DNSTRACK_TRACK_PATH", &self.track_path),
        ] {
            if let Some(parent) = std::path::Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                anyhow::bail!(
                    "{} parent directory does not exist: {}. \
                    Create it first: mkdir -p {}",
                    var,
                    parent.display(),
                    parent.display()
                );
            }
        }

        self.level()?;
        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DNSTRACK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Build the library configuration
    fn tracker_config(&self) -> TrackerConfig {
        let defaults = PollerConfig::default();
        let resolver_defaults = ResolverSettings::default();

        TrackerConfig {
            state_store: StateStoreConfig::File {
                path: self.state_path.clone(),
            },
            track_store: TrackStoreConfig::File {
                path: self.track_path.clone(),
            },
            poller: PollerConfig {
                max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
                max_jitter_secs: self.max_jitter_secs.unwrap_or(defaults.max_jitter_secs),
                ..defaults
            },
            resolver: ResolverSettings {
                timeout_secs: self
                    .resolver_timeout_secs
                    .unwrap_or(resolver_defaults.timeout_secs),
                attempts: self
                    .resolver_attempts
                    .unwrap_or(resolver_defaults.attempts),
            },
        }
    }
}

/// Parse an optional numeric variable, rejecting garbage instead of defaulting
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{} must be a number. Got '{}': {}", key, raw, e))
        })
        .transpose()
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DnstrackExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DnstrackExitCode::ConfigError.into();
    }

    let log_level = config.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnstrackExitCode::ConfigError.into();
    }

    info!("Starting dnstrackd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnstrackExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Wire the worker and run it until it stops
async fn run_daemon(config: Config) -> DnstrackExitCode {
    let tracker_config = config.tracker_config();
    if let Err(e) = tracker_config.validate() {
        error!("Configuration validation error: {}", e);
        return DnstrackExitCode::ConfigError;
    }

    let (mut worker, events) = match build_worker(&config, &tracker_config).await {
        Ok(built) => built,
        Err(e) => {
            error!("Startup failed during {}: {}", e.operation(), e);
            return match e {
                dnstrack_core::Error::Config(_) | dnstrack_core::Error::InvalidInput(_) => {
                    DnstrackExitCode::ConfigError
                }
                _ => DnstrackExitCode::RuntimeError,
            };
        }
    };

    tokio::spawn(log_events(events));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => {
                info!("Received shutdown signal: {}", signal);
                let _ = shutdown_tx.send(());
            }
            // Dropping the sender leaves the worker running until exhaustion
            Err(e) => warn!("Shutdown signals unavailable: {}", e),
        }
    });

    match worker.run_with_shutdown(Some(shutdown_rx)).await {
        Ok(StopReason::Exhausted) => {
            info!("Every domain expired, nothing left to track");
            DnstrackExitCode::CleanShutdown
        }
        Ok(StopReason::Shutdown) => {
            info!("Shutting down daemon");
            DnstrackExitCode::CleanShutdown
        }
        Err(e) => {
            error!("{} failed: {}", e.operation(), e);
            DnstrackExitCode::RuntimeError
        }
    }
}

/// Open the stores, seed the state file if needed and build the worker
async fn build_worker(
    config: &Config,
    tracker_config: &TrackerConfig,
) -> dnstrack_core::Result<(PollWorker, mpsc::Receiver<PollEvent>)> {
    // Checked before the store creates any parent directory
    let state_exists = std::path::Path::new(&config.state_path).exists();

    let state_store = dnstrack_core::state::from_config(
        &tracker_config.state_store,
        tracker_config.poller.max_attempts,
    )
    .await?;
    let tracker = dnstrack_core::history::from_config(&tracker_config.track_store).await?;

    if let Some(seed_list) = &config.seed_list {
        if state_exists {
            info!(
                "State file {} already exists, ignoring seed list {}",
                config.state_path, seed_list
            );
        } else {
            let seeded = dnstrack_core::seed::read_seed_list(seed_list).await?;
            info!("Seeding {} domain(s) from {}", seeded.len(), seed_list);
            state_store.persist(&seeded).await?;
        }
    }

    let resolver = build_resolver(tracker_config)?;
    info!("Using {} resolver", resolver.resolver_name());

    PollWorker::new(
        resolver,
        state_store,
        tracker,
        Box::new(SystemClock),
        tracker_config,
    )
}

/// Log worker events until the worker drops its sender
///
/// Returns the number of events seen.
async fn log_events(mut events: mpsc::Receiver<PollEvent>) -> usize {
    let mut seen = 0;
    while let Some(event) = events.recv().await {
        seen += 1;
        match event {
            PollEvent::Started { domains } => debug!("Worker started with {} domain(s)", domains),
            PollEvent::DomainSelected { domain, sleep_secs } => {
                debug!("Next poll: {} in {}s", domain, sleep_secs)
            }
            PollEvent::Resolved {
                domain,
                ttl,
                addresses,
            } => debug!("{} resolved: ttl {}, {} address(es)", domain, ttl, addresses),
            PollEvent::ResolveFailed {
                domain,
                kind,
                attempts,
            } => debug!("{} failed with {} ({} attempt(s))", domain, kind, attempts),
            PollEvent::Expired { domain } => debug!("{} expired", domain),
            PollEvent::Stopped { reason } => debug!("Worker stopped: {:?}", reason),
        }
    }
    seen
}

#[cfg(feature = "hickory")]
fn build_resolver(tracker_config: &TrackerConfig) -> dnstrack_core::Result<Box<dyn Resolver>> {
    let resolver =
        dnstrack_resolver_hickory::HickoryResolver::from_system_conf(&tracker_config.resolver)?;
    Ok(Box::new(resolver))
}

#[cfg(not(feature = "hickory"))]
fn build_resolver(_tracker_config: &TrackerConfig) -> dnstrack_core::Result<Box<dyn Resolver>> {
    Err(dnstrack_core::Error::config(
        "No resolver backend compiled in. Rebuild with --features hickory",
    ))
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(received)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
