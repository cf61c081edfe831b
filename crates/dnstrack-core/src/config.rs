//! Configuration types for the tracker
//!
//! This module defines all configuration structures used throughout the crate.
//! Configuration is fixed at startup; nothing here is reloaded at runtime.

use serde::{Deserialize, Serialize};

use crate::record::DEFAULT_MAX_ATTEMPTS;

/// Main tracker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Where the working set is persisted
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// Where resolution history is appended
    #[serde(default)]
    pub track_store: TrackStoreConfig,

    /// Poll loop settings
    #[serde(default)]
    pub poller: PollerConfig,

    /// Settings passed to the lookup library
    #[serde(default)]
    pub resolver: ResolverSettings,
}

impl TrackerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.state_store.validate()?;
        self.track_store.validate()?;
        self.poller.validate()?;
        self.resolver.validate()?;
        Ok(())
    }
}

/// State store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based state store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent)
    Memory,
}

impl StateStoreConfig {
    /// Validate the state store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StateStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("State store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StateStoreConfig {
    fn default() -> Self {
        StateStoreConfig::File {
            path: default_state_path(),
        }
    }
}

/// Track history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackStoreConfig {
    /// JSON Lines file, appended to
    File {
        /// Path to the history file
        path: String,
    },

    /// In-memory history (not persistent)
    Memory,
}

impl TrackStoreConfig {
    /// Validate the track store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            TrackStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("Track store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for TrackStoreConfig {
    fn default() -> Self {
        TrackStoreConfig::File {
            path: default_track_path(),
        }
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Consecutive failures tolerated before a domain expires
    ///
    /// A domain expires once its attempt counter exceeds this value, so a
    /// domain gets `max_attempts + 1` failed polls in a row.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound (exclusive) of the random jitter, in seconds
    #[serde(default = "default_max_jitter_secs")]
    pub max_jitter_secs: u32,

    /// Capacity of the worker event channel
    ///
    /// When full, new events are dropped with a warning log; polling never
    /// waits on event consumers.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl PollerConfig {
    /// Validate the poller configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_jitter_secs == 0 {
            return Err(crate::Error::config("Poller max_jitter_secs must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Poller event_channel_capacity must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            max_jitter_secs: default_max_jitter_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Lookup library settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Per-query timeout in seconds
    #[serde(default = "default_resolver_timeout_secs")]
    pub timeout_secs: u64,

    /// Nameserver attempts inside a single lookup
    #[serde(default = "default_resolver_attempts")]
    pub attempts: usize,
}

impl ResolverSettings {
    /// Validate the resolver settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Resolver timeout_secs must be > 0"));
        }
        if self.attempts == 0 {
            return Err(crate::Error::config("Resolver attempts must be > 0"));
        }
        Ok(())
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_resolver_timeout_secs(),
            attempts: default_resolver_attempts(),
        }
    }
}

fn default_state_path() -> String {
    "domainlist.json".to_string()
}

fn default_track_path() -> String {
    "domain_tracker.jsonl".to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_max_jitter_secs() -> u32 {
    50
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_resolver_timeout_secs() -> u64 {
    5
}

fn default_resolver_attempts() -> usize {
    2
}
