// # Tracker Trait
//
// Append-only sink for observed resolutions.
//
// Entries are written once per successful resolution and never read back
// by the tracker itself; the history is meant for offline analysis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::obfuscate::obfuscate;

/// One observed resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    /// Unix timestamp (seconds) of the query
    pub timestamp: i64,
    /// Resolved domain
    pub domain: String,
    /// TTL reported with the answer
    pub ttl: u32,
    /// Comma-joined obfuscated addresses, in answer order
    pub addresses: String,
}

impl TrackEntry {
    /// Build an entry, obfuscating `addresses`
    pub fn new(timestamp: i64, domain: impl Into<String>, ttl: u32, addresses: &[Ipv4Addr]) -> Self {
        let addresses = addresses
            .iter()
            .map(|addr| obfuscate(*addr).to_string())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            timestamp,
            domain: domain.into(),
            ttl,
            addresses,
        }
    }
}

/// Trait for track history sinks
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Append one entry
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Entry is durable
    /// - `Err(Error::Track)`: Entry could not be written
    async fn append(&self, entry: &TrackEntry) -> Result<(), crate::Error>;
}
