// # State Store Trait
//
// Defines the interface for the durable working set.
//
// ## Purpose
//
// The state store is the only place scheduling progress lives between
// cycles. The poll loop writes the whole working set after every poll and
// immediately reads it back, so the in-memory view is always derivable
// from storage and a crash loses at most one cycle.
//
// ## Implementations
//
// - File-based: versioned JSON document, atomic rewrite
// - In-memory: for tests and throwaway runs
//
// ## Usage
//
// ```rust,ignore
// use dnstrack_core::StateStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* StateStore implementation */;
//
//     let mut set = store.load().await?;
//     set.get_mut("example.com").unwrap().attempts = 0;
//     store.persist(&set).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::WorkingSet;

/// Trait for state store implementations
///
/// # Filtering
///
/// Both directions drop expired records (`attempts > max_attempts`):
/// `load` never returns them and `persist` never writes them. An expired
/// record therefore disappears from storage on the first persist after it
/// expires.
///
/// # Implementation Guidelines
///
/// - **Full rewrite**: `persist` replaces the stored set, it never appends
/// - **Stable order**: `load` returns records in the order they were persisted
/// - **No recovery**: missing or malformed storage is an error, never an empty set
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read all non-expired records
    ///
    /// # Returns
    ///
    /// - `Ok(WorkingSet)`: Records with `attempts <= max_attempts`, in stored order
    /// - `Err(Error::StorageRead)`: Storage missing, unreadable or malformed
    async fn load(&self) -> Result<WorkingSet, crate::Error>;

    /// Overwrite storage with the non-expired records of `set`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Storage now mirrors the active part of `set`
    /// - `Err(Error::StorageWrite)`: Storage may not reflect `set`
    async fn persist(&self, set: &WorkingSet) -> Result<(), crate::Error>;

    /// Expiry threshold applied on load and persist
    fn max_attempts(&self) -> u32;
}
