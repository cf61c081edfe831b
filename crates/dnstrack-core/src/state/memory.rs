// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Provides the load/persist contract without touching the filesystem.
// Useful for tests and for throwaway runs over a fixed domain list.
//
// ## Crash Behavior
//
// - All polling progress is lost on restart/crash
// - The next run starts again from whatever seed it is given

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::record::{DomainRecord, WorkingSet};
use crate::traits::state_store::StateStore;

/// In-memory state store implementation
///
/// The stored records play the role of the backing file: they may contain
/// expired records (from the seed) until the first persist overwrites them.
///
/// # Example
///
/// ```rust,no_run
/// use dnstrack_core::record::DomainRecord;
/// use dnstrack_core::state::MemoryStateStore;
/// use dnstrack_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::with_records(vec![DomainRecord::new("example.com")], 5);
///
///     let set = store.load().await?;
///     assert_eq!(set.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Vec<DomainRecord>>>,
    max_attempts: u32,
}

impl MemoryStateStore {
    /// Create an empty memory state store
    pub fn new(max_attempts: u32) -> Self {
        Self::with_records(Vec::new(), max_attempts)
    }

    /// Create a store whose backing records are `records`, unfiltered
    pub fn with_records(records: Vec<DomainRecord>, max_attempts: u32) -> Self {
        Self {
            inner: Arc::new(RwLock::new(records)),
            max_attempts,
        }
    }

    /// Raw backing records, expired ones included
    pub async fn snapshot(&self) -> Vec<DomainRecord> {
        self.inner.read().await.clone()
    }

    /// Get the number of backing records
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<WorkingSet, Error> {
        let guard = self.inner.read().await;
        let stored = WorkingSet::from_records(guard.clone())
            .map_err(|e| Error::storage_read(format!("Malformed in-memory state: {}", e)))?;
        Ok(stored.active(self.max_attempts))
    }

    async fn persist(&self, set: &WorkingSet) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        *guard = set.active(self.max_attempts).into_records();
        Ok(())
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, attempts: u32) -> DomainRecord {
        DomainRecord {
            attempts,
            ..DomainRecord::new(name)
        }
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStateStore::new(5);

        assert!(store.is_empty().await);
        assert!(store.load().await.unwrap().is_empty());

        let set = WorkingSet::from_records(vec![record("example.com", 1)]).unwrap();
        store.persist(&set).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.load().await.unwrap(), set);
    }

    #[tokio::test]
    async fn test_seed_keeps_expired_until_overwritten() {
        let store = MemoryStateStore::with_records(
            vec![record("dead.com", 9), record("live.com", 0)],
            5,
        );

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(store.len().await, 2);

        store.persist(&loaded).await.unwrap();
        assert_eq!(store.snapshot().await, vec![record("live.com", 0)]);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let store = MemoryStateStore::new(5);
        let other = store.clone();

        let set = WorkingSet::from_records(vec![record("example.com", 0)]).unwrap();
        store.persist(&set).await.unwrap();

        assert_eq!(other.len().await, 1);
    }
}
