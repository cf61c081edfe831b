// # Memory Tracker
//
// Keeps track entries in memory. Nothing survives the process.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::tracker::{TrackEntry, Tracker};

/// In-memory track history
///
/// Clones share the same entry list, so a test can keep one handle and give
/// another to the worker.
#[derive(Debug, Clone, Default)]
pub struct MemoryTracker {
    entries: Arc<RwLock<Vec<TrackEntry>>>,
}

impl MemoryTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries appended so far, oldest first
    pub async fn entries(&self) -> Vec<TrackEntry> {
        self.entries.read().await.clone()
    }

    /// Number of entries appended so far
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing was appended yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Tracker for MemoryTracker {
    async fn append(&self, entry: &TrackEntry) -> Result<(), Error> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}
