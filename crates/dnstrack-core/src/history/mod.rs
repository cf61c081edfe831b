// # Track History Implementations
//
// Sinks for the append-only resolution history.

pub mod file;
pub mod memory;

pub use file::FileTracker;
pub use memory::MemoryTracker;

use crate::config::TrackStoreConfig;
use crate::error::Result;
use crate::traits::Tracker;

/// Build the track history sink described by `config`
pub async fn from_config(config: &TrackStoreConfig) -> Result<Box<dyn Tracker>> {
    match config {
        TrackStoreConfig::File { path } => Ok(Box::new(FileTracker::new(path).await?)),
        TrackStoreConfig::Memory => Ok(Box::new(MemoryTracker::new())),
    }
}
