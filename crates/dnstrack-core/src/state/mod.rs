// # State Store Implementations
//
// This module provides implementations of the StateStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use crate::config::StateStoreConfig;
use crate::error::Result;
use crate::traits::StateStore;

/// Build the state store described by `config`
pub async fn from_config(
    config: &StateStoreConfig,
    max_attempts: u32,
) -> Result<Box<dyn StateStore>> {
    match config {
        StateStoreConfig::File { path } => {
            Ok(Box::new(FileStateStore::new(path, max_attempts).await?))
        }
        StateStoreConfig::Memory => Ok(Box::new(MemoryStateStore::new(max_attempts))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_memory() {
        let store = from_config(&StateStoreConfig::Memory, 7).await.unwrap();
        assert_eq!(store.max_attempts(), 7);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StateStoreConfig::File {
            path: dir.path().join("state.json").display().to_string(),
        };

        let store = from_config(&config, 5).await.unwrap();
        // No file yet
        assert!(store.load().await.is_err());
    }
}
