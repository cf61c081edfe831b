// # File State Store
//
// File-based implementation of StateStore.
//
// ## Purpose
//
// Keeps the working set on disk so polling resumes where it stopped after
// a restart or crash.
//
// ## Crash Safety
//
// - Atomic writes: the new document goes to a temp file which is then renamed
// - Full rewrite: every persist replaces the whole document
// - Strict load: a missing or malformed file is an error, never an empty set
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "records": [
//     {
//       "name": "example.com",
//       "attempts": 0,
//       "last_ttl": 300,
//       "last_query_ts": 1736424000
//     }
//   ]
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::record::{DomainRecord, WorkingSet};
use crate::traits::state_store::StateStore;

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// File-based state store
///
/// Holds no records in memory; every `load` reads the file and every
/// `persist` rewrites it.
///
/// # Example
///
/// ```rust,no_run
/// use dnstrack_core::state::FileStateStore;
/// use dnstrack_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/dnstrack/domainlist.json", 5).await?;
///
///     let set = store.load().await?;
///     store.persist(&set).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    max_attempts: u32,
}

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    records: Vec<DomainRecord>,
}

impl FileStateStore {
    /// Create a file state store
    ///
    /// Creates parent directories if needed. The state file itself is not
    /// touched until the first `load` or `persist`.
    pub async fn new<P: AsRef<Path>>(path: P, max_attempts: u32) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Ok(Self { path, max_attempts })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the state file exists yet
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and validate the whole document, expired records included
    async fn read_state(&self) -> Result<WorkingSet, Error> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::storage_read(format!(
                "Failed to read state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::storage_read(format!(
                "Failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            return Err(Error::storage_read(format!(
                "Unsupported state file version in {}: expected {}, got {}",
                self.path.display(),
                STATE_FILE_VERSION,
                state_file.version
            )));
        }

        WorkingSet::from_records(state_file.records).map_err(|e| {
            Error::storage_read(format!(
                "Malformed state file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Write the document atomically
    async fn write_state(&self, records: Vec<DomainRecord>) -> Result<(), Error> {
        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            records,
        };

        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::storage_write(format!("Failed to serialize state: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::storage_write(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::storage_write(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::storage_write(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::storage_write(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<WorkingSet, Error> {
        let stored = self.read_state().await?;
        let active = stored.active(self.max_attempts);

        let dropped = stored.len() - active.len();
        if dropped > 0 {
            tracing::debug!("Excluded {} expired record(s) on load", dropped);
        }
        tracing::debug!("Loaded state from file: {} records", active.len());

        Ok(active)
    }

    async fn persist(&self, set: &WorkingSet) -> Result<(), Error> {
        self.write_state(set.active(self.max_attempts).into_records())
            .await
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
