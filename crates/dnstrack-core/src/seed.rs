//! Seeding a working set from a plain domain list
//!
//! The list holds one domain per line. Surrounding whitespace is stripped,
//! blank lines and `#` comments are skipped, and repeated names keep their
//! first position.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::{DomainRecord, WorkingSet};

/// Build a never-polled working set from list text
pub fn parse_seed_list(content: &str) -> WorkingSet {
    let mut seen = HashSet::new();
    let records = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|name| seen.insert(name.to_string()))
        .map(DomainRecord::new)
        .collect();

    // Names are non-empty and deduplicated above
    WorkingSet::from_records(records).unwrap_or_default()
}

/// Read a seed list from disk
pub async fn read_seed_list<P: AsRef<Path>>(path: P) -> Result<WorkingSet> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::storage_read(format!("Failed to read seed list {}: {}", path.display(), e))
    })?;

    let set = parse_seed_list(&content);
    tracing::debug!("Seed list {} holds {} domain(s)", path.display(), set.len());
    Ok(set)
}
