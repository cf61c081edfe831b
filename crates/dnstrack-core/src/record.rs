//! Tracked domains and the working set
//!
//! A [`DomainRecord`] is the per-domain polling state that survives
//! restarts. The [`WorkingSet`] is the ordered collection of records
//! currently eligible for polling, addressed by domain name.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// Default limit on consecutive failed attempts before a domain expires
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Largest query timestamp whose freshness score fits in an `i64`
pub const MAX_QUERY_TS: i64 = i64::MAX - u32::MAX as i64;

/// Polling state for one tracked domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Fully-qualified domain name, unique within a working set
    pub name: String,

    /// Consecutive failed resolution attempts since the last success
    pub attempts: u32,

    /// TTL from the last successful resolution, 0 if none or if the last attempt failed
    pub last_ttl: u32,

    /// Unix timestamp (seconds) of the last poll attempt, 0 if never polled
    pub last_query_ts: i64,
}

impl DomainRecord {
    /// Create a never-polled record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attempts: 0,
            last_ttl: 0,
            last_query_ts: 0,
        }
    }

    /// Score used to pick the next domain; lower is due sooner
    pub fn freshness(&self) -> i64 {
        self.last_query_ts.saturating_add(i64::from(self.last_ttl))
    }

    /// Whether this record has run out of attempts
    pub fn is_expired(&self, max_attempts: u32) -> bool {
        self.attempts > max_attempts
    }

    /// Whether this record has never been polled
    pub fn never_polled(&self) -> bool {
        self.last_query_ts == 0
    }
}

/// Ordered set of domain records keyed by name
///
/// Order is the persisted order. It carries no meaning beyond breaking
/// ties during selection, but it is stable across persist/load cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    records: Vec<DomainRecord>,
}

impl WorkingSet {
    /// Create an empty working set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a working set, rejecting empty or duplicate names and
    /// timestamps outside `0..=MAX_QUERY_TS`
    pub fn from_records(records: Vec<DomainRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.name.trim().is_empty() {
                return Err(Error::invalid_input("Domain name cannot be empty"));
            }
            if !(0..=MAX_QUERY_TS).contains(&record.last_query_ts) {
                return Err(Error::invalid_input(format!(
                    "Query timestamp out of range for {}: {}",
                    record.name, record.last_query_ts
                )));
            }
            if !seen.insert(record.name.as_str()) {
                return Err(Error::invalid_input(format!(
                    "Duplicate domain in working set: {}",
                    record.name
                )));
            }
        }

        Ok(Self { records })
    }

    /// Look up a record by name
    pub fn get(&self, name: &str) -> Option<&DomainRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Look up a record by name for in-place mutation
    pub fn get_mut(&mut self, name: &str) -> Option<&mut DomainRecord> {
        self.records.iter_mut().find(|r| r.name == name)
    }

    /// Iterate records in persisted order
    pub fn iter(&self) -> impl Iterator<Item = &DomainRecord> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy of this set without expired records
    pub fn active(&self, max_attempts: u32) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| !r.is_expired(max_attempts))
                .cloned()
                .collect(),
        }
    }

    /// Consume the set, returning its records in order
    pub fn into_records(self) -> Vec<DomainRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a WorkingSet {
    type Item = &'a DomainRecord;
    type IntoIter = std::slice::Iter<'a, DomainRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
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

    #[test]
    fn test_duplicate_names_rejected() {
        let result = WorkingSet::from_records(vec![record("a.com", 0), record("a.com", 1)]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = WorkingSet::from_records(vec![record("  ", 0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_active_drops_expired_and_keeps_order() {
        let set = WorkingSet::from_records(vec![
            record("a.com", 0),
            record("b.com", 6),
            record("c.com", 5),
        ])
        .unwrap();

        let active = set.active(5);
        let names: Vec<_> = active.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.com", "c.com"]);
    }

    #[test]
    fn test_lookup_by_name() {
        let mut set = WorkingSet::from_records(vec![record("a.com", 0), record("b.com", 2)]).unwrap();
        assert_eq!(set.get("b.com").map(|r| r.attempts), Some(2));

        set.get_mut("a.com").unwrap().last_ttl = 60;
        assert_eq!(set.get("a.com").unwrap().last_ttl, 60);
        assert!(set.get("missing.com").is_none());
    }

    #[test]
    fn test_freshness_is_ttl_plus_timestamp() {
        let r = DomainRecord {
            last_ttl: 300,
            last_query_ts: 1_700_000_000,
            ..DomainRecord::new("a.com")
        };
        assert_eq!(r.freshness(), 1_700_000_300);
        assert_eq!(DomainRecord::new("b.com").freshness(), 0);
    }

    #[test]
    fn test_timestamp_range_enforced() {
        for ts in [-1, MAX_QUERY_TS + 1, i64::MAX] {
            let r = DomainRecord {
                last_query_ts: ts,
                ..DomainRecord::new("a.com")
            };
            assert!(matches!(
                WorkingSet::from_records(vec![r]),
                Err(Error::InvalidInput(_))
            ));
        }

        let edge = DomainRecord {
            last_ttl: u32::MAX,
            last_query_ts: MAX_QUERY_TS,
            ..DomainRecord::new("a.com")
        };
        assert_eq!(edge.freshness(), i64::MAX);
        assert!(WorkingSet::from_records(vec![edge]).is_ok());
    }
}
