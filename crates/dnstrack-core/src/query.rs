//! Query and retry state machine
//!
//! One poll moves a domain through exactly one transition:
//!
//! | resolver result      | attempts    | last_ttl     | last_query_ts |
//! |----------------------|-------------|--------------|---------------|
//! | success              | 0           | answer TTL   | now           |
//! | transient failure    | +1          | 0            | now           |
//! | unclassified failure | (unchanged) | (unchanged)  | (unchanged)   |
//!
//! An unclassified failure is returned as [`Error::Resolver`] and stops the
//! poll loop before anything is written. A domain whose counter goes past
//! the configured maximum is [`DomainState::Expired`] and is dropped by the
//! next load.

use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::record::DomainRecord;
use crate::traits::resolver::{FailureKind, Resolution, Resolver};

/// Where a domain stands after a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainState {
    /// Still in the active working set
    Pending,
    /// Out of attempts; excluded from the working set on the next load
    Expired,
}

impl DomainState {
    /// State of `record` under the given expiry threshold
    pub fn of(record: &DomainRecord, max_attempts: u32) -> Self {
        if record.is_expired(max_attempts) {
            DomainState::Expired
        } else {
            DomainState::Pending
        }
    }
}

/// Result of one query after the retry policy is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The domain resolved
    Resolved(Resolution),
    /// The lookup failed transiently
    Failed {
        /// Failure classification
        kind: FailureKind,
        /// Attempt counter after this failure
        attempts: u32,
    },
}

impl QueryOutcome {
    /// Attempt counter the record must carry after this outcome
    pub fn attempts(&self) -> u32 {
        match self {
            QueryOutcome::Resolved(_) => 0,
            QueryOutcome::Failed { attempts, .. } => *attempts,
        }
    }

    /// The resolution, if the query succeeded
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            QueryOutcome::Resolved(resolution) => Some(resolution),
            QueryOutcome::Failed { .. } => None,
        }
    }

    /// Write this outcome into `record`
    ///
    /// TTL and query timestamp always change together.
    pub fn apply(&self, record: &mut DomainRecord, now: i64) {
        record.attempts = self.attempts();
        record.last_ttl = self.resolution().map_or(0, |r| r.ttl);
        record.last_query_ts = now;
    }
}

/// Query `name` once and fold the result into the retry policy
///
/// `attempts` is the record's counter before this query.
///
/// # Returns
///
/// - `Ok(QueryOutcome)`: Success or a transient failure
/// - `Err(Error::Resolver)`: A failure outside the transient taxonomy
pub async fn query_domain(
    resolver: &dyn Resolver,
    name: &str,
    attempts: u32,
) -> Result<QueryOutcome> {
    match resolver.resolve(name).await {
        Ok(resolution) => {
            info!("[+] TTL : {}", resolution.ttl);
            for address in &resolution.addresses {
                debug!("[+] Ip : {}", address);
            }
            Ok(QueryOutcome::Resolved(resolution))
        }
        Err(failure) if failure.is_transient() => {
            error!("[-] Error: {} ({})", describe(failure.kind), failure.message);
            Ok(QueryOutcome::Failed {
                kind: failure.kind,
                attempts: attempts.saturating_add(1),
            })
        }
        Err(failure) => Err(Error::resolver(name, failure.to_string())),
    }
}

fn describe(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::NameNotFound => "the query name does not exist",
        FailureKind::NoReachableNameservers => {
            "no non-broken nameservers are available to answer the question"
        }
        FailureKind::NameTooLong => "the query name is too long after DNAME substitution",
        FailureKind::Timeout => "no answers could be found in the specified lifetime",
        FailureKind::Other => "unclassified resolver failure",
    }
}
