// # Resolver Trait
//
// Defines the boundary to the DNS lookup library.
//
// ## Implementations
//
// - hickory-resolver: `dnstrack-resolver-hickory` crate
// - Test doubles: scripted resolvers in the integration tests
//
// ## Usage
//
// ```rust,ignore
// use dnstrack_core::Resolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* Resolver implementation */;
//
//     match resolver.resolve("example.com").await {
//         Ok(resolution) => println!("ttl={} {:?}", resolution.ttl, resolution.addresses),
//         Err(failure) if failure.is_transient() => println!("retry later: {}", failure),
//         Err(failure) => anyhow::bail!("giving up: {}", failure),
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::Ipv4Addr;

/// Successful `A` resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// TTL of the answer RRset, in seconds
    pub ttl: u32,
    /// Addresses in answer order
    pub addresses: Vec<Ipv4Addr>,
}

impl Resolution {
    /// Create a resolution result
    pub fn new(ttl: u32, addresses: Vec<Ipv4Addr>) -> Self {
        Self { ttl, addresses }
    }
}

/// Classified reason a lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The queried name does not exist (NXDOMAIN)
    NameNotFound,
    /// No nameserver could answer the question
    NoReachableNameservers,
    /// The name became too long after DNAME substitution (YXDOMAIN)
    NameTooLong,
    /// No answer within the configured lifetime
    Timeout,
    /// Anything the retry policy does not know how to handle
    Other,
}

impl FailureKind {
    /// Whether the retry state machine may absorb this failure
    pub fn is_transient(self) -> bool {
        !matches!(self, FailureKind::Other)
    }

    /// Stable lowercase label for logs and events
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NameNotFound => "name_not_found",
            FailureKind::NoReachableNameservers => "no_reachable_nameservers",
            FailureKind::NameTooLong => "name_too_long",
            FailureKind::Timeout => "timeout",
            FailureKind::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed lookup with its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveFailure {
    /// Classification used by the retry policy
    pub kind: FailureKind,
    /// Human-readable detail from the lookup library
    pub message: String,
}

impl ResolveFailure {
    /// Create a classified failure
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the retry state machine may absorb this failure
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for ResolveFailure {}

/// Trait for DNS lookup implementations
///
/// One call performs one `A` query. Implementations must not retry or
/// sleep on their own: attempt counting and spacing belong to the poll
/// loop, and a retrying resolver would skew the recorded timestamps.
///
/// Every failure must be mapped onto a [`FailureKind`]. Anything that
/// cannot be classified is reported as [`FailureKind::Other`], which
/// stops the poll loop.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve the `A` records of `name`
    async fn resolve(&self, name: &str) -> Result<Resolution, ResolveFailure>;

    /// Name of the backing implementation (for logging)
    fn resolver_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_taxonomy() {
        assert!(FailureKind::NameNotFound.is_transient());
        assert!(FailureKind::NoReachableNameservers.is_transient());
        assert!(FailureKind::NameTooLong.is_transient());
        assert!(FailureKind::Timeout.is_transient());
        assert!(!FailureKind::Other.is_transient());
    }

    #[test]
    fn test_failure_display_includes_kind() {
        let failure = ResolveFailure::new(FailureKind::Timeout, "no answer in 5s");
        assert_eq!(failure.to_string(), "no answer in 5s (timeout)");
    }
}
