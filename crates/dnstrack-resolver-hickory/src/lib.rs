// # hickory-resolver Backend
//
// This crate provides the production Resolver for dnstrack, backed by
// hickory-resolver and the host's nameserver configuration.
//
// ## Behavior
//
// - One `A` lookup per call; the resolver's own timeout and attempt
//   settings bound how long that takes
// - No answer cache, so each call is a real query
// - The answer TTL is the TTL of the first `A` record
// - Addresses are returned in answer order
// - Failures are mapped onto the closed `FailureKind` taxonomy; anything
//   that does not fit is `FailureKind::Other` and stops the poll loop
//
// ## Failure Mapping
//
// | hickory failure                            | FailureKind              |
// |--------------------------------------------|--------------------------|
// | no records, NXDOMAIN                       | NameNotFound             |
// | no records, YXDOMAIN                       | NameTooLong              |
// | no records, SERVFAIL / REFUSED             | NoReachableNameservers   |
// | no connections available                   | NoReachableNameservers   |
// | resolver or protocol timeout               | Timeout                  |
// | anything else, including an empty answer   | Other                    |
//
// The adapter keeps no state of its own beyond the hickory client.

use async_trait::async_trait;
use dnstrack_core::config::ResolverSettings;
use dnstrack_core::traits::{FailureKind, Resolution, ResolveFailure, Resolver};
use dnstrack_core::{Error, Result};
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::error::ProtoErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, trace};

/// Resolver backed by hickory-resolver
pub struct HickoryResolver {
    inner: TokioAsyncResolver,
}

impl HickoryResolver {
    /// Create a resolver from the host configuration (`/etc/resolv.conf`)
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the system configuration cannot be read.
    pub fn from_system_conf(settings: &ResolverSettings) -> Result<Self> {
        let (config, opts) = hickory_resolver::system_conf::read_system_conf().map_err(|e| {
            Error::config(format!("Failed to read system resolver configuration: {}", e))
        })?;

        debug!(
            "Using {} system nameserver(s)",
            config.name_servers().len()
        );
        Ok(Self::with_config(config, apply_settings(opts, settings)))
    }

    /// Create a resolver with an explicit configuration
    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

/// Overlay the tracker's timeout and attempt settings
///
/// Also disables the answer cache: every poll must reach a nameserver,
/// otherwise retries and track entries would replay a cached answer.
pub fn apply_settings(mut opts: ResolverOpts, settings: &ResolverSettings) -> ResolverOpts {
    opts.timeout = Duration::from_secs(settings.timeout_secs);
    opts.attempts = settings.attempts;
    opts.cache_size = 0;
    opts
}

#[async_trait]
impl Resolver for HickoryResolver {
    async fn resolve(&self, name: &str) -> std::result::Result<Resolution, ResolveFailure> {
        let lookup = self
            .inner
            .lookup(name, RecordType::A)
            .await
            .map_err(|e| ResolveFailure::new(classify(&e), e.to_string()))?;

        let mut ttl = None;
        let mut addresses: Vec<Ipv4Addr> = Vec::new();
        for record in lookup.record_iter() {
            if let Some(RData::A(a)) = record.data() {
                ttl.get_or_insert(record.ttl());
                addresses.push(a.0);
            }
        }

        trace!("{} answered with {} A record(s)", name, addresses.len());

        match ttl {
            Some(ttl) => Ok(Resolution::new(ttl, addresses)),
            None => Err(ResolveFailure::new(
                FailureKind::Other,
                format!("answer for {} carries no A records", name),
            )),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "hickory"
    }
}

/// Map a hickory error onto the failure taxonomy
pub fn classify(err: &ResolveError) -> FailureKind {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            classify_response_code(*response_code)
        }
        ResolveErrorKind::NoConnections => FailureKind::NoReachableNameservers,
        ResolveErrorKind::Timeout => FailureKind::Timeout,
        ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
            FailureKind::Timeout
        }
        _ => FailureKind::Other,
    }
}

/// Map the response code of an empty answer onto the failure taxonomy
pub fn classify_response_code(code: ResponseCode) -> FailureKind {
    match code {
        ResponseCode::NXDomain => FailureKind::NameNotFound,
        ResponseCode::YXDomain => FailureKind::NameTooLong,
        ResponseCode::ServFail | ResponseCode::Refused => FailureKind::NoReachableNameservers,
        _ => FailureKind::Other,
    }
}
