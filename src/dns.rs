//! Registration checks for candidate domains.
//!
//! A candidate counts as registered when its name resolves to an address.
//! Failures and timeouts are never fatal: they collapse to [`DnsStatus::Unset`].

use crate::config::AppConfig;
use crate::rate_limit::LookupPacer;
use futures::future::BoxFuture;
use futures::FutureExt;
use hickory_resolver::config::{LookupIpStrategy, NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("DNS lookup for {domain} timed out after {timeout_secs}s")]
    Timeout { domain: String, timeout_secs: u64 },

    #[error("DNS lookup for {domain} failed: {reason}")]
    LookupFailed { domain: String, reason: String },

    #[error("Failed to build DNS resolver: {0}")]
    ResolverSetup(String),
}

/// Registration state of a candidate domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsStatus {
    /// The name resolved; holds the first address returned
    Registered(String),
    Unset,
    /// No lookup was requested
    NotChecked,
}

impl DnsStatus {
    pub fn is_registered(&self) -> bool {
        matches!(self, DnsStatus::Registered(_))
    }
}

impl fmt::Display for DnsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsStatus::Registered(addr) => write!(f, "{}", addr),
            DnsStatus::Unset => write!(f, "UNSET"),
            DnsStatus::NotChecked => write!(f, "-"),
        }
    }
}

impl Serialize for DnsStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DnsStatus::Registered(addr) => serializer.serialize_str(addr),
            DnsStatus::Unset => serializer.serialize_str("UNSET"),
            DnsStatus::NotChecked => serializer.serialize_none(),
        }
    }
}

/// Resolves a fully-qualified (ASCII) domain to an address.
///
/// `Ok(None)` means the name does not exist or has no address records.
pub trait RegistrationChecker: Send + Sync {
    fn lookup<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Result<Option<String>, ResolutionError>>;
}

/// Run a registration lookup, folding every failure into `Unset`
pub async fn check_registration(checker: &dyn RegistrationChecker, domain: &str) -> DnsStatus {
    match checker.lookup(domain).await {
        Ok(Some(address)) => {
            debug!("{} is registered ({})", domain, address);
            DnsStatus::Registered(address)
        }
        Ok(None) => {
            debug!("{} does not resolve", domain);
            DnsStatus::Unset
        }
        Err(e) => {
            debug!("Treating {} as unset: {}", domain, e);
            DnsStatus::Unset
        }
    }
}

/// Registration checker backed by hickory-resolver
pub struct DnsRegistrationChecker {
    resolver: TokioAsyncResolver,
    timeout: Duration,
    pacer: Option<LookupPacer>,
}

impl DnsRegistrationChecker {
    /// Build a checker from configuration.
    ///
    /// Uses the configured name servers, or the system resolver configuration
    /// when none are listed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ResolutionError> {
        let timeout = Duration::from_secs(config.dns.lookup_timeout_secs);

        let resolver = if config.dns.servers.is_empty() {
            info!("Using system resolver configuration for registration checks");
            TokioAsyncResolver::tokio_from_system_conf()
                .map_err(|e| ResolutionError::ResolverSetup(e.to_string()))?
        } else {
            let mut resolver_config = ResolverConfig::new();
            let mut server_timeout = 0;

            for server in &config.dns.servers {
                let socket_addr = server.address.parse().map_err(|e| {
                    ResolutionError::ResolverSetup(format!(
                        "Invalid DNS server address '{}' for server '{}': {}",
                        server.address, server.name, e
                    ))
                })?;
                resolver_config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));
                resolver_config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Tcp));
                server_timeout = server_timeout.max(server.timeout_secs);
                debug!("Registered DNS server {} ({})", server.name, server.address);
            }

            let mut opts = ResolverOpts::default();
            opts.timeout = Duration::from_secs(server_timeout);
            opts.attempts = 1;
            opts.use_hosts_file = false;
            opts.ip_strategy = LookupIpStrategy::Ipv4thenIpv6;
            opts.num_concurrent_reqs = 2;

            TokioAsyncResolver::tokio(resolver_config, opts)
        };

        let pacer = LookupPacer::from_config(&config.dns);
        if pacer.is_some() {
            debug!("Pacing DNS lookups at {} per second", config.dns.rate_limit_qps);
        }

        Ok(Self { resolver, timeout, pacer })
    }

    async fn resolve(&self, domain: &str) -> Result<Option<String>, ResolutionError> {
        if let Some(pacer) = &self.pacer {
            pacer.wait().await;
        }

        // Fully-qualify so search domains never apply
        let fqdn = format!("{}.", domain.trim_end_matches('.'));

        match tokio::time::timeout(self.timeout, self.resolver.lookup_ip(fqdn.as_str())).await {
            Err(_) => Err(ResolutionError::Timeout {
                domain: domain.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
            Ok(Ok(lookup)) => Ok(lookup.iter().next().map(|ip| ip.to_string())),
            Ok(Err(e)) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(None),
                _ => Err(ResolutionError::LookupFailed {
                    domain: domain.to_string(),
                    reason: e.to_string(),
                }),
            },
        }
    }
}

impl RegistrationChecker for DnsRegistrationChecker {
    fn lookup<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Result<Option<String>, ResolutionError>> {
        self.resolve(domain).boxed()
    }
}
