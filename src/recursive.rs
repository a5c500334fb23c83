use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use hickory_proto::ProtoErrorKind;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{ResolveError, ResolveErrorKind, ResolverBuilder, TokioResolver};
use tracing::{debug, info};

use crate::error::ResolutionError;
use crate::outcome::ResolutionOutcome;

const UPSTREAM_PORT: u16 = 53;

/// A resolver that answers a whole lookup on its own (a recursive server).
///
/// Used as the recursive lookup mode and as the glue fallback inside
/// iterative mode.
#[async_trait]
pub trait RecursiveResolver: Send + Sync {
	async fn resolve(&self, hostname: &str) -> Result<Vec<Ipv4Addr>, ResolutionError>;
}

/// [`RecursiveResolver`] backed by hickory's stub resolver
pub struct SystemResolver {
	resolver: TokioResolver,
}

impl SystemResolver {
	/// Use the servers from the system configuration (/etc/resolv.conf on Unix).
	pub fn from_system_conf(timeout: Duration) -> Result<Self> {
		let builder = TokioResolver::builder_tokio()
			.map_err(|e| anyhow!("failed to read system resolver configuration: {}", e))?;
		Ok(Self::from_builder(builder, timeout))
	}

	/// Use the given upstream recursive servers over plain UDP/TCP on port 53.
	pub fn with_upstreams(upstreams: &[IpAddr], timeout: Duration) -> Self {
		Self::with_upstreams_on_port(upstreams, UPSTREAM_PORT, timeout)
	}

	pub fn with_upstreams_on_port(upstreams: &[IpAddr], port: u16, timeout: Duration) -> Self {
		let group = NameServerConfigGroup::from_ips_clear(upstreams, port, true);
		let config = ResolverConfig::from_parts(None, Vec::new(), group);
		let builder = TokioResolver::builder_with_config(
			config,
			TokioConnectionProvider::default(),
		);
		Self::from_builder(builder, timeout)
	}

	fn from_builder(mut builder: ResolverBuilder<TokioConnectionProvider>, timeout: Duration) -> Self {
		let options = builder.options_mut();
		options.timeout = timeout;
		// Every resolve goes to the upstream; lookups never share answers
		options.cache_size = 0;
		Self { resolver: builder.build() }
	}
}

#[async_trait]
impl RecursiveResolver for SystemResolver {
	async fn resolve(&self, hostname: &str) -> Result<Vec<Ipv4Addr>, ResolutionError> {
		match self.resolver.ipv4_lookup(hostname).await {
			Ok(lookup) => Ok(lookup.iter().map(|a| a.0).collect()),
			Err(e) => Err(classify_error(hostname, &e)),
		}
	}
}

fn classify_error(hostname: &str, err: &ResolveError) -> ResolutionError {
	let name = hostname.to_string();
	if err.is_nx_domain() {
		return ResolutionError::NameError(name);
	}
	if err.is_no_records_found() {
		return ResolutionError::NoAnswer(name);
	}
	match err.kind() {
		ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
			ResolutionError::Timeout(name)
		}
		_ => ResolutionError::Failed { name, reason: err.to_string() },
	}
}

/// Map a collaborator result onto the lookup outcome.
pub fn outcome_from(result: Result<Vec<Ipv4Addr>, ResolutionError>) -> ResolutionOutcome {
	match result {
		Ok(addrs) if addrs.is_empty() => ResolutionOutcome::NoAnswer,
		Ok(addrs) => ResolutionOutcome::Answer(addrs),
		Err(ResolutionError::NameError(_)) => ResolutionOutcome::NameError,
		Err(ResolutionError::NoAnswer(_)) => ResolutionOutcome::NoAnswer,
		Err(ResolutionError::Timeout(_)) => ResolutionOutcome::Timeout,
		Err(ResolutionError::Failed { .. }) => ResolutionOutcome::ServerFailure,
	}
}

/// Delegate the entire lookup to a recursive resolver.
pub async fn recursive_lookup(
	resolver: &dyn RecursiveResolver,
	domain: &str,
) -> ResolutionOutcome {
	info!(%domain, "recursive lookup");
	let result = resolver.resolve(domain).await;
	if let Err(e) = &result {
		debug!(%domain, error = %e, "recursive resolver reported an error");
	}
	let outcome = outcome_from(result);
	info!(%domain, outcome = outcome.kind(), "recursive lookup finished");
	outcome
}
