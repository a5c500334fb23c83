use std::net::IpAddr;
use std::time::Duration;

use crate::hints::{default_root_hints, ServerSet};

/// Per-attempt timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Delegation steps allowed before a lookup is abandoned
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Settings for one resolver instance. Passed in explicitly; nothing here is
/// mutated while lookups run.
#[derive(Debug, Clone)]
pub struct LookupConfig {
	pub timeout: Duration,
	pub root_hints: ServerSet,
	/// UDP port used for every nameserver, roots included
	pub port: u16,
	pub max_depth: usize,
	/// Upstream recursive servers; empty means the system configuration
	pub upstreams: Vec<IpAddr>,
}

impl Default for LookupConfig {
	fn default() -> Self {
		Self {
			timeout: DEFAULT_TIMEOUT,
			root_hints: default_root_hints(),
			port: 53,
			max_depth: DEFAULT_MAX_DEPTH,
			upstreams: Vec::new(),
		}
	}
}
