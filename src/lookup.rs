use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::config::LookupConfig;
use crate::outcome::ResolutionOutcome;
use crate::recursive::{recursive_lookup, RecursiveResolver, SystemResolver};
use crate::walker::IterativeResolver;

/// Lookup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
	Iterative,
	Recursive,
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Mode::Iterative => f.write_str("iterative"),
			Mode::Recursive => f.write_str("recursive"),
		}
	}
}

/// Both lookup entry points over one shared recursive collaborator
pub struct Lookups {
	iterative: IterativeResolver,
	recursive: Arc<dyn RecursiveResolver>,
}

impl Lookups {
	pub fn new(iterative: IterativeResolver, recursive: Arc<dyn RecursiveResolver>) -> Self {
		Self { iterative, recursive }
	}

	/// Build from configuration: UDP transport for iterative mode, and the
	/// upstream (or system) resolver for recursive mode and glue fallback.
	pub fn from_config(config: &LookupConfig) -> Result<Self> {
		let recursive: Arc<dyn RecursiveResolver> = if config.upstreams.is_empty() {
			Arc::new(SystemResolver::from_system_conf(config.timeout)?)
		} else {
			Arc::new(SystemResolver::with_upstreams(&config.upstreams, config.timeout))
		};
		let iterative = IterativeResolver::from_config(config, recursive.clone());
		Ok(Self::new(iterative, recursive))
	}

	pub async fn iterative_lookup(&self, domain: &str) -> ResolutionOutcome {
		self.iterative.lookup(domain).await
	}

	pub async fn recursive_lookup(&self, domain: &str) -> ResolutionOutcome {
		recursive_lookup(self.recursive.as_ref(), domain).await
	}

	pub async fn lookup(&self, mode: Mode, domain: &str) -> ResolutionOutcome {
		match mode {
			Mode::Iterative => self.iterative_lookup(domain).await,
			Mode::Recursive => self.recursive_lookup(domain).await,
		}
	}
}
