use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::hints::ServerSet;
use crate::message::DnsMessage;
use crate::recursive::RecursiveResolver;

/// Turns the nameserver hostnames of a referral into addresses.
///
/// Glue from the referral's additional section is used when present; a
/// nameserver without glue is looked up through the recursive fallback.
/// Delegations to out-of-zone nameservers (common for CDN-hosted zones)
/// cannot be followed without that fallback.
#[derive(Clone)]
pub struct GlueResolver {
	fallback: Arc<dyn RecursiveResolver>,
}

impl GlueResolver {
	pub fn new(fallback: Arc<dyn RecursiveResolver>) -> Self {
		Self { fallback }
	}

	/// Addresses for one nameserver named in `referral`. Empty means the
	/// nameserver is unusable; that is not an error for the level.
	pub async fn resolve_nameserver(&self, referral: &DnsMessage, nameserver: &str) -> Vec<Ipv4Addr> {
		let glue = referral.glue_for(nameserver);
		if !glue.is_empty() {
			debug!(%nameserver, addrs = ?glue, "using glue from additional section");
			return glue;
		}

		match self.fallback.resolve(nameserver).await {
			Ok(addrs) => {
				debug!(%nameserver, addrs = ?addrs, "resolved nameserver through fallback");
				addrs
			}
			Err(e) => {
				warn!(%nameserver, error = %e, "unable to resolve nameserver");
				Vec::new()
			}
		}
	}

	/// Build the next server set from every NS record in the referral's
	/// authority section, keeping authority-section order.
	pub async fn next_server_set(&self, referral: &DnsMessage) -> ServerSet {
		let mut next = ServerSet::new();
		for nameserver in referral.referral_nameservers() {
			next.extend(self.resolve_nameserver(referral, &nameserver).await);
		}
		next
	}
}
