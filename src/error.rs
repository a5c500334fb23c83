use std::net::Ipv4Addr;
use std::time::Duration;

use thiserror::Error;

/// Failure to turn a domain into a query message
#[derive(Error, Debug)]
pub enum EncodeError {
	#[error("invalid domain name '{domain}': {reason}")]
	InvalidName { domain: String, reason: String },

	#[error("failed to serialize DNS query: {0}")]
	Serialize(String),
}

/// Failure to parse bytes received from a server
#[derive(Error, Debug)]
#[error("failed to parse DNS message: {0}")]
pub struct DecodeError(pub String);

/// A single query attempt that produced no usable message.
///
/// Always recoverable: the caller moves on to the next server in the set.
#[derive(Error, Debug)]
pub enum TransportFailure {
	#[error("no answer from {server} within {} ms", .after.as_millis())]
	Timeout { server: Ipv4Addr, after: Duration },

	#[error("socket error talking to {server}: {source}")]
	Io {
		server: Ipv4Addr,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed reply from {server}: {source}")]
	Decode {
		server: Ipv4Addr,
		#[source]
		source: DecodeError,
	},

	#[error(transparent)]
	Encode(#[from] EncodeError),
}

impl TransportFailure {
	pub fn is_timeout(&self) -> bool {
		matches!(self, TransportFailure::Timeout { .. })
	}
}

/// Errors reported by a recursive resolver collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
	#[error("domain '{0}' does not exist")]
	NameError(String),

	#[error("no A records found for '{0}'")]
	NoAnswer(String),

	#[error("query for '{0}' timed out")]
	Timeout(String),

	#[error("lookup of '{name}' failed: {reason}")]
	Failed { name: String, reason: String },
}
