use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::config::LookupConfig;
use crate::dns::{decode_message, encode_query};
use crate::error::TransportFailure;
use crate::message::DnsMessage;

/// Sends one A query to one server and returns its decoded reply.
///
/// Failures are ordinary results; implementations never panic on a bad
/// or silent server.
#[async_trait]
pub trait Exchange: Send + Sync {
	async fn query(&self, server: Ipv4Addr, domain: &str) -> Result<DnsMessage, TransportFailure>;
}

/// Plain UDP transport, one socket per attempt
#[derive(Debug, Clone)]
pub struct UdpTransport {
	pub port: u16,
	pub timeout: Duration,
}

impl UdpTransport {
	pub fn new(port: u16, timeout: Duration) -> Self {
		Self { port, timeout }
	}

	pub fn from_config(config: &LookupConfig) -> Self {
		Self::new(config.port, config.timeout)
	}
}

#[async_trait]
impl Exchange for UdpTransport {
	/// Send a single query over UDP and wait for the matching reply.
	///
	/// The socket is connected to the server, so datagrams from other
	/// sources never reach us and ICMP refusals surface as I/O errors.
	/// Replies with a foreign txid, or that are not responses, are
	/// discarded and the wait continues until the deadline.
	async fn query(&self, server: Ipv4Addr, domain: &str) -> Result<DnsMessage, TransportFailure> {
		let txid: u16 = rand::random();
		let query_bytes = encode_query(domain, txid)?;
		let target = SocketAddr::from((server, self.port));
		let io_failure = |source: std::io::Error| TransportFailure::Io { server, source };

		// Dropped (and closed) when this attempt returns, whatever the result
		let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(io_failure)?;
		socket.connect(target).await.map_err(io_failure)?;

		let start = Instant::now();
		socket.send(&query_bytes).await.map_err(io_failure)?;

		let mut buf = vec![0u8; 4096];
		loop {
			let elapsed = start.elapsed();
			if elapsed >= self.timeout {
				break;
			}
			let remaining = self.timeout - elapsed;

			let len = match tokio::time::timeout(remaining, socket.recv(&mut buf)).await {
				Ok(Ok(len)) => len,
				Ok(Err(source)) => return Err(io_failure(source)),
				Err(_) => break,
			};

			let message = decode_message(&buf[..len])
				.map_err(|source| TransportFailure::Decode { server, source })?;
			if message.id != txid || !message.flags.response {
				debug!(%server, expected = txid, got = message.id, "discarding unmatched datagram");
				continue;
			}
			debug!(
				%server,
				rcode = %message.rcode(),
				elapsed_ms = start.elapsed().as_millis() as u64,
				"reply received",
			);
			return Ok(message);
		}

		Err(TransportFailure::Timeout { server, after: self.timeout })
	}
}
