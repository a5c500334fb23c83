use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::LookupConfig;
use crate::dns::parse_name;
use crate::glue::GlueResolver;
use crate::hints::ServerSet;
use crate::message::{DnsMessage, Rcode};
use crate::outcome::ResolutionOutcome;
use crate::recursive::RecursiveResolver;
use crate::transport::{Exchange, UdpTransport};

/// Position in the delegation chain. Only used for reporting; anything past
/// the TLD level counts as authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Root,
	Tld,
	Authoritative,
}

impl Stage {
	pub fn next(self) -> Stage {
		match self {
			Stage::Root => Stage::Tld,
			Stage::Tld | Stage::Authoritative => Stage::Authoritative,
		}
	}
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Stage::Root => f.write_str("ROOT"),
			Stage::Tld => f.write_str("TLD"),
			Stage::Authoritative => f.write_str("AUTH"),
		}
	}
}

/// Walks the hierarchy from the root hints down to an authoritative answer.
///
/// Holds only immutable settings. Every call to [`lookup`](Self::lookup)
/// starts from its own copy of the root hints, so independent lookups can
/// run concurrently against one instance.
pub struct IterativeResolver {
	exchange: Arc<dyn Exchange>,
	glue: GlueResolver,
	root_hints: ServerSet,
	max_depth: usize,
}

impl IterativeResolver {
	pub fn new(
		exchange: Arc<dyn Exchange>,
		fallback: Arc<dyn RecursiveResolver>,
		root_hints: ServerSet,
		max_depth: usize,
	) -> Self {
		Self {
			exchange,
			glue: GlueResolver::new(fallback),
			root_hints,
			max_depth,
		}
	}

	/// Resolver speaking UDP to real nameservers with the configured settings.
	pub fn from_config(config: &LookupConfig, fallback: Arc<dyn RecursiveResolver>) -> Self {
		Self::new(
			Arc::new(UdpTransport::from_config(config)),
			fallback,
			config.root_hints.clone(),
			config.max_depth,
		)
	}

	/// Resolve the A records of `domain` without a recursive server.
	pub async fn lookup(&self, domain: &str) -> ResolutionOutcome {
		info!(%domain, "iterative lookup");
		let outcome = self.walk(domain).await;
		info!(%domain, outcome = outcome.kind(), "iterative lookup finished");
		outcome
	}

	async fn walk(&self, domain: &str) -> ResolutionOutcome {
		if let Err(e) = parse_name(domain) {
			warn!(%domain, error = %e, "refusing to resolve unencodable name");
			return ResolutionOutcome::ServerFailure;
		}

		let mut servers = self.root_hints.clone();
		let mut stage = Stage::Root;

		for depth in 0..self.max_depth {
			let response = match self.query_level(stage, &servers, domain).await {
				Ok(response) => response,
				Err(outcome) => return outcome,
			};

			if response.rcode() == &Rcode::NxDomain {
				info!(%domain, %stage, "NXDOMAIN");
				return ResolutionOutcome::NameError;
			}

			let addrs = response.answer_addresses(domain);
			if !addrs.is_empty() {
				return ResolutionOutcome::Answer(addrs);
			}
			if !response.answers.is_empty() {
				// e.g. a CNAME whose target was not answered alongside it
				debug!(%domain, %stage, records = response.answers.len(), "answer section holds no A record for the name");
				return ResolutionOutcome::NoAnswer;
			}

			if response.referral_nameservers().is_empty() {
				debug!(%domain, %stage, "no answer and no delegation");
				return ResolutionOutcome::NoAnswer;
			}

			let next = self.glue.next_server_set(&response).await;
			if next.is_empty() {
				warn!(%domain, %stage, "no further nameservers found");
				return ResolutionOutcome::ServerFailure;
			}

			stage = stage.next();
			info!(%domain, %stage, depth = depth + 1, servers = next.len(), "following delegation");
			servers = next;
		}

		warn!(%domain, max_depth = self.max_depth, "delegation chain too deep");
		ResolutionOutcome::ServerFailure
	}

	/// Ask the servers of one level in order until one gives a usable reply.
	///
	/// A usable reply has rcode NOERROR or NXDOMAIN. Anything else, including
	/// a timeout or an undecodable datagram, moves on to the next server. If
	/// the set runs out the error reflects the last failure seen.
	async fn query_level(
		&self,
		stage: Stage,
		servers: &ServerSet,
		domain: &str,
	) -> Result<DnsMessage, ResolutionOutcome> {
		let mut last_failure = ResolutionOutcome::ServerFailure;

		for &server in servers.iter() {
			debug!(%stage, %server, %domain, "querying");
			match self.exchange.query(server, domain).await {
				Ok(response) => {
					if matches!(response.rcode(), Rcode::NoError | Rcode::NxDomain) {
						return Ok(response);
					}
					warn!(%stage, %server, rcode = %response.rcode(), "server returned an error, trying next server");
					last_failure = ResolutionOutcome::ServerFailure;
				}
				Err(failure) => {
					warn!(%stage, %server, error = %failure, "no response, trying next server");
					last_failure = if failure.is_timeout() {
						ResolutionOutcome::Timeout
					} else {
						ResolutionOutcome::ServerFailure
					};
				}
			}
		}

		warn!(%stage, servers = servers.len(), "every server at this level failed");
		Err(last_failure)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use std::net::Ipv4Addr;
	use std::sync::Mutex;
	use std::time::{Duration, Instant};

	use async_trait::async_trait;

	use super::*;
	use crate::error::{DecodeError, ResolutionError, TransportFailure};
	use crate::message::{Flags, RecordData, RecordType, ResourceRecord};
	use crate::recursive::fake::FakeRecursive;

	const ROOT_A: Ipv4Addr = Ipv4Addr::new(198, 41, 0, 4);
	const ROOT_B: Ipv4Addr = Ipv4Addr::new(199, 9, 14, 201);
	const ROOT_C: Ipv4Addr = Ipv4Addr::new(192, 33, 4, 12);
	const TLD_A: Ipv4Addr = Ipv4Addr::new(192, 5, 6, 30);
	const TLD_B: Ipv4Addr = Ipv4Addr::new(192, 33, 14, 30);
	const AUTH: Ipv4Addr = Ipv4Addr::new(199, 43, 135, 53);
	const WEB_1: Ipv4Addr = Ipv4Addr::new(93, 184, 215, 14);
	const WEB_2: Ipv4Addr = Ipv4Addr::new(93, 184, 215, 15);

	#[derive(Clone)]
	enum Reply {
		Message(DnsMessage),
		Timeout,
		Refused,
		Malformed,
	}

	/// Exchange that replays a fixed reply per server and records who was asked
	#[derive(Default)]
	struct ScriptedExchange {
		replies: HashMap<Ipv4Addr, Reply>,
		calls: Mutex<Vec<Ipv4Addr>>,
	}

	impl ScriptedExchange {
		fn with(mut self, server: Ipv4Addr, reply: Reply) -> Self {
			self.replies.insert(server, reply);
			self
		}

		fn calls(&self) -> Vec<Ipv4Addr> {
			self.calls.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl Exchange for ScriptedExchange {
		async fn query(&self, server: Ipv4Addr, _domain: &str) -> Result<DnsMessage, TransportFailure> {
			self.calls.lock().unwrap().push(server);
			match self.replies.get(&server).cloned().unwrap_or(Reply::Timeout) {
				Reply::Message(message) => Ok(message),
				Reply::Timeout => Err(TransportFailure::Timeout { server, after: Duration::from_secs(3) }),
				Reply::Refused => Err(TransportFailure::Io {
					server,
					source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
				}),
				Reply::Malformed => Err(TransportFailure::Decode {
					server,
					source: DecodeError("unexpected end of input".to_string()),
				}),
			}
		}
	}

	fn rr(name: &str, data: RecordData) -> ResourceRecord {
		let rtype = match data {
			RecordData::A(_) => RecordType::A,
			RecordData::Ns(_) => RecordType::Ns,
			RecordData::Cname(_) => RecordType::Cname,
			RecordData::Other => RecordType::Soa,
		};
		ResourceRecord { name: name.to_string(), rtype, ttl: 3600, data }
	}

	fn reply(rcode: Rcode) -> DnsMessage {
		DnsMessage {
			id: 0,
			flags: Flags {
				response: true,
				opcode: 0,
				authoritative: false,
				truncated: false,
				recursion_desired: false,
				recursion_available: false,
				rcode,
			},
			questions: Vec::new(),
			answers: Vec::new(),
			authority: Vec::new(),
			additional: Vec::new(),
		}
	}

	/// Referral to `zone` served by `(nameserver, glue)` pairs
	fn referral(zone: &str, nameservers: &[(&str, Option<Ipv4Addr>)]) -> Reply {
		let mut msg = reply(Rcode::NoError);
		for (name, glue) in nameservers {
			msg.authority.push(rr(zone, RecordData::Ns(name.to_string())));
			if let Some(addr) = glue {
				msg.additional.push(rr(name, RecordData::A(*addr)));
			}
		}
		Reply::Message(msg)
	}

	fn answer(name: &str, addrs: &[Ipv4Addr]) -> Reply {
		let mut msg = reply(Rcode::NoError);
		msg.flags.authoritative = true;
		for addr in addrs {
			msg.answers.push(rr(name, RecordData::A(*addr)));
		}
		Reply::Message(msg)
	}

	fn status(rcode: Rcode) -> Reply {
		Reply::Message(reply(rcode))
	}

	/// Root → com → example.com, all glued
	fn example_hierarchy() -> ScriptedExchange {
		ScriptedExchange::default()
			.with(ROOT_A, referral("com.", &[("a.gtld-servers.net.", Some(TLD_A))]))
			.with(TLD_A, referral("example.com.", &[("a.iana-servers.net.", Some(AUTH))]))
			.with(AUTH, answer("example.com.", &[WEB_1, WEB_2]))
	}

	fn resolver(exchange: Arc<ScriptedExchange>, fallback: Arc<FakeRecursive>, roots: &[Ipv4Addr]) -> IterativeResolver {
		IterativeResolver::new(exchange, fallback, roots.iter().copied().collect(), 16)
	}

	#[test]
	fn test_stage_progression() {
		assert_eq!(Stage::Root.next(), Stage::Tld);
		assert_eq!(Stage::Tld.next(), Stage::Authoritative);
		assert_eq!(Stage::Authoritative.next(), Stage::Authoritative);
	}

	#[tokio::test]
	async fn test_answer_after_full_delegation() {
		let exchange = Arc::new(example_hierarchy());
		let fallback = Arc::new(FakeRecursive::new());
		let walker = resolver(exchange.clone(), fallback.clone(), &[ROOT_A, ROOT_B]);

		let outcome = walker.lookup("example.com").await;
		assert_eq!(outcome, ResolutionOutcome::Answer(vec![WEB_1, WEB_2]));
		assert_eq!(exchange.calls(), vec![ROOT_A, TLD_A, AUTH]);
		assert!(fallback.calls().is_empty());
	}

	#[tokio::test]
	async fn test_unreachable_roots_skipped() {
		let exchange = Arc::new(example_hierarchy()
			.with(ROOT_B, Reply::Refused)
			.with(ROOT_C, Reply::Malformed));
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[ROOT_B, ROOT_C, ROOT_A]);

		let outcome = walker.lookup("example.com").await;
		assert_eq!(outcome, ResolutionOutcome::Answer(vec![WEB_1, WEB_2]));
		// Each failed server is tried once, never retried
		assert_eq!(exchange.calls(), vec![ROOT_B, ROOT_C, ROOT_A, TLD_A, AUTH]);
	}

	#[tokio::test]
	async fn test_all_roots_time_out() {
		let exchange = Arc::new(ScriptedExchange::default());
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[ROOT_A, ROOT_B, ROOT_C]);

		assert_eq!(walker.lookup("example.com").await, ResolutionOutcome::Timeout);
		assert_eq!(exchange.calls(), vec![ROOT_A, ROOT_B, ROOT_C]);
	}

	#[tokio::test]
	async fn test_exhausted_level_reports_last_cause() {
		let exchange = Arc::new(ScriptedExchange::default()
			.with(ROOT_A, Reply::Timeout)
			.with(ROOT_B, Reply::Refused));
		let walker = resolver(exchange, Arc::new(FakeRecursive::new()), &[ROOT_A, ROOT_B]);
		assert_eq!(walker.lookup("example.com").await, ResolutionOutcome::ServerFailure);
	}

	#[tokio::test]
	async fn test_empty_root_set_fails() {
		let exchange = Arc::new(ScriptedExchange::default());
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[]);
		assert_eq!(walker.lookup("example.com").await, ResolutionOutcome::ServerFailure);
		assert!(exchange.calls().is_empty());
	}

	#[tokio::test]
	async fn test_nxdomain_after_failed_servers() {
		let exchange = Arc::new(ScriptedExchange::default()
			.with(ROOT_A, referral("xyz.", &[
				("x.nic.xyz.", Some(TLD_A)),
				("y.nic.xyz.", Some(TLD_B)),
			]))
			.with(TLD_A, Reply::Timeout)
			.with(TLD_B, status(Rcode::NxDomain)));
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[ROOT_A]);

		let outcome = walker.lookup("nonexistentdomain.xyz").await;
		assert_eq!(outcome, ResolutionOutcome::NameError);
		assert_eq!(exchange.calls(), vec![ROOT_A, TLD_A, TLD_B]);
	}

	#[tokio::test]
	async fn test_nxdomain_from_root_is_terminal() {
		let exchange = Arc::new(ScriptedExchange::default()
			.with(ROOT_A, status(Rcode::NxDomain)));
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[ROOT_A, ROOT_B]);

		assert_eq!(walker.lookup("example.invalid").await, ResolutionOutcome::NameError);
		assert_eq!(exchange.calls(), vec![ROOT_A]);
	}

	#[tokio::test]
	async fn test_error_rcode_tries_next_server() {
		let exchange = Arc::new(example_hierarchy()
			.with(ROOT_B, status(Rcode::ServFail))
			.with(ROOT_C, status(Rcode::Refused)));
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[ROOT_B, ROOT_C, ROOT_A]);

		assert_eq!(walker.lookup("example.com").await, ResolutionOutcome::Answer(vec![WEB_1, WEB_2]));
		assert_eq!(exchange.calls()[..3], [ROOT_B, ROOT_C, ROOT_A]);
	}

	#[tokio::test]
	async fn test_glue_fallback_for_out_of_zone_nameservers() {
		// The .com servers delegate example.com to *.iana-servers.net without glue
		let exchange = Arc::new(example_hierarchy()
			.with(TLD_A, referral("example.com.", &[
				("a.iana-servers.net.", None),
				("b.iana-servers.net.", None),
			])));
		let fallback = Arc::new(FakeRecursive::new()
			.with("a.iana-servers.net", Ok(vec![AUTH]))
			.with("b.iana-servers.net", Err(ResolutionError::Timeout("b.iana-servers.net".into()))));
		let walker = resolver(exchange.clone(), fallback.clone(), &[ROOT_A]);

		let outcome = walker.lookup("example.com").await;
		assert_eq!(outcome, ResolutionOutcome::Answer(vec![WEB_1, WEB_2]));
		assert_eq!(
			fallback.calls(),
			vec!["a.iana-servers.net".to_string(), "b.iana-servers.net".to_string()],
		);
		assert_eq!(exchange.calls(), vec![ROOT_A, TLD_A, AUTH]);
	}

	#[tokio::test]
	async fn test_unresolvable_delegation_fails() {
		let exchange = Arc::new(example_hierarchy()
			.with(TLD_A, referral("example.com.", &[("ns.lame.example.", None)])));
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[ROOT_A]);

		assert_eq!(walker.lookup("example.com").await, ResolutionOutcome::ServerFailure);
		assert_eq!(exchange.calls(), vec![ROOT_A, TLD_A]);
	}

	#[tokio::test]
	async fn test_empty_response_is_no_answer() {
		let exchange = Arc::new(example_hierarchy().with(AUTH, status(Rcode::NoError)));
		let walker = resolver(exchange, Arc::new(FakeRecursive::new()), &[ROOT_A]);
		assert_eq!(walker.lookup("example.com").await, ResolutionOutcome::NoAnswer);
	}

	#[tokio::test]
	async fn test_soa_only_authority_is_no_answer() {
		let mut nodata = reply(Rcode::NoError);
		nodata.authority.push(rr("example.com.", RecordData::Other));
		let exchange = Arc::new(example_hierarchy().with(AUTH, Reply::Message(nodata)));
		let walker = resolver(exchange, Arc::new(FakeRecursive::new()), &[ROOT_A]);
		assert_eq!(walker.lookup("example.com").await, ResolutionOutcome::NoAnswer);
	}

	#[tokio::test]
	async fn test_cname_without_target_is_no_answer() {
		let mut msg = reply(Rcode::NoError);
		msg.answers.push(rr("www.example.com.", RecordData::Cname("edge.cdn.example.".to_string())));
		let exchange = Arc::new(example_hierarchy().with(AUTH, Reply::Message(msg)));
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[ROOT_A]);

		assert_eq!(walker.lookup("www.example.com").await, ResolutionOutcome::NoAnswer);
		assert_eq!(exchange.calls().len(), 3);
	}

	#[tokio::test]
	async fn test_cname_with_target_in_answer() {
		let mut msg = reply(Rcode::NoError);
		msg.answers.push(rr("www.example.com.", RecordData::Cname("example.com.".to_string())));
		msg.answers.push(rr("example.com.", RecordData::A(WEB_1)));
		let exchange = Arc::new(example_hierarchy().with(AUTH, Reply::Message(msg)));
		let walker = resolver(exchange, Arc::new(FakeRecursive::new()), &[ROOT_A]);

		assert_eq!(walker.lookup("www.example.com").await, ResolutionOutcome::Answer(vec![WEB_1]));
	}

	#[tokio::test]
	async fn test_referral_loop_is_bounded() {
		// A lame server that keeps delegating to itself
		let exchange = Arc::new(ScriptedExchange::default()
			.with(ROOT_A, referral("com.", &[("loop.example.", Some(ROOT_A))])));
		let walker = IterativeResolver::new(
			exchange.clone(),
			Arc::new(FakeRecursive::new()),
			[ROOT_A].into_iter().collect(),
			4,
		);

		assert_eq!(walker.lookup("example.com").await, ResolutionOutcome::ServerFailure);
		assert_eq!(exchange.calls().len(), 4);
	}

	#[tokio::test]
	async fn test_invalid_name_sends_nothing() {
		let exchange = Arc::new(example_hierarchy());
		let walker = resolver(exchange.clone(), Arc::new(FakeRecursive::new()), &[ROOT_A]);

		let domain = format!("{}.com", "x".repeat(64));
		assert_eq!(walker.lookup(&domain).await, ResolutionOutcome::ServerFailure);
		assert!(exchange.calls().is_empty());
	}

	#[tokio::test]
	async fn test_repeated_lookups_agree() {
		let exchange = Arc::new(example_hierarchy());
		let walker = resolver(exchange, Arc::new(FakeRecursive::new()), &[ROOT_A]);

		let first = walker.lookup("example.com").await;
		let second = walker.lookup("example.com").await;
		assert_eq!(first.kind(), second.kind());
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn test_silent_root_bounded_by_timeout() {
		// Bound but never read: the root hint swallows every query
		let silent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
		let port = silent.local_addr().unwrap().port();

		let timeout = Duration::from_millis(200);
		let walker = IterativeResolver::new(
			Arc::new(UdpTransport::new(port, timeout)),
			Arc::new(FakeRecursive::new()),
			[Ipv4Addr::LOCALHOST].into_iter().collect(),
			16,
		);

		let start = Instant::now();
		let outcome = walker.lookup("example.com").await;
		assert_eq!(outcome, ResolutionOutcome::Timeout);
		assert!(start.elapsed() < timeout + Duration::from_secs(1));
		drop(silent);
	}
}
