use std::net::Ipv4Addr;

use anyhow::{anyhow, Result};

/// Ordered set of candidate nameserver addresses for one delegation level.
///
/// Insertion order is kept and duplicates are dropped. A lookup builds a new
/// set at every level instead of editing the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerSet {
	addrs: Vec<Ipv4Addr>,
}

impl ServerSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append an address unless it is already present.
	pub fn insert(&mut self, addr: Ipv4Addr) {
		if !self.addrs.contains(&addr) {
			self.addrs.push(addr);
		}
	}

	pub fn extend<I: IntoIterator<Item = Ipv4Addr>>(&mut self, addrs: I) {
		for addr in addrs {
			self.insert(addr);
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = &Ipv4Addr> {
		self.addrs.iter()
	}

	pub fn len(&self) -> usize {
		self.addrs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.addrs.is_empty()
	}
}

impl FromIterator<Ipv4Addr> for ServerSet {
	fn from_iter<I: IntoIterator<Item = Ipv4Addr>>(iter: I) -> Self {
		let mut set = ServerSet::new();
		set.extend(iter);
		set
	}
}

/// Root server addresses used to bootstrap iterative resolution.
pub fn default_root_hints() -> ServerSet {
	[
		Ipv4Addr::new(198, 41, 0, 4),     // a.root-servers.net
		Ipv4Addr::new(199, 9, 14, 201),   // b.root-servers.net
		Ipv4Addr::new(192, 33, 4, 12),    // c.root-servers.net
		Ipv4Addr::new(199, 7, 91, 13),    // d.root-servers.net
		Ipv4Addr::new(192, 203, 230, 10), // e.root-servers.net
	].into_iter().collect()
}

/// Parse a root hint entry. Only bare IPv4 addresses are accepted; the
/// port is configured separately for every server.
pub fn parse_root_hint(input: &str) -> Result<Ipv4Addr> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(anyhow!("empty root hint"));
	}
	trimmed.parse()
		.map_err(|e| anyhow!("invalid root hint '{}': {}", trimmed, e))
}

/// Read root hint addresses from a file, one per line.
///
/// Blank lines and lines starting with '#' are skipped.
pub fn read_root_hint_file(path: &str) -> Result<Vec<Ipv4Addr>> {
	let content = std::fs::read_to_string(path)
		.map_err(|e| anyhow!("failed to read root hint file '{}': {}", path, e))?;
	parse_root_hint_lines(&content)
}

fn parse_root_hint_lines(content: &str) -> Result<Vec<Ipv4Addr>> {
	let mut hints = Vec::new();
	for line in content.lines() {
		let trimmed = line.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}
		hints.push(parse_root_hint(trimmed)?);
	}
	Ok(hints)
}
