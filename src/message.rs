use std::fmt;
use std::net::Ipv4Addr;

/// Record types the resolver cares about; everything else is kept as its code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
	A,
	Ns,
	Cname,
	Soa,
	Other(u16),
}

/// Response code carried in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rcode {
	NoError,
	NxDomain,
	ServFail,
	Refused,
	Other(String),
}

impl fmt::Display for Rcode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Rcode::NoError => f.write_str("NOERROR"),
			Rcode::NxDomain => f.write_str("NXDOMAIN"),
			Rcode::ServFail => f.write_str("SERVFAIL"),
			Rcode::Refused => f.write_str("REFUSED"),
			Rcode::Other(name) => f.write_str(name),
		}
	}
}

/// Header flags of a DNS message
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct Flags {
	pub response: bool,
	pub opcode: u8,
	pub authoritative: bool,
	pub truncated: bool,
	pub recursion_desired: bool,
	pub recursion_available: bool,
	pub rcode: Rcode,
}

/// A question entry. The class is always IN.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct Question {
	pub name: String,
	pub qtype: RecordType,
}

/// Payload of a resource record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
	A(Ipv4Addr),
	Ns(String),
	Cname(String),
	/// Types the resolver never reads
	Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct ResourceRecord {
	pub name: String,
	pub rtype: RecordType,
	/// Informational only, nothing is cached
	pub ttl: u32,
	pub data: RecordData,
}

/// A decoded DNS message, independent of the wire library
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct DnsMessage {
	pub id: u16,
	pub flags: Flags,
	pub questions: Vec<Question>,
	pub answers: Vec<ResourceRecord>,
	pub authority: Vec<ResourceRecord>,
	pub additional: Vec<ResourceRecord>,
}

/// Normalize a domain name for comparison: lowercase, no trailing dot.
pub fn normalize_name(name: &str) -> String {
	name.trim_end_matches('.').to_ascii_lowercase()
}

impl DnsMessage {
	pub fn rcode(&self) -> &Rcode {
		&self.flags.rcode
	}

	/// A records in the answer section that belong to `domain`.
	///
	/// CNAME records inside the same answer section are followed, so an
	/// answer of `www.example.com CNAME edge.example.net` plus
	/// `edge.example.net A ...` yields the edge addresses. Nothing outside
	/// the answer section is consulted.
	pub fn answer_addresses(&self, domain: &str) -> Vec<Ipv4Addr> {
		let mut owners = vec![normalize_name(domain)];
		// Each pass can extend the chain by one hop; answer.len() bounds it
		for _ in 0..self.answers.len() {
			let mut extended = false;
			for record in &self.answers {
				if let RecordData::Cname(target) = &record.data {
					let owner = normalize_name(&record.name);
					let target = normalize_name(target);
					if owners.contains(&owner) && !owners.contains(&target) {
						owners.push(target);
						extended = true;
					}
				}
			}
			if !extended {
				break;
			}
		}

		let mut addrs = Vec::new();
		for record in &self.answers {
			if let RecordData::A(addr) = record.data {
				if owners.contains(&normalize_name(&record.name)) && !addrs.contains(&addr) {
					addrs.push(addr);
				}
			}
		}
		addrs
	}

	/// Nameserver hostnames from NS records in the authority section,
	/// normalized and de-duplicated, in section order.
	pub fn referral_nameservers(&self) -> Vec<String> {
		let mut names: Vec<String> = Vec::new();
		for record in &self.authority {
			if let RecordData::Ns(target) = &record.data {
				let target = normalize_name(target);
				if !names.contains(&target) {
					names.push(target);
				}
			}
		}
		names
	}

	/// Glue: A records in the additional section owned by `nameserver`.
	pub fn glue_for(&self, nameserver: &str) -> Vec<Ipv4Addr> {
		let wanted = normalize_name(nameserver);
		self.additional.iter()
			.filter(|r| normalize_name(&r.name) == wanted)
			.filter_map(|r| match r.data {
				RecordData::A(addr) => Some(addr),
				_ => None,
			})
			.collect()
	}
}
