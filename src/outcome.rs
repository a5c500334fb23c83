use std::fmt;
use std::net::Ipv4Addr;

/// Final result of one top-level lookup. Every lookup yields exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
	Answer(Vec<Ipv4Addr>),
	/// NOERROR, but nothing usable for the name
	NoAnswer,
	/// NXDOMAIN
	NameError,
	Timeout,
	ServerFailure,
}

impl ResolutionOutcome {
	/// Short stable label, used for grouping and CSV output
	pub fn kind(&self) -> &'static str {
		match self {
			ResolutionOutcome::Answer(_) => "answer",
			ResolutionOutcome::NoAnswer => "no-answer",
			ResolutionOutcome::NameError => "nxdomain",
			ResolutionOutcome::Timeout => "timeout",
			ResolutionOutcome::ServerFailure => "servfail",
		}
	}

	pub fn is_answer(&self) -> bool {
		matches!(self, ResolutionOutcome::Answer(_))
	}
}

impl fmt::Display for ResolutionOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResolutionOutcome::Answer(addrs) => {
				let list: Vec<String> = addrs.iter().map(|a| a.to_string()).collect();
				write!(f, "{}", list.join(", "))
			}
			ResolutionOutcome::NoAnswer => f.write_str("no answer"),
			ResolutionOutcome::NameError => f.write_str("domain does not exist (NXDOMAIN)"),
			ResolutionOutcome::Timeout => f.write_str("query timed out"),
			ResolutionOutcome::ServerFailure => f.write_str("resolution failed"),
		}
	}
}
