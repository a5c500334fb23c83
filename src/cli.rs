use clap::{Parser, Subcommand, ValueEnum};

/// Iterative and recursive DNS A-record lookups
#[derive(Parser, Debug)]
#[command(name = "dns-walk")]
#[command(about = "Resolve A records by walking the DNS hierarchy from the root servers")]
pub struct Cli {
	#[command(subcommand)]
	pub command: Command,

	/// Per-query timeout in milliseconds
	#[arg(short = 't', long = "timeout", default_value = "3000", global = true)]
	pub timeout: u64,

	/// Root server IPv4 address (repeatable, replaces the built-in root list)
	#[arg(long = "root", global = true)]
	pub roots: Vec<String>,

	/// File containing root server addresses (one per line)
	#[arg(long = "root-file", global = true)]
	pub root_file: Option<String>,

	/// UDP port used for every nameserver
	#[arg(long = "port", default_value = "53", global = true)]
	pub port: u16,

	/// Maximum number of delegations to follow
	#[arg(long = "max-depth", default_value = "16", global = true,
		value_parser = clap::value_parser!(u32).range(1..))]
	pub max_depth: u32,

	/// Upstream recursive resolver (repeatable, default: system configuration)
	#[arg(long = "upstream", global = true)]
	pub upstreams: Vec<String>,

	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
	pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Walk root -> TLD -> authoritative servers without a recursive resolver
	Iterative {
		domain: String,
	},

	/// Delegate the whole lookup to a recursive resolver
	Recursive {
		domain: String,
	},

	/// Run many independent lookups in parallel
	Stress {
		/// Which lookup mode(s) to exercise
		#[arg(short = 'm', long = "mode", value_enum, default_value = "both")]
		mode: StressMode,

		/// Number of lookups per mode
		#[arg(short = 'n', long = "requests", default_value = "50")]
		requests: usize,

		/// Maximum concurrent lookups
		#[arg(short = 'c', long = "concurrency", default_value = "10")]
		concurrency: usize,

		/// File containing domains to pick from (one per line)
		#[arg(long = "domains")]
		domains: Option<String>,

		/// Random seed for reproducible domain picks
		#[arg(short = 's', long = "seed")]
		seed: Option<u64>,

		/// Output CSV file path
		#[arg(short = 'o', long = "output")]
		output: Option<String>,
	},
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressMode {
	Iterative,
	Recursive,
	Both,
}
