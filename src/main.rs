mod cli;
mod config;
mod dns;
mod domains;
mod error;
mod glue;
mod hints;
mod lookup;
mod message;
mod outcome;
mod output;
mod recursive;
mod stats;
mod stress;
mod transport;
mod walker;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, StressMode};
use crate::config::LookupConfig;
use crate::hints::ServerSet;
use crate::lookup::{Lookups, Mode};
use crate::stress::StressConfig;

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	let config = build_config(&cli)?;

	match &cli.command {
		Command::Iterative { domain } => run_single(&config, Mode::Iterative, domain).await,
		Command::Recursive { domain } => run_single(&config, Mode::Recursive, domain).await,
		Command::Stress { mode, requests, concurrency, domains: domain_file, seed, output: csv_path } => {
			// Collect domains from file or defaults
			let domains = match domain_file {
				Some(path) => domains::read_domain_file(path)?,
				None => domains::default_stress_domains(),
			};
			let modes = match mode {
				StressMode::Iterative => vec![Mode::Iterative],
				StressMode::Recursive => vec![Mode::Recursive],
				StressMode::Both => vec![Mode::Iterative, Mode::Recursive],
			};
			let stress_config = StressConfig {
				requests: *requests,
				max_inflight: *concurrency,
				seed: *seed,
			};

			output::print_config_summary(&config, domains.len());

			let lookups = Arc::new(Lookups::from_config(&config)?);
			let mut samples = Vec::new();
			for mode in modes {
				samples.extend(stress::run_stress(lookups.clone(), mode, &domains, &stress_config).await?);
			}

			output::print_stress_table(&stats::summarize(&samples));

			// Write CSV if requested
			if let Some(path) = csv_path {
				output::write_csv(path, &samples)?;
			}
			Ok(())
		}
	}
}

/// Install the log subscriber. RUST_LOG wins over -v.
fn init_tracing(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("dns_walk={}", level)));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn build_config(cli: &Cli) -> Result<LookupConfig> {
	let mut config = LookupConfig {
		timeout: Duration::from_millis(cli.timeout),
		port: cli.port,
		max_depth: cli.max_depth as usize,
		..LookupConfig::default()
	};

	// Root hints from flags and file replace the built-in list
	let mut roots = ServerSet::new();
	for r in &cli.roots {
		roots.insert(hints::parse_root_hint(r)?);
	}
	if let Some(path) = &cli.root_file {
		roots.extend(hints::read_root_hint_file(path)?);
	}
	if !roots.is_empty() {
		config.root_hints = roots;
	}

	for u in &cli.upstreams {
		let addr: IpAddr = u.trim().parse()
			.map_err(|e| anyhow!("invalid upstream address '{}': {}", u, e))?;
		config.upstreams.push(addr);
	}

	Ok(config)
}

async fn run_single(config: &LookupConfig, mode: Mode, domain: &str) -> Result<()> {
	let lookups = Lookups::from_config(config)?;
	let start = Instant::now();
	let outcome = lookups.lookup(mode, domain).await;
	output::print_outcome(mode, domain, &outcome, start.elapsed());
	Ok(())
}
