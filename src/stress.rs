use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::lookup::{Lookups, Mode};
use crate::outcome::ResolutionOutcome;
use crate::output;

/// Stress test configuration
#[derive(Debug, Clone)]
pub struct StressConfig {
	pub requests: usize,
	pub max_inflight: usize,
	pub seed: Option<u64>,
}

/// One completed lookup of the stress run
#[derive(Debug, Clone)]
pub struct StressSample {
	pub mode: Mode,
	pub domain: String,
	pub outcome: ResolutionOutcome,
	pub elapsed: Duration,
}

/// Pick `count` domains at random from `domains`.
fn pick_domains(domains: &[String], count: usize, rng: &mut StdRng) -> Vec<String> {
	(0..count)
		.filter_map(|_| domains.choose(rng).cloned())
		.collect()
}

/// Run many independent lookups in parallel.
///
/// Each lookup is a separate task with its own server sets; the only thing
/// shared is the immutable resolver configuration. At most `max_inflight`
/// lookups run at once. Samples come back in submission order.
pub async fn run_stress(
	lookups: Arc<Lookups>,
	mode: Mode,
	domains: &[String],
	config: &StressConfig,
) -> Result<Vec<StressSample>> {
	if domains.is_empty() {
		return Err(anyhow!("no domains to query"));
	}

	println!(
		"[STARTING STRESS TEST] Mode: {}, Requests: {}",
		mode.to_string().to_uppercase(), config.requests,
	);

	// Create a seeded RNG for reproducible domain picks
	let mut rng = match config.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_entropy(),
	};
	let picks = pick_domains(domains, config.requests, &mut rng);

	let semaphore = Arc::new(Semaphore::new(config.max_inflight.max(1)));
	let mut handles = Vec::new();

	for domain in picks {
		// Acquire before spawning so no more than max_inflight tasks exist
		let permit = semaphore.clone().acquire_owned().await?;
		let lookups = lookups.clone();

		handles.push(tokio::spawn(async move {
			let start = Instant::now();
			let outcome = lookups.lookup(mode, &domain).await;
			let sample = StressSample {
				mode,
				domain,
				outcome,
				elapsed: start.elapsed(),
			};
			drop(permit);
			output::print_stress_sample(&sample);
			sample
		}));
	}

	let mut samples = Vec::new();
	for handle in handles {
		match handle.await {
			Ok(sample) => samples.push(sample),
			Err(e) => warn!(error = %e, "stress task failed"),
		}
	}

	println!("[STRESS TEST COMPLETE]");
	Ok(samples)
}
