use std::time::Duration;

use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL};

use anyhow::Result;

use crate::config::LookupConfig;
use crate::lookup::Mode;
use crate::outcome::ResolutionOutcome;
use crate::stats::ModeSummary;
use crate::stress::StressSample;

/// Print a summary of the lookup configuration before a stress run.
pub fn print_config_summary(config: &LookupConfig, domain_count: usize) {
	println!("DNS Walk Configuration");
	println!("======================");
	println!("Root servers:   {}", config.root_hints.len());
	for addr in config.root_hints.iter() {
		println!("  - {}", addr);
	}
	println!("Port:           {}", config.port);
	println!("Timeout:        {} ms", config.timeout.as_millis());
	println!("Max depth:      {}", config.max_depth);
	if config.upstreams.is_empty() {
		println!("Upstream:       system configuration");
	} else {
		let upstreams: Vec<String> = config.upstreams.iter().map(|a| a.to_string()).collect();
		println!("Upstream:       {}", upstreams.join(", "));
	}
	println!("Domains:        {}", domain_count);
	println!();
}

/// Print the result of a single lookup.
pub fn print_outcome(mode: Mode, domain: &str, outcome: &ResolutionOutcome, elapsed: Duration) {
	println!("[{} DNS Lookup] {}", capitalize(&mode.to_string()), domain);
	match outcome {
		ResolutionOutcome::Answer(addrs) => {
			for addr in addrs {
				println!("[SUCCESS] {} -> {}", domain, addr);
			}
		}
		ResolutionOutcome::NameError => {
			println!("[ERROR] Domain '{}' does not exist.", domain);
		}
		ResolutionOutcome::NoAnswer => {
			println!("[ERROR] No answer found for '{}'.", domain);
		}
		ResolutionOutcome::Timeout => {
			println!("[ERROR] Query timed out.");
		}
		ResolutionOutcome::ServerFailure => {
			println!("[ERROR] Resolution failed.");
		}
	}
	println!("Time taken: {:.3} seconds", elapsed.as_secs_f64());
}

/// Print one finished stress lookup.
pub fn print_stress_sample(sample: &StressSample) {
	println!(
		"[STRESS TEST] {} {} completed in {:.3} seconds ({})",
		sample.mode.to_string().to_uppercase(),
		sample.domain,
		sample.elapsed.as_secs_f64(),
		sample.outcome.kind(),
	);
}

/// Print the stress summaries as a formatted table.
pub fn print_stress_table(summaries: &[ModeSummary]) {
	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_content_arrangement(ContentArrangement::Dynamic);
	table.set_header(vec![
		"Mode", "Lookups",
		"p50", "p95", "Mean", "Stddev", "Max",
		"Answered %", "Outcomes",
	]);

	for s in summaries {
		table.add_row(stress_row(s));
	}

	println!("\nStress Test Results");
	println!("===================\n");
	println!("{table}");
}

fn stress_row(s: &ModeSummary) -> Vec<String> {
	let outcomes: Vec<String> = s.outcomes.iter()
		.map(|(kind, count)| format!("{} {}", kind, count))
		.collect();
	vec![
		s.mode.to_string(),
		format!("{}", s.total_count),
		format!("{:.1} ms", s.p50_ms),
		format!("{:.1} ms", s.p95_ms),
		format!("{:.1} ms", s.mean_ms),
		format!("{:.1} ms", s.stddev_ms),
		format!("{:.1} ms", s.max_ms),
		format!("{:.1}%", s.answer_rate()),
		outcomes.join(", "),
	]
}

/// Write every stress sample to a CSV file.
pub fn write_csv(path: &str, samples: &[StressSample]) -> Result<()> {
	let mut writer = csv::Writer::from_path(path)?;

	writer.write_record(["mode", "domain", "outcome", "addresses", "elapsed_ms"])?;

	for s in samples {
		let addresses = match &s.outcome {
			ResolutionOutcome::Answer(addrs) => addrs.iter()
				.map(|a| a.to_string())
				.collect::<Vec<_>>()
				.join(" "),
			_ => String::new(),
		};
		writer.write_record([
			s.mode.to_string(),
			s.domain.clone(),
			s.outcome.kind().to_string(),
			addresses,
			format!("{:.2}", s.elapsed.as_secs_f64() * 1000.0),
		])?;
	}

	writer.flush()?;
	println!("\nResults written to: {}", path);
	Ok(())
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
