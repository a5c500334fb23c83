use std::collections::BTreeMap;

use crate::lookup::Mode;
use crate::stress::StressSample;

/// Latency and outcome summary for one lookup mode
#[derive(Debug, Clone)]
pub struct ModeSummary {
	pub mode: Mode,
	pub p50_ms: f64,
	pub p95_ms: f64,
	pub mean_ms: f64,
	pub stddev_ms: f64,
	pub max_ms: f64,
	pub total_count: usize,
	pub answered_count: usize,
	/// Count per outcome kind, sorted by kind
	pub outcomes: BTreeMap<&'static str, usize>,
}

impl ModeSummary {
	pub fn answer_rate(&self) -> f64 {
		if self.total_count == 0 {
			return 0.0;
		}
		(self.answered_count as f64 / self.total_count as f64) * 100.0
	}
}

/// Calculate the p-th percentile from a sorted slice using nearest-rank method.
///
/// Args:
///   sorted_values: Pre-sorted slice of f64 values.
///   p: Percentile between 0.0 and 100.0 (e.g. 50.0 for median).
///
/// Returns:
///   None if the slice is empty, otherwise the percentile value.
pub fn percentile(sorted_values: &[f64], p: f64) -> Option<f64> {
	if sorted_values.is_empty() {
		return None;
	}
	// Nearest-rank: rank = ceil(p/100 * N), clamped to [1, N]
	let n = sorted_values.len();
	let rank = ((p / 100.0) * n as f64).ceil() as usize;
	let rank = rank.clamp(1, n);
	Some(sorted_values[rank - 1])
}

/// Calculate the arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	let sum: f64 = values.iter().sum();
	Some(sum / values.len() as f64)
}

/// Calculate the population standard deviation of a slice of values.
pub fn stddev(values: &[f64]) -> Option<f64> {
	let avg = mean(values)?;
	let variance = values.iter()
		.map(|v| (v - avg).powi(2))
		.sum::<f64>() / values.len() as f64;
	Some(variance.sqrt())
}

/// Summarize stress samples per mode, iterative first.
pub fn summarize(samples: &[StressSample]) -> Vec<ModeSummary> {
	[Mode::Iterative, Mode::Recursive].into_iter()
		.filter_map(|mode| summarize_mode(samples, mode))
		.collect()
}

fn summarize_mode(samples: &[StressSample], mode: Mode) -> Option<ModeSummary> {
	let selected: Vec<&StressSample> = samples.iter()
		.filter(|s| s.mode == mode)
		.collect();
	if selected.is_empty() {
		return None;
	}

	let mut latencies: Vec<f64> = selected.iter()
		.map(|s| s.elapsed.as_secs_f64() * 1000.0)
		.collect();
	latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

	let mut outcomes = BTreeMap::new();
	for sample in &selected {
		*outcomes.entry(sample.outcome.kind()).or_insert(0) += 1;
	}

	Some(ModeSummary {
		mode,
		p50_ms: percentile(&latencies, 50.0).unwrap_or(0.0),
		p95_ms: percentile(&latencies, 95.0).unwrap_or(0.0),
		mean_ms: mean(&latencies).unwrap_or(0.0),
		stddev_ms: stddev(&latencies).unwrap_or(0.0),
		max_ms: latencies.last().copied().unwrap_or(0.0),
		total_count: selected.len(),
		answered_count: selected.iter().filter(|s| s.outcome.is_answer()).count(),
		outcomes,
	})
}
