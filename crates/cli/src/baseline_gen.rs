//! Synthetic baseline generation
//!
//! Produces a snapshot with realistic per-metric distributions so the
//! detector has a warm baseline before any production traffic arrives.
//! Output is the exact snapshot shape the engine loads.

use std::collections::BTreeMap;

use chrono::Utc;
use detector_lib::{BaselineStat, Snapshot, SnapshotMetadata};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Expected distribution per metric: (name, mean, std, min, max).
///
/// Tuned to typical hosted-LLM behavior: latency around 200-300ms with
/// occasional spikes, a few hundred tokens per request, cost tracking
/// token usage, and rare refusals/truncations.
const METRIC_CONFIGS: &[(&str, f64, f64, f64, f64)] = &[
    ("llm.tokens.total", 500.0, 150.0, 50.0, 2000.0),
    ("llm.tokens.prompt", 200.0, 80.0, 20.0, 1000.0),
    ("llm.tokens.response", 300.0, 100.0, 20.0, 1500.0),
    ("llm.tokens.ratio", 0.8, 0.3, 0.1, 3.0),
    ("llm.cost.per_request", 0.0004, 0.00015, 0.00005, 0.002),
    ("llm.cost.input", 0.00005, 0.00002, 0.000005, 0.00025),
    ("llm.cost.output", 0.00015, 0.00005, 0.00001, 0.00075),
    ("llm.latency.ms", 250.0, 80.0, 100.0, 2000.0),
    ("llm.throughput.tokens_per_sec", 2000.0, 500.0, 500.0, 5000.0),
    ("llm.prompt.length", 800.0, 300.0, 50.0, 5000.0),
    ("llm.prompt.complexity_score", 15.0, 5.0, 5.0, 40.0),
    ("llm.prompt.question_count", 1.5, 1.0, 0.0, 5.0),
    ("llm.prompt.context_utilization", 3.0, 2.0, 0.1, 15.0),
    ("llm.response.length", 1200.0, 500.0, 50.0, 8000.0),
    ("llm.response.is_refusal", 0.02, 0.02, 0.0, 1.0),
    ("llm.response.has_code", 0.15, 0.1, 0.0, 1.0),
    ("llm.response.is_truncated", 0.01, 0.01, 0.0, 1.0),
];

/// Generates synthetic baseline snapshots for the canonical LLM metrics
pub struct BaselineGenerator {
    pub num_points: usize,
    /// Fraction of points replaced with 3-5 sigma outliers
    pub anomaly_rate: f64,
    pub window_size: usize,
    pub threshold: f64,
    pub ewma_alpha: f64,
}

impl BaselineGenerator {
    pub fn new(num_points: usize, anomaly_rate: f64) -> Self {
        Self {
            num_points,
            anomaly_rate,
            window_size: 100,
            threshold: 3.0,
            ewma_alpha: 0.1,
        }
    }

    /// Generate a complete snapshot from the configured distributions.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Snapshot {
        let mut baseline = BTreeMap::new();
        let mut history = BTreeMap::new();

        for (name, mean, std, min_val, max_val) in METRIC_CONFIGS {
            let values = self.generate_metric_values(rng, *mean, *std, *min_val, *max_val);

            let n = values.len() as f64;
            let sample_mean = values.iter().sum::<f64>() / n;
            let variance =
                values.iter().map(|v| (v - sample_mean).powi(2)).sum::<f64>() / n;

            baseline.insert(
                name.to_string(),
                BaselineStat {
                    mean: sample_mean,
                    std: variance.sqrt(),
                },
            );
            history.insert(name.to_string(), values);
        }

        Snapshot {
            baseline,
            history,
            updated_at: Utc::now(),
            metadata: SnapshotMetadata {
                window_size: self.window_size,
                threshold: self.threshold,
                ewma_alpha: self.ewma_alpha,
            },
        }
    }

    /// Normal-distributed values clipped to `[min_val, max_val]`, with a
    /// configurable fraction replaced by 3-5 sigma outliers on either side.
    fn generate_metric_values<R: Rng>(
        &self,
        rng: &mut R,
        mean: f64,
        std: f64,
        min_val: f64,
        max_val: f64,
    ) -> Vec<f64> {
        // All configured stds are positive, but degrade to the mean
        // rather than panic if a custom config ever breaks that
        let normal = Normal::new(mean, std).ok();

        (0..self.num_points)
            .map(|_| {
                if rng.gen_bool(self.anomaly_rate) {
                    let sigma = rng.gen_range(3.0..5.0);
                    if rng.gen_bool(0.5) {
                        (mean + sigma * std).min(max_val)
                    } else {
                        (mean - sigma * std).max(min_val)
                    }
                } else {
                    match normal {
                        Some(dist) => dist.sample(rng).clamp(min_val, max_val),
                        None => mean,
                    }
                }
            })
            .collect()
    }
}
