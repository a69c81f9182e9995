//! EWMA baseline tracking
//!
//! Maintains an exponentially smoothed mean and standard deviation per
//! metric. Baselines are initialized from window statistics once a metric
//! has accumulated enough samples, then updated recursively. They are
//! reported alongside anomalies and persisted in snapshots; the detection
//! decision itself runs on live window statistics.

use std::collections::{BTreeMap, HashMap};

use crate::models::BaselineStat;
use crate::window::RollingWindowStore;

/// Per-metric EWMA baseline estimator
pub struct BaselineTracker {
    min_data_points: usize,
    default_alpha: f64,
    baselines: HashMap<String, BaselineStat>,
}

impl BaselineTracker {
    pub fn new(min_data_points: usize, default_alpha: f64) -> Self {
        Self {
            min_data_points,
            default_alpha,
            baselines: HashMap::new(),
        }
    }

    /// Update the baseline for a metric with the configured alpha.
    ///
    /// Returns the baseline after the update, or `None` when the metric's
    /// window is still too short to initialize one.
    pub fn update(
        &mut self,
        metric: &str,
        value: f64,
        windows: &RollingWindowStore,
    ) -> Option<BaselineStat> {
        self.update_with_alpha(metric, value, self.default_alpha, windows)
    }

    /// Update the baseline for a metric with an explicit alpha.
    pub fn update_with_alpha(
        &mut self,
        metric: &str,
        value: f64,
        alpha: f64,
        windows: &RollingWindowStore,
    ) -> Option<BaselineStat> {
        if let Some(stat) = self.baselines.get_mut(metric) {
            stat.mean = alpha * value + (1.0 - alpha) * stat.mean;
            // diff is taken against the just-updated mean, not the previous
            // one; the stored std depends on this operation order
            let diff = value - stat.mean;
            stat.std = (alpha * diff * diff + (1.0 - alpha) * stat.std * stat.std).sqrt();
            return Some(*stat);
        }

        // No baseline yet: seed from window statistics once enough samples exist
        let stats = windows.stats(metric)?;
        if stats.count < self.min_data_points {
            return None;
        }

        let stat = BaselineStat {
            mean: stats.mean,
            std: stats.std,
        };
        self.baselines.insert(metric.to_string(), stat);
        Some(stat)
    }

    pub fn get(&self, metric: &str) -> Option<&BaselineStat> {
        self.baselines.get(metric)
    }

    /// Number of metrics with an initialized baseline.
    pub fn metric_count(&self) -> usize {
        self.baselines.len()
    }

    /// Install a baseline loaded from a snapshot, as-is.
    pub fn seed(&mut self, metric: String, stat: BaselineStat) {
        self.baselines.insert(metric, stat);
    }

    /// All baselines keyed by metric name, in stable order.
    pub fn snapshot(&self) -> BTreeMap<String, BaselineStat> {
        self.baselines
            .iter()
            .map(|(metric, stat)| (metric.clone(), *stat))
            .collect()
    }

    pub fn clear(&mut self) {
        self.baselines.clear();
    }
}
