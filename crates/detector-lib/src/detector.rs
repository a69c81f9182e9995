//! Z-score anomaly detection engine
//!
//! Orchestrates ingestion: every sample lands in its metric's rolling
//! window, feeds the EWMA baseline once enough history exists, and is
//! tested against live window statistics. Detections are classified by
//! severity and direction and kept in a bounded history for correlation.

use std::collections::VecDeque;

use chrono::Utc;
use tracing::{error, warn};

use crate::baseline::BaselineTracker;
use crate::config::{ConfigError, DetectorConfig};
use crate::models::{AnomalyRecord, DetectorStats, Direction, Severity};
use crate::persistence::{self, Snapshot, SnapshotMetadata};
use crate::window::RollingWindowStore;

/// Capacity of the recent-anomaly history kept for correlation
const ANOMALY_HISTORY_SIZE: usize = 50;

/// Windows with a standard deviation below this are treated as constant
const STD_EPSILON: f64 = 1e-4;

/// Streaming z-score anomaly detector over named metric streams.
///
/// One instance exclusively owns its windows, baselines, and anomaly
/// history. `detect` is a non-atomic read-modify-write, so a shared
/// instance needs external synchronization around the full call.
pub struct AnomalyDetector {
    config: DetectorConfig,
    windows: RollingWindowStore,
    baseline: BaselineTracker,
    recent_anomalies: VecDeque<AnomalyRecord>,
    total_datapoints: u64,
    anomalies_detected: u64,
}

impl AnomalyDetector {
    /// Build an engine from a validated configuration.
    ///
    /// When a snapshot path is configured, prior state is loaded from it;
    /// a missing or unreadable snapshot means a cold start, never a
    /// construction failure.
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut detector = Self {
            windows: RollingWindowStore::new(config.window_size),
            baseline: BaselineTracker::new(config.min_data_points, config.ewma_alpha),
            recent_anomalies: VecDeque::with_capacity(ANOMALY_HISTORY_SIZE),
            total_datapoints: 0,
            anomalies_detected: 0,
            config,
        };

        if let Some(path) = detector.config.snapshot_path.clone() {
            if let Some(snapshot) = persistence::load_snapshot(&path) {
                detector.restore(snapshot);
            }
        }

        Ok(detector)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Ingest one sample and test it for anomaly.
    ///
    /// Returns `None` for every non-detection branch: non-finite input,
    /// insufficient window data, near-zero variance, or a z-score under
    /// the threshold. None of these are errors.
    pub fn detect(&mut self, metric: &str, value: f64) -> Option<AnomalyRecord> {
        if !value.is_finite() {
            warn!(metric, value, "rejecting non-finite sample");
            return None;
        }

        self.windows.add(metric, value);
        self.total_datapoints += 1;

        // EWMA baseline is bookkeeping for reporting and persistence;
        // the detection decision below runs on live window statistics
        let baseline = if self.windows.len(metric) >= self.config.min_data_points {
            self.baseline.update(metric, value, &self.windows)
        } else {
            None
        };

        let stats = self.windows.stats(metric)?;
        if stats.count < self.config.min_data_points {
            return None;
        }

        // Constant input is never anomalous
        if stats.std < STD_EPSILON {
            return None;
        }

        let z_score = (value - stats.mean) / stats.std;
        if z_score.abs() < self.config.threshold {
            return None;
        }

        self.anomalies_detected += 1;

        let deviation_percent = if stats.mean != 0.0 {
            (value - stats.mean) / stats.mean.abs() * 100.0
        } else {
            0.0
        };
        let severity = Severity::from_z_score(z_score.abs());
        let direction = if z_score > 0.0 {
            Direction::High
        } else {
            Direction::Low
        };
        let baseline = baseline?;

        let record = AnomalyRecord {
            metric_name: metric.to_string(),
            value: round_to(value, 4),
            z_score: round_to(z_score, 2),
            deviation_percent: round_to(deviation_percent, 2),
            severity,
            direction,
            baseline_mean: round_to(baseline.mean, 4),
            baseline_std: round_to(baseline.std, 4),
            timestamp: Utc::now(),
        };

        if self.recent_anomalies.len() == ANOMALY_HISTORY_SIZE {
            self.recent_anomalies.pop_front();
        }
        self.recent_anomalies.push_back(record.clone());

        warn!(
            metric,
            value,
            z_score = record.z_score,
            deviation_percent = record.deviation_percent,
            severity = %severity,
            direction = %direction,
            "anomaly detected"
        );

        Some(record)
    }

    /// Run `detect` over a batch of metrics in the caller's order,
    /// collecting the hits. Ordering is preserved so output is
    /// reproducible for a given input sequence.
    pub fn detect_batch<'a, I>(&mut self, metrics: I) -> Vec<AnomalyRecord>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        metrics
            .into_iter()
            .filter_map(|(metric, value)| self.detect(metric, value))
            .collect()
    }

    /// Most recent anomalies, oldest first, up to `limit`.
    pub fn recent_anomalies(&self, limit: usize) -> Vec<AnomalyRecord> {
        let skip = self.recent_anomalies.len().saturating_sub(limit);
        self.recent_anomalies.iter().skip(skip).cloned().collect()
    }

    /// Counters and sizing for stats endpoints and tests.
    pub fn stats(&self) -> DetectorStats {
        DetectorStats {
            total_datapoints: self.total_datapoints,
            anomalies_detected: self.anomalies_detected,
            metrics_tracked: self.windows.metric_count(),
            baseline_metrics: self.baseline.metric_count(),
            window_size: self.config.window_size,
            threshold: self.config.threshold,
            recent_anomalies: self.recent_anomalies.len(),
        }
    }

    /// Current window count for one metric, for callers that need to
    /// distinguish the insufficient-data branch.
    pub fn window_len(&self, metric: &str) -> usize {
        self.windows.len(metric)
    }

    /// Current state as a persistable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            baseline: self.baseline.snapshot(),
            history: self.windows.history(),
            updated_at: Utc::now(),
            metadata: SnapshotMetadata {
                window_size: self.config.window_size,
                threshold: self.config.threshold,
                ewma_alpha: self.config.ewma_alpha,
            },
        }
    }

    /// Persist current state to the configured snapshot path.
    ///
    /// Failures are logged and swallowed; persistence never interrupts
    /// detection.
    pub fn save_state(&self) {
        let Some(path) = self.config.snapshot_path.as_ref() else {
            return;
        };
        if let Err(e) = persistence::save_snapshot(&self.snapshot(), path) {
            error!(path = %path.display(), "failed to save snapshot: {e:#}");
        }
    }

    /// Restore baselines as-is and rebuild windows from persisted
    /// history, truncated to the configured window size.
    fn restore(&mut self, snapshot: Snapshot) {
        for (metric, stat) in snapshot.baseline {
            self.baseline.seed(metric, stat);
        }
        for (metric, values) in &snapshot.history {
            self.windows.seed(metric, values);
        }
    }

    /// Drop all windows, baselines, history, and counters.
    pub fn reset(&mut self) {
        self.windows.clear();
        self.baseline.clear();
        self.recent_anomalies.clear();
        self.total_datapoints = 0;
        self.anomalies_detected = 0;
    }
}

/// Round to a fixed number of decimal places for presentation fields.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
