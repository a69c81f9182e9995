//! Test a metric value against a snapshot

use std::path::Path;

use anyhow::{ensure, Result};

use detector_lib::{AnomalyDetector, DetectorConfig};

use crate::output::{print_info, print_success, print_warning, OutputFormat};

pub fn run(
    snapshot: &Path,
    metric: &str,
    value: f64,
    threshold: f64,
    format: OutputFormat,
) -> Result<()> {
    ensure!(snapshot.exists(), "snapshot not found: {}", snapshot.display());

    let config = DetectorConfig {
        threshold,
        snapshot_path: Some(snapshot.to_path_buf()),
        ..Default::default()
    };
    let mut detector = AnomalyDetector::new(config)?;

    let window_len = detector.window_len(metric);
    let result = detector.detect(metric, value);

    match result {
        Some(record) => {
            if matches!(format, OutputFormat::Table) {
                print_warning(&format!(
                    "{}={} is anomalous: z={:+.2}, {:+.2}% vs baseline, severity {}, direction {}",
                    record.metric_name,
                    record.value,
                    record.z_score,
                    record.deviation_percent,
                    record.severity,
                    record.direction,
                ));
            } else {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }
        None => {
            if window_len < detector.config().min_data_points {
                print_info(&format!(
                    "not enough history for {} ({} of {} samples required)",
                    metric,
                    window_len,
                    detector.config().min_data_points,
                ));
            } else {
                print_success(&format!(
                    "{}={} is within normal range (threshold {})",
                    metric, value, threshold
                ));
            }
        }
    }

    Ok(())
}
