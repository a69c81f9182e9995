//! Summarize a snapshot file

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;

use detector_lib::persistence::load_snapshot;

use crate::output::{print_info, print_table, OutputFormat};

/// Row for the per-metric summary table
#[derive(Tabled, Serialize)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Std")]
    std: String,
}

pub fn run(path: &Path, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(path)
        .with_context(|| format!("no readable snapshot at {}", path.display()))?;

    let rows: Vec<MetricRow> = snapshot
        .baseline
        .iter()
        .map(|(metric, stat)| MetricRow {
            metric: metric.clone(),
            samples: snapshot.history.get(metric).map_or(0, Vec::len),
            mean: format!("{:.4}", stat.mean),
            std: format!("{:.4}", stat.std),
        })
        .collect();

    if matches!(format, OutputFormat::Table) {
        print_info(&format!(
            "Snapshot {} (updated {}, window_size={}, threshold={}, ewma_alpha={})",
            path.display(),
            snapshot.updated_at.to_rfc3339(),
            snapshot.metadata.window_size,
            snapshot.metadata.threshold,
            snapshot.metadata.ewma_alpha,
        ));
    }
    print_table(&rows, format);

    Ok(())
}
