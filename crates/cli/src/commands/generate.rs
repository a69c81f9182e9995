//! Generate a synthetic baseline snapshot

use std::path::Path;

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::baseline_gen::BaselineGenerator;
use crate::output::{print_info, print_success};

#[allow(clippy::too_many_arguments)]
pub fn run(
    output: &Path,
    points: usize,
    anomaly_rate: f64,
    window_size: usize,
    threshold: f64,
    ewma_alpha: f64,
    seed: Option<u64>,
) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&anomaly_rate),
        "anomaly rate must be in [0, 1], got {anomaly_rate}"
    );

    let generator = BaselineGenerator {
        num_points: points,
        anomaly_rate,
        window_size,
        threshold,
        ewma_alpha,
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let snapshot = generator.generate(&mut rng);
    detector_lib::persistence::save_snapshot(&snapshot, output)?;

    print_success(&format!(
        "Generated baseline data for {} metrics",
        snapshot.baseline.len()
    ));
    print_info(&format!("Saved to: {}", output.display()));
    print_info(&format!(
        "{} data points per metric, {:.1}% outlier rate",
        points,
        anomaly_rate * 100.0
    ));

    Ok(())
}
