//! LLM Sentinel CLI
//!
//! Tooling around the anomaly detector's snapshot format: generate a
//! synthetic baseline so detection works from the first request, inspect
//! an existing snapshot, or test a metric value against one.

mod baseline_gen;
mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// LLM Sentinel baseline tooling
#[derive(Parser)]
#[command(name = "sentinel")]
#[command(author, version, about = "Baseline and snapshot tooling for the LLM anomaly detector", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a synthetic baseline snapshot
    Generate {
        /// Output file path
        #[arg(long, short, default_value = "data/baseline_metrics.json")]
        output: PathBuf,

        /// Number of data points per metric
        #[arg(long, short, default_value_t = 1000)]
        points: usize,

        /// Fraction of natural outliers to include
        #[arg(long, short, default_value_t = 0.05)]
        anomaly_rate: f64,

        /// Window size recorded in snapshot metadata
        #[arg(long, default_value_t = 100)]
        window_size: usize,

        /// Detection threshold recorded in snapshot metadata
        #[arg(long, default_value_t = 3.0)]
        threshold: f64,

        /// EWMA alpha recorded in snapshot metadata
        #[arg(long, default_value_t = 0.1)]
        ewma_alpha: f64,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Summarize the contents of a snapshot file
    Inspect {
        /// Snapshot file path
        path: PathBuf,
    },

    /// Test a metric value against a snapshot
    Check {
        /// Snapshot file path
        #[arg(long, short, default_value = "data/baseline_metrics.json")]
        snapshot: PathBuf,

        /// Metric name to test
        metric: String,

        /// Value to test
        value: f64,

        /// Z-score detection threshold
        #[arg(long, default_value_t = 3.0)]
        threshold: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            output,
            points,
            anomaly_rate,
            window_size,
            threshold,
            ewma_alpha,
            seed,
        } => commands::generate::run(
            &output,
            points,
            anomaly_rate,
            window_size,
            threshold,
            ewma_alpha,
            seed,
        ),
        Commands::Inspect { path } => commands::inspect::run(&path, cli.format),
        Commands::Check {
            snapshot,
            metric,
            value,
            threshold,
        } => commands::check::run(&snapshot, &metric, value, threshold, cli.format),
    }
}
