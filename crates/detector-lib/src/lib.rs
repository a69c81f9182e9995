//! Streaming anomaly detection for LLM observability metrics
//!
//! This crate provides the core functionality for:
//! - Rolling-window statistics per metric stream
//! - EWMA baseline tracking
//! - Z-score anomaly detection with severity classification
//! - Multi-metric failure pattern correlation
//! - Snapshot persistence for warm restarts

pub mod baseline;
pub mod config;
pub mod detector;
pub mod models;
pub mod patterns;
pub mod persistence;
pub mod window;

pub use config::{ConfigError, DetectorConfig};
pub use detector::AnomalyDetector;
pub use models::{AnomalyRecord, BaselineStat, DetectorStats, Direction, Severity};
pub use patterns::{
    Confidence, CorrelatedAnomaly, PatternCandidate, PatternCorrelator, PatternDefinition,
    PatternMatch, PatternRegistry,
};
pub use persistence::{Snapshot, SnapshotMetadata};
pub use window::{RollingWindowStore, WindowStats};
