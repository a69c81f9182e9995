//! Core data models for the anomaly detector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anomaly severity tiers derived from z-score magnitude.
///
/// Variant order gives `Sev3 < Sev2 < Sev1`, so `max()` over a batch
/// yields the most severe tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "SEV-3")]
    Sev3,
    #[serde(rename = "SEV-2")]
    Sev2,
    #[serde(rename = "SEV-1")]
    Sev1,
}

impl Severity {
    /// Classify severity from z-score magnitude.
    ///
    /// Tier boundaries: `|z| >= 5.0` is SEV-1, `|z| >= 4.0` is SEV-2,
    /// anything else that crossed the detection threshold is SEV-3.
    pub fn from_z_score(abs_z_score: f64) -> Self {
        if abs_z_score >= 5.0 {
            Severity::Sev1
        } else if abs_z_score >= 4.0 {
            Severity::Sev2
        } else {
            Severity::Sev3
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Sev1 => write!(f, "SEV-1"),
            Severity::Sev2 => write!(f, "SEV-2"),
            Severity::Sev3 => write!(f, "SEV-3"),
        }
    }
}

/// Direction of an anomalous deviation relative to the window mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    High,
    Low,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::High => write!(f, "high"),
            Direction::Low => write!(f, "low"),
        }
    }
}

/// EWMA-smoothed baseline statistics for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStat {
    pub mean: f64,
    pub std: f64,
}

/// A single detected anomaly.
///
/// Field names and types are the contract relied on by downstream
/// incident-creation and root-cause collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub metric_name: String,
    pub value: f64,
    pub z_score: f64,
    pub deviation_percent: f64,
    pub severity: Severity,
    pub direction: Direction,
    pub baseline_mean: f64,
    pub baseline_std: f64,
    pub timestamp: DateTime<Utc>,
}

/// Counters and sizing information for one detector instance
#[derive(Debug, Clone, Serialize)]
pub struct DetectorStats {
    pub total_datapoints: u64,
    pub anomalies_detected: u64,
    pub metrics_tracked: usize,
    pub baseline_metrics: usize,
    pub window_size: usize,
    pub threshold: f64,
    pub recent_anomalies: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_tier_boundaries() {
        assert_eq!(Severity::from_z_score(3.0), Severity::Sev3);
        assert_eq!(Severity::from_z_score(3.99), Severity::Sev3);
        assert_eq!(Severity::from_z_score(4.0), Severity::Sev2);
        assert_eq!(Severity::from_z_score(4.99), Severity::Sev2);
        assert_eq!(Severity::from_z_score(5.0), Severity::Sev1);
        assert_eq!(Severity::from_z_score(12.0), Severity::Sev1);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Sev1 > Severity::Sev2);
        assert!(Severity::Sev2 > Severity::Sev3);
        assert_eq!(
            [Severity::Sev3, Severity::Sev1, Severity::Sev2]
                .into_iter()
                .max(),
            Some(Severity::Sev1)
        );
    }

    #[test]
    fn test_severity_wire_format() {
        let json = serde_json::to_string(&Severity::Sev1).unwrap();
        assert_eq!(json, "\"SEV-1\"");
        let parsed: Severity = serde_json::from_str("\"SEV-2\"").unwrap();
        assert_eq!(parsed, Severity::Sev2);
    }

    #[test]
    fn test_direction_wire_format() {
        assert_eq!(serde_json::to_string(&Direction::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Direction::Low).unwrap(), "\"low\"");
    }
}
