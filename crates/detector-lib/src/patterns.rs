//! Multi-metric failure pattern correlation
//!
//! Matches a batch of concurrent anomalies against a registry of named
//! metric combinations (token/latency spikes, cost anomalies, and so on)
//! and ranks the candidates deterministically.

use serde::{Deserialize, Serialize};

use crate::models::{AnomalyRecord, Severity};

/// A named combination of metrics whose simultaneous anomalies indicate
/// a specific root-cause category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub name: String,
    /// Full set of metric names required for a high-confidence match
    pub metrics: Vec<String>,
    pub description: String,
}

impl PatternDefinition {
    pub fn new(name: &str, metrics: &[&str], description: &str) -> Self {
        Self {
            name: name.to_string(),
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

/// Match confidence for a pattern candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Some, but not all, of the pattern's metrics are anomalous
    Medium,
    /// Every metric the pattern requires is anomalous
    High,
}

/// One pattern that overlapped the anomalous metric set
#[derive(Debug, Clone, Serialize)]
pub struct PatternCandidate {
    pub pattern: String,
    pub description: String,
    pub matching_metrics: Vec<String>,
    pub confidence: Confidence,
}

/// Anomalous metric reference carried in a [`PatternMatch`]
#[derive(Debug, Clone, Serialize)]
pub struct CorrelatedAnomaly {
    pub metric_name: String,
    pub z_score: f64,
}

/// Result of correlating a batch of anomalies against the registry
#[derive(Debug, Clone, Serialize)]
pub struct PatternMatch {
    pub patterns_detected: usize,
    pub primary_pattern: Option<PatternCandidate>,
    pub all_candidates: Vec<PatternCandidate>,
    /// Worst severity among the input anomalies (SEV-3 when empty)
    pub total_severity: Severity,
    pub correlated_anomalies: Vec<CorrelatedAnomaly>,
}

/// Ordered, extensible registry of pattern definitions.
///
/// Declaration order matters: it is the deterministic tie-breaker when
/// candidates rank equally.
pub struct PatternRegistry {
    patterns: Vec<PatternDefinition>,
}

impl PatternRegistry {
    /// Empty registry with no patterns.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Registry preloaded with the canonical LLM failure patterns.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PatternDefinition::new(
            "high_token_latency_spike",
            &["llm.tokens.total", "llm.latency.ms"],
            "High token count causing increased latency",
        ));
        registry.register(PatternDefinition::new(
            "cost_anomaly",
            &["llm.cost.per_request", "llm.tokens.total"],
            "Unexpected cost increase",
        ));
        registry.register(PatternDefinition::new(
            "quality_degradation",
            &["llm.response.is_refusal", "llm.response.length"],
            "Increase in refusals or short responses",
        ));
        registry.register(PatternDefinition::new(
            "throughput_drop",
            &["llm.throughput.tokens_per_sec", "llm.latency.ms"],
            "Decrease in processing speed",
        ));
        registry.register(PatternDefinition::new(
            "context_exhaustion",
            &["llm.prompt.context_utilization", "llm.response.is_truncated"],
            "Context window being over-utilized",
        ));
        registry
    }

    pub fn register(&mut self, pattern: PatternDefinition) {
        self.patterns.push(pattern);
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.patterns.iter()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Correlates concurrent anomalies into known failure patterns
pub struct PatternCorrelator {
    registry: PatternRegistry,
}

impl PatternCorrelator {
    pub fn new(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Match a batch of anomalies against the registered patterns.
    ///
    /// A pattern whose required metrics are all anomalous ranks High; a
    /// partial overlap ranks Medium. Candidates sort by confidence, then
    /// overlap size, with registry declaration order breaking ties.
    pub fn correlate(&self, anomalies: &[AnomalyRecord]) -> PatternMatch {
        if anomalies.is_empty() {
            return PatternMatch {
                patterns_detected: 0,
                primary_pattern: None,
                all_candidates: Vec::new(),
                total_severity: Severity::Sev3,
                correlated_anomalies: Vec::new(),
            };
        }

        let present: Vec<&str> = anomalies.iter().map(|a| a.metric_name.as_str()).collect();

        let mut candidates: Vec<PatternCandidate> = Vec::new();
        for pattern in self.registry.iter() {
            let matching: Vec<String> = pattern
                .metrics
                .iter()
                .filter(|m| present.contains(&m.as_str()))
                .cloned()
                .collect();

            if matching.is_empty() {
                continue;
            }

            let confidence = if matching.len() == pattern.metrics.len() {
                Confidence::High
            } else {
                Confidence::Medium
            };

            candidates.push(PatternCandidate {
                pattern: pattern.name.clone(),
                description: pattern.description.clone(),
                matching_metrics: matching,
                confidence,
            });
        }

        // Stable sort keeps registry declaration order for equal ranks
        candidates.sort_by(|a, b| {
            let rank =
                |c: &PatternCandidate| (c.confidence == Confidence::High, c.matching_metrics.len());
            rank(b).cmp(&rank(a))
        });

        let total_severity = anomalies
            .iter()
            .map(|a| a.severity)
            .max()
            .unwrap_or(Severity::Sev3);

        PatternMatch {
            patterns_detected: candidates.len(),
            primary_pattern: candidates.first().cloned(),
            all_candidates: candidates,
            total_severity,
            correlated_anomalies: anomalies
                .iter()
                .map(|a| CorrelatedAnomaly {
                    metric_name: a.metric_name.clone(),
                    z_score: a.z_score,
                })
                .collect(),
        }
    }
}

impl Default for PatternCorrelator {
    fn default() -> Self {
        Self::new(PatternRegistry::with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::Utc;

    fn anomaly(metric: &str, z_score: f64, severity: Severity) -> AnomalyRecord {
        AnomalyRecord {
            metric_name: metric.to_string(),
            value: 1.0,
            z_score,
            deviation_percent: 10.0,
            severity,
            direction: Direction::High,
            baseline_mean: 0.5,
            baseline_std: 0.1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_input_has_no_pattern() {
        let correlator = PatternCorrelator::default();
        let result = correlator.correlate(&[]);

        assert!(result.primary_pattern.is_none());
        assert_eq!(result.patterns_detected, 0);
        assert!(result.correlated_anomalies.is_empty());
        assert_eq!(result.total_severity, Severity::Sev3);
    }

    #[test]
    fn test_full_match_is_high_confidence() {
        let correlator = PatternCorrelator::default();
        let anomalies = vec![
            anomaly("llm.cost.per_request", 4.2, Severity::Sev2),
            anomaly("llm.tokens.total", 3.5, Severity::Sev3),
        ];

        let result = correlator.correlate(&anomalies);
        let primary = result.primary_pattern.unwrap();

        assert_eq!(primary.pattern, "cost_anomaly");
        assert_eq!(primary.confidence, Confidence::High);
        assert_eq!(result.total_severity, Severity::Sev2);
    }

    #[test]
    fn test_partial_match_is_medium_confidence() {
        let correlator = PatternCorrelator::default();
        let anomalies = vec![anomaly("llm.cost.per_request", 3.2, Severity::Sev3)];

        let result = correlator.correlate(&anomalies);
        let primary = result.primary_pattern.unwrap();

        assert_eq!(primary.pattern, "cost_anomaly");
        assert_eq!(primary.confidence, Confidence::Medium);
        assert_eq!(primary.matching_metrics, vec!["llm.cost.per_request"]);
    }

    #[test]
    fn test_high_confidence_ranks_above_larger_medium_overlap() {
        let mut registry = PatternRegistry::new();
        registry.register(PatternDefinition::new(
            "wide_pattern",
            &["a", "b", "c", "d"],
            "partial overlap of a wide pattern",
        ));
        registry.register(PatternDefinition::new(
            "narrow_pattern",
            &["a", "b"],
            "fully matched narrow pattern",
        ));
        let correlator = PatternCorrelator::new(registry);

        let anomalies = vec![
            anomaly("a", 3.1, Severity::Sev3),
            anomaly("b", 3.3, Severity::Sev3),
            anomaly("c", 3.2, Severity::Sev3),
        ];

        let result = correlator.correlate(&anomalies);
        // wide_pattern overlaps 3 metrics but only narrow_pattern is complete
        assert_eq!(result.primary_pattern.unwrap().pattern, "narrow_pattern");
        assert_eq!(result.patterns_detected, 2);
    }

    #[test]
    fn test_ties_keep_registry_declaration_order() {
        let mut registry = PatternRegistry::new();
        registry.register(PatternDefinition::new("first", &["x", "y"], "first"));
        registry.register(PatternDefinition::new("second", &["x", "z"], "second"));
        let correlator = PatternCorrelator::new(registry);

        let anomalies = vec![
            anomaly("x", 3.1, Severity::Sev3),
            anomaly("y", 3.1, Severity::Sev3),
            anomaly("z", 3.1, Severity::Sev3),
        ];

        // Both patterns fully match with the same overlap size
        let result = correlator.correlate(&anomalies);
        assert_eq!(result.primary_pattern.unwrap().pattern, "first");
    }

    #[test]
    fn test_correlated_anomalies_mirror_input_order() {
        let correlator = PatternCorrelator::default();
        let anomalies = vec![
            anomaly("llm.latency.ms", 4.0, Severity::Sev2),
            anomaly("llm.tokens.total", -3.2, Severity::Sev3),
        ];

        let result = correlator.correlate(&anomalies);
        let names: Vec<&str> = result
            .correlated_anomalies
            .iter()
            .map(|c| c.metric_name.as_str())
            .collect();
        assert_eq!(names, vec!["llm.latency.ms", "llm.tokens.total"]);
        assert_eq!(result.correlated_anomalies[1].z_score, -3.2);
    }

    #[test]
    fn test_worst_severity_wins() {
        let correlator = PatternCorrelator::default();
        let anomalies = vec![
            anomaly("llm.latency.ms", 3.1, Severity::Sev3),
            anomaly("llm.tokens.total", 6.0, Severity::Sev1),
            anomaly("llm.cost.per_request", 4.1, Severity::Sev2),
        ];

        let result = correlator.correlate(&anomalies);
        assert_eq!(result.total_severity, Severity::Sev1);
    }
}
