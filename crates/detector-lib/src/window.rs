//! Per-metric rolling sample windows
//!
//! Maintains a bounded FIFO buffer of recent raw samples for each metric
//! name. All live statistics driving detection come from these windows.

use std::collections::{BTreeMap, HashMap, VecDeque};

/// Statistics over the current contents of one window
#[derive(Debug, Clone, Copy)]
pub struct WindowStats {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

/// Bounded FIFO sample buffers, one per metric name.
///
/// Windows are created lazily on first sample and evict their oldest
/// entry once at capacity, so retained state is bounded by
/// `metrics x capacity`.
pub struct RollingWindowStore {
    capacity: usize,
    windows: HashMap<String, VecDeque<f64>>,
}

impl RollingWindowStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            windows: HashMap::new(),
        }
    }

    /// Append a sample, evicting the oldest entry if at capacity.
    pub fn add(&mut self, metric: &str, value: f64) {
        let window = self
            .windows
            .entry(metric.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));

        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(value);
    }

    /// Number of samples currently held for a metric (0 if unknown).
    pub fn len(&self, metric: &str) -> usize {
        self.windows.get(metric).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Number of distinct metrics with at least one sample.
    pub fn metric_count(&self) -> usize {
        self.windows.len()
    }

    /// Mean, standard deviation, and count over a metric's current window.
    ///
    /// Returns `None` when no samples exist for the metric. Uses the
    /// population standard deviation (divide by n), matching the values
    /// persisted in snapshots.
    pub fn stats(&self, metric: &str) -> Option<WindowStats> {
        let window = self.windows.get(metric)?;
        if window.is_empty() {
            return None;
        }

        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(WindowStats {
            mean,
            std: variance.sqrt(),
            count: window.len(),
        })
    }

    /// Seed a window from persisted history, keeping at most the last
    /// `capacity` values (older entries discarded).
    pub fn seed(&mut self, metric: &str, values: &[f64]) {
        let start = values.len().saturating_sub(self.capacity);
        let window = self
            .windows
            .entry(metric.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        window.clear();
        window.extend(values[start..].iter().copied());
    }

    /// All window contents in arrival order, keyed by metric name.
    pub fn history(&self) -> BTreeMap<String, Vec<f64>> {
        self.windows
            .iter()
            .map(|(metric, window)| (metric.clone(), window.iter().copied().collect()))
            .collect()
    }

    /// Ordered contents of one window, oldest first.
    pub fn values(&self, metric: &str) -> Option<Vec<f64>> {
        self.windows
            .get(metric)
            .map(|window| window.iter().copied().collect())
    }

    pub fn clear(&mut self) {
        self.windows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_unknown_metric() {
        let store = RollingWindowStore::new(10);
        assert!(store.stats("nope").is_none());
        assert_eq!(store.len("nope"), 0);
    }

    #[test]
    fn test_fifo_eviction_keeps_last_capacity_values() {
        let mut store = RollingWindowStore::new(5);
        for i in 0..12 {
            store.add("m", i as f64);
        }

        assert_eq!(store.len("m"), 5);
        assert_eq!(store.values("m").unwrap(), vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_stats_known_values() {
        let mut store = RollingWindowStore::new(10);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            store.add("m", v);
        }

        let stats = store.stats("m").unwrap();
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        // Population std of this classic sequence is exactly 2
        assert!((stats.std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_seed_truncates_to_capacity() {
        let mut store = RollingWindowStore::new(3);
        store.seed("m", &[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(store.values("m").unwrap(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_windows_are_independent() {
        let mut store = RollingWindowStore::new(4);
        store.add("a", 1.0);
        store.add("b", 100.0);
        store.add("a", 3.0);

        assert_eq!(store.len("a"), 2);
        assert_eq!(store.len("b"), 1);
        assert_eq!(store.metric_count(), 2);
        assert!((store.stats("a").unwrap().mean - 2.0).abs() < 1e-12);
        assert!((store.stats("b").unwrap().mean - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_history_round_trips_through_seed() {
        let mut store = RollingWindowStore::new(4);
        for v in [1.0, 2.0, 3.0] {
            store.add("m", v);
        }

        let history = store.history();
        let mut restored = RollingWindowStore::new(4);
        for (metric, values) in &history {
            restored.seed(metric, values);
        }

        assert_eq!(restored.values("m").unwrap(), vec![1.0, 2.0, 3.0]);
    }
}
