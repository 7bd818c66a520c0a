//! Rolling baseline window over one metric.

use std::collections::VecDeque;

use brainstem_types::Baseline;

/// Bounded rolling window of recent values with running sums.
///
/// Mean and standard deviation are recomputed from the running sums on every
/// push, so reads are O(1).
#[derive(Clone, Debug)]
pub struct BaselineWindow {
    values: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    sum_sq: f64,
}

impl BaselineWindow {
    /// Create an empty window holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Fold a value into the window, evicting the oldest when full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            if let Some(evicted) = self.values.pop_front() {
                self.sum -= evicted;
                self.sum_sq -= evicted * evicted;
            }
        }
        self.values.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rolling mean, or `None` on an empty window.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    /// Rolling population standard deviation, or `None` on an empty window.
    pub fn stddev(&self) -> Option<f64> {
        let n = self.values.len() as f64;
        if self.values.is_empty() {
            return None;
        }
        let mean = self.sum / n;
        // Running sums can drift a hair negative on constant inputs.
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        Some(variance.sqrt())
    }

    /// Immutable snapshot for the reporting surface.
    pub fn snapshot(&self, metric_name: &str) -> Option<Baseline> {
        Some(Baseline {
            metric_name: metric_name.to_string(),
            mean: self.mean()?,
            stddev: self.stddev()?,
            window_len: self.values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_has_no_stats() {
        let window = BaselineWindow::new(10);
        assert!(window.is_empty());
        assert!(window.mean().is_none());
        assert!(window.stddev().is_none());
        assert!(window.snapshot("x").is_none());
    }

    #[test]
    fn mean_and_stddev() {
        let mut window = BaselineWindow::new(10);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            window.push(v);
        }
        assert!((window.mean().unwrap() - 5.0).abs() < 1e-12);
        assert!((window.stddev().unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn eviction_keeps_sums_consistent() {
        let mut window = BaselineWindow::new(3);
        for v in [100.0, 1.0, 2.0, 3.0] {
            window.push(v);
        }
        // The 100.0 has been evicted.
        assert_eq!(window.len(), 3);
        assert!((window.mean().unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn constant_input_has_zero_stddev() {
        let mut window = BaselineWindow::new(50);
        for _ in 0..50 {
            window.push(0.6);
        }
        assert!(window.stddev().unwrap().abs() < 1e-9);
    }

    #[test]
    fn snapshot_reflects_window() {
        let mut window = BaselineWindow::new(5);
        window.push(1.0);
        window.push(3.0);

        let snapshot = window.snapshot("latency").unwrap();
        assert_eq!(snapshot.metric_name, "latency");
        assert_eq!(snapshot.window_len, 2);
        assert!((snapshot.mean - 2.0).abs() < 1e-12);
    }
}
