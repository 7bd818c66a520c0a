//! Metric samples and baselines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped measurement from the metric feed.
///
/// Samples are produced externally (push or pull, the shape is what matters)
/// and are immutable once ingested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Name of the metric, e.g. `hit_rate` or `response_time_ms`.
    pub metric_name: String,

    /// Measured value.
    pub value: f64,

    /// When the measurement was taken (RFC3339 on the wire).
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    /// Create a sample timestamped now.
    pub fn new(metric_name: impl Into<String>, value: f64) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            timestamp: Utc::now(),
        }
    }

    /// Create a sample with an explicit timestamp.
    pub fn at(metric_name: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            timestamp,
        }
    }
}

/// Snapshot of the rolling baseline for one metric.
///
/// Owned and recomputed by the anomaly detector; everyone else sees an
/// immutable copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Metric this baseline describes.
    pub metric_name: String,

    /// Rolling mean over the window.
    pub mean: f64,

    /// Rolling standard deviation over the window.
    pub stddev: f64,

    /// Number of samples currently in the window.
    pub window_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_serialization_round_trip() {
        let sample = MetricSample::new("hit_rate", 0.62);
        let json = serde_json::to_string(&sample).unwrap();
        let restored: MetricSample = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sample);
    }

    #[test]
    fn sample_timestamp_is_rfc3339() {
        let sample = MetricSample::new("error_rate", 0.01);
        let json = serde_json::to_value(&sample).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }
}
