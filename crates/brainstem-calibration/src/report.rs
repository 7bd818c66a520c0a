//! Calibration report structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open probability range `[lower, upper)` covered by one bucket.
///
/// Displays as the percentage range, e.g. `60-65`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketRange {
    pub lower: f64,
    pub upper: f64,
}

impl BucketRange {
    /// Midpoint of the range, the x-coordinate used by the regression.
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// Percentage label, e.g. `60-65`.
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            (self.lower * 100.0).round() as u32,
            (self.upper * 100.0).round() as u32
        )
    }
}

impl std::fmt::Display for BucketRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-bucket calibration statistics.
///
/// Recomputed wholesale on every analysis run, never mutated incrementally.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationBucket {
    /// Probability range this bucket covers.
    pub range: BucketRange,

    /// Mean predicted probability of the records in the bucket.
    pub predicted_prob: f64,

    /// Fraction of records whose outcome occurred.
    pub actual_hit_rate: f64,

    /// Number of records in the bucket.
    pub sample_size: usize,

    /// `|predicted_prob - actual_hit_rate|`.
    pub deviation: f64,

    /// Realized profit over the bucket: payouts minus stakes.
    pub profit: f64,

    /// Profit relative to total stake (0 when nothing was staked).
    pub roi: f64,

    /// Calibration quality in [0, 1]: 1 at zero deviation, 0 at or beyond
    /// the deviation ceiling.
    pub barrier_score: f64,

    /// Set when the bucket has fewer samples than the configured minimum;
    /// its statistics are reported but should not be trusted.
    pub low_confidence: bool,
}

/// A full calibration report over one period.
///
/// One report exists per (scope, period); the next run supersedes it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Period the report covers, e.g. `2026-07` or `last_30d`.
    pub period: String,

    /// Populated buckets, ordered by range, non-overlapping.
    pub buckets: Vec<CalibrationBucket>,

    /// Calibration regression slope. 1 is perfect; >1 overconfident,
    /// <1 underconfident.
    pub slope: f64,

    /// Calibration regression intercept. 0 is perfect.
    pub intercept: f64,

    /// Weighted coefficient of determination of the regression.
    pub r_squared: f64,

    /// Sample-weighted mean squared calibration error across buckets.
    pub mse: f64,

    /// Sample-weighted mean absolute calibration error across buckets.
    pub mae: f64,

    /// Total profit across all records.
    pub total_profit: f64,

    /// Total profit relative to total stake, in percent.
    pub roi_percent: f64,

    /// Total records analyzed; equals the sum of bucket sample sizes.
    pub total_samples: usize,

    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
}

impl CalibrationReport {
    /// The bucket with the worst calibration (lowest barrier score),
    /// ignoring low-confidence buckets.
    pub fn worst_bucket(&self) -> Option<&CalibrationBucket> {
        self.buckets
            .iter()
            .filter(|b| !b.low_confidence)
            .min_by(|a, b| {
                a.barrier_score
                    .partial_cmp(&b.barrier_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_label_is_percentage() {
        let range = BucketRange {
            lower: 0.60,
            upper: 0.65,
        };
        assert_eq!(range.label(), "60-65");
        assert_eq!(range.to_string(), "60-65");
        assert!((range.midpoint() - 0.625).abs() < 1e-12);
    }

    #[test]
    fn worst_bucket_skips_low_confidence() {
        let mk = |barrier: f64, low_confidence: bool| CalibrationBucket {
            range: BucketRange {
                lower: 0.5,
                upper: 0.55,
            },
            predicted_prob: 0.52,
            actual_hit_rate: 0.5,
            sample_size: 10,
            deviation: 0.02,
            profit: 0.0,
            roi: 0.0,
            barrier_score: barrier,
            low_confidence,
        };

        let report = CalibrationReport {
            period: "test".into(),
            buckets: vec![mk(0.9, false), mk(0.1, true), mk(0.4, false)],
            slope: 1.0,
            intercept: 0.0,
            r_squared: 1.0,
            mse: 0.0,
            mae: 0.0,
            total_profit: 0.0,
            roi_percent: 0.0,
            total_samples: 30,
            generated_at: Utc::now(),
        };

        let worst = report.worst_bucket().unwrap();
        assert!((worst.barrier_score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn report_serialization_round_trip() {
        let report = CalibrationReport {
            period: "last_30d".into(),
            buckets: vec![],
            slope: 0.94,
            intercept: 0.03,
            r_squared: 0.88,
            mse: 0.004,
            mae: 0.05,
            total_profit: 1250.0,
            roi_percent: 4.2,
            total_samples: 320,
            generated_at: Utc::now(),
        };

        let json = serde_json::to_string(&report).unwrap();
        let restored: CalibrationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.period, "last_30d");
        assert_eq!(restored.total_samples, 320);
        assert!((restored.slope - 0.94).abs() < 1e-12);
    }
}
