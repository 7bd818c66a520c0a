//! The calibration analyzer.
//!
//! Buckets settled records by predicted probability, computes per-bucket
//! hit-rate/profit statistics, and fits a sample-weighted least-squares
//! regression of realized hit rate on predicted probability across the
//! bucket midpoints.

use tracing::{debug, instrument};

use crate::config::CalibrationConfig;
use crate::error::{CalibrationError, CalibrationResult};
use crate::record::OutcomeRecord;
use crate::report::{BucketRange, CalibrationBucket, CalibrationReport};

/// Stateless calibration analyzer.
///
/// `analyze` is pure with respect to its input collection: no side effects,
/// safe to re-run at any time.
pub struct CalibrationAnalyzer {
    config: CalibrationConfig,
}

/// Per-bucket accumulator used during a single pass over the records.
#[derive(Clone, Copy, Default)]
struct BucketAccum {
    samples: usize,
    wins: usize,
    predicted_sum: f64,
    stake_sum: f64,
    payout_sum: f64,
}

impl CalibrationAnalyzer {
    /// Create an analyzer with the given configuration.
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Analyze a collection of settled records into a calibration report.
    ///
    /// Fails with [`CalibrationError::InsufficientData`] when there are too
    /// few records for the statistics to mean anything, and with
    /// [`CalibrationError::InvalidRecord`] when the settlement feed handed
    /// us garbage.
    #[instrument(skip_all, fields(period = %period.as_ref(), records = records.len()))]
    pub fn analyze(
        &self,
        period: impl AsRef<str>,
        records: &[OutcomeRecord],
    ) -> CalibrationResult<CalibrationReport> {
        self.config.validate()?;

        for (index, record) in records.iter().enumerate() {
            if let Some(reason) = record.validation_error() {
                return Err(CalibrationError::InvalidRecord { index, reason });
            }
        }

        if records.len() < self.config.min_total_samples {
            return Err(CalibrationError::InsufficientData {
                got: records.len(),
                need: self.config.min_total_samples,
            });
        }

        let bucket_count = self.config.bucket_count();
        let width = self.config.bucket_width;
        let mut accums = vec![BucketAccum::default(); bucket_count];

        let mut total_stake = 0.0;
        let mut total_payout = 0.0;

        for record in records {
            // predicted_prob == 1.0 lands in the top bucket.
            let idx = ((record.predicted_prob / width) as usize).min(bucket_count - 1);
            let accum = &mut accums[idx];
            accum.samples += 1;
            if record.outcome {
                accum.wins += 1;
            }
            accum.predicted_sum += record.predicted_prob;
            accum.stake_sum += record.stake;
            accum.payout_sum += record.payout;

            total_stake += record.stake;
            total_payout += record.payout;
        }

        let buckets: Vec<CalibrationBucket> = accums
            .iter()
            .enumerate()
            .filter(|(_, a)| a.samples > 0)
            .map(|(i, a)| self.build_bucket(i, a))
            .collect();

        let (slope, intercept, r_squared) = weighted_regression(&buckets);
        let (mse, mae) = weighted_calibration_error(&buckets);

        let total_profit = total_payout - total_stake;
        let roi_percent = if total_stake > 0.0 {
            total_profit / total_stake * 100.0
        } else {
            0.0
        };

        debug!(
            buckets = buckets.len(),
            slope, intercept, r_squared, "Calibration analysis complete"
        );

        Ok(CalibrationReport {
            period: period.as_ref().to_string(),
            buckets,
            slope,
            intercept,
            r_squared,
            mse,
            mae,
            total_profit,
            roi_percent,
            total_samples: records.len(),
            generated_at: chrono::Utc::now(),
        })
    }

    fn build_bucket(&self, index: usize, accum: &BucketAccum) -> CalibrationBucket {
        let width = self.config.bucket_width;
        let range = BucketRange {
            lower: index as f64 * width,
            upper: ((index + 1) as f64 * width).min(1.0),
        };

        let n = accum.samples as f64;
        let predicted_prob = accum.predicted_sum / n;
        let actual_hit_rate = accum.wins as f64 / n;
        let deviation = (predicted_prob - actual_hit_rate).abs();
        let profit = accum.payout_sum - accum.stake_sum;
        let roi = if accum.stake_sum > 0.0 {
            profit / accum.stake_sum
        } else {
            0.0
        };
        let barrier_score = 1.0 - (deviation / self.config.deviation_ceiling).min(1.0);

        CalibrationBucket {
            range,
            predicted_prob,
            actual_hit_rate,
            sample_size: accum.samples,
            deviation,
            profit,
            roi,
            barrier_score,
            low_confidence: accum.samples < self.config.min_bucket_samples,
        }
    }
}

/// Sample-weighted ordinary least squares of `actual_hit_rate` on the bucket
/// midpoints. Returns `(slope, intercept, r_squared)`.
///
/// Degenerate inputs (no buckets, or all weight at a single x) yield a flat
/// fit of `(0, weighted mean, 0)` rather than NaN.
fn weighted_regression(buckets: &[CalibrationBucket]) -> (f64, f64, f64) {
    const EPS: f64 = 1e-12;

    let weight_total: f64 = buckets.iter().map(|b| b.sample_size as f64).sum();
    if weight_total < EPS {
        return (0.0, 0.0, 0.0);
    }

    let x_mean = buckets
        .iter()
        .map(|b| b.sample_size as f64 * b.range.midpoint())
        .sum::<f64>()
        / weight_total;
    let y_mean = buckets
        .iter()
        .map(|b| b.sample_size as f64 * b.actual_hit_rate)
        .sum::<f64>()
        / weight_total;

    let mut s_xx = 0.0;
    let mut s_xy = 0.0;
    for bucket in buckets {
        let w = bucket.sample_size as f64;
        let dx = bucket.range.midpoint() - x_mean;
        let dy = bucket.actual_hit_rate - y_mean;
        s_xx += w * dx * dx;
        s_xy += w * dx * dy;
    }

    if s_xx < EPS {
        return (0.0, y_mean, 0.0);
    }

    let slope = s_xy / s_xx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for bucket in buckets {
        let w = bucket.sample_size as f64;
        let fitted = intercept + slope * bucket.range.midpoint();
        ss_res += w * (bucket.actual_hit_rate - fitted).powi(2);
        ss_tot += w * (bucket.actual_hit_rate - y_mean).powi(2);
    }

    let r_squared = if ss_tot < EPS {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).max(0.0)
    };

    (slope, intercept, r_squared)
}

/// Sample-weighted MSE and MAE of realized hit rate against the bucket mean
/// prediction - the calibration error, not the regression residual.
fn weighted_calibration_error(buckets: &[CalibrationBucket]) -> (f64, f64) {
    let weight_total: f64 = buckets.iter().map(|b| b.sample_size as f64).sum();
    if weight_total <= 0.0 {
        return (0.0, 0.0);
    }

    let mut mse = 0.0;
    let mut mae = 0.0;
    for bucket in buckets {
        let w = bucket.sample_size as f64;
        let err = bucket.actual_hit_rate - bucket.predicted_prob;
        mse += w * err * err;
        mae += w * err.abs();
    }

    (mse / weight_total, mae / weight_total)
}
