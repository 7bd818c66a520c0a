//! Calibration analyzer configuration.

use crate::error::{CalibrationError, CalibrationResult};

/// Tunable parameters for the calibration analysis.
#[derive(Clone, Debug)]
pub struct CalibrationConfig {
    /// Width of each probability bucket. 0.05 gives the "50-55", "55-60"
    /// five-point ranges.
    pub bucket_width: f64,

    /// Buckets with fewer records than this are retained but flagged
    /// low-confidence, so report consumers can see coverage gaps.
    pub min_bucket_samples: usize,

    /// Total-record floor below which `analyze` fails with
    /// `InsufficientData` instead of producing a report.
    pub min_total_samples: usize,

    /// Deviation at which a bucket's barrier score bottoms out at zero.
    pub deviation_ceiling: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            bucket_width: 0.05,
            min_bucket_samples: 5,
            min_total_samples: 20,
            deviation_ceiling: 0.25,
        }
    }
}

impl CalibrationConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> CalibrationResult<()> {
        if !self.bucket_width.is_finite() || self.bucket_width <= 0.0 || self.bucket_width > 0.5 {
            return Err(CalibrationError::InvalidConfig(format!(
                "bucket_width must be in (0, 0.5], got {}",
                self.bucket_width
            )));
        }
        if !self.deviation_ceiling.is_finite() || self.deviation_ceiling <= 0.0 {
            return Err(CalibrationError::InvalidConfig(format!(
                "deviation_ceiling must be positive, got {}",
                self.deviation_ceiling
            )));
        }
        Ok(())
    }

    /// Number of buckets covering [0, 1].
    pub fn bucket_count(&self) -> usize {
        (1.0 / self.bucket_width).ceil() as usize
    }
}
