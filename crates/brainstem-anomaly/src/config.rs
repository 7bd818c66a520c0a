//! Anomaly detector configuration.

use crate::error::{AnomalyError, AnomalyResult};

/// Severity thresholds on the absolute percentage change against baseline.
///
/// Thresholds are deployment configuration, not code: a metrics team that
/// considers a 40% swing critical sets `high = 40.0`.
#[derive(Clone, Copy, Debug)]
pub struct SeverityThresholds {
    /// At or above this |change %|, severity is at least low.
    pub low_pct: f64,
    /// At or above this |change %|, severity is at least medium.
    pub medium_pct: f64,
    /// At or above this |change %|, severity is high.
    pub high_pct: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            low_pct: 10.0,
            medium_pct: 25.0,
            high_pct: 50.0,
        }
    }
}

/// Tunable parameters for the anomaly detector.
#[derive(Clone, Debug)]
pub struct AnomalyConfig {
    /// Rolling window length per metric baseline, in samples.
    pub window: usize,

    /// Samples required before a baseline is trusted for breach evaluation.
    pub min_samples: usize,

    /// Severity classification thresholds.
    pub thresholds: SeverityThresholds,

    /// Maximum resolved anomalies retained in history (memory bound).
    pub max_history: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            window: 60,
            min_samples: 10,
            thresholds: SeverityThresholds::default(),
            max_history: 256,
        }
    }
}

impl AnomalyConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> AnomalyResult<()> {
        if self.window == 0 {
            return Err(AnomalyError::InvalidConfig("window must be > 0".into()));
        }
        if self.min_samples == 0 || self.min_samples > self.window {
            return Err(AnomalyError::InvalidConfig(format!(
                "min_samples must be in 1..={}, got {}",
                self.window, self.min_samples
            )));
        }
        let t = &self.thresholds;
        let ordered = 0.0 < t.low_pct && t.low_pct < t.medium_pct && t.medium_pct < t.high_pct;
        if !ordered || !t.low_pct.is_finite() || !t.medium_pct.is_finite() || !t.high_pct.is_finite()
        {
            return Err(AnomalyError::InvalidConfig(format!(
                "thresholds must satisfy 0 < low < medium < high, got {}/{}/{}",
                t.low_pct, t.medium_pct, t.high_pct
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        AnomalyConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let config = AnomalyConfig {
            thresholds: SeverityThresholds {
                low_pct: 30.0,
                medium_pct: 25.0,
                high_pct: 50.0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_min_samples_beyond_window() {
        let config = AnomalyConfig {
            window: 5,
            min_samples: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
