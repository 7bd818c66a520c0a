//! Runtime configuration.

use std::time::Duration;

use brainstem_anomaly::AnomalyConfig;
use brainstem_calibration::CalibrationConfig;
use brainstem_healing::HealingConfig;
use brainstem_health::HealthConfig;

/// Configuration for the whole control loop.
#[derive(Clone, Debug)]
pub struct BrainstemConfig {
    /// Interval of the control cycle (poll metrics, detect, heal).
    pub control_interval: Duration,

    /// Interval of the calibration cycle.
    pub calibration_interval: Duration,

    /// Interval of the health cycle.
    pub health_interval: Duration,

    /// Anomaly detector tuning.
    pub anomaly: AnomalyConfig,

    /// Healing orchestrator tuning.
    pub healing: HealingConfig,

    /// Health aggregator tuning.
    pub health: HealthConfig,

    /// Calibration analyzer tuning.
    pub calibration: CalibrationConfig,
}

impl Default for BrainstemConfig {
    fn default() -> Self {
        Self {
            control_interval: Duration::from_secs(10),
            calibration_interval: Duration::from_secs(300),
            health_interval: Duration::from_secs(30),
            anomaly: AnomalyConfig::default(),
            healing: HealingConfig::default(),
            health: HealthConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}
