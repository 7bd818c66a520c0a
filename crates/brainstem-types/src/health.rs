//! Component health check results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health status of a single component, or of the whole service.
///
/// The derived `Ord` is the worst-of ordering used for aggregation:
/// `Error > Critical > Warning > Healthy`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Operating normally.
    Healthy,
    /// Degraded but functional.
    Warning,
    /// Severely degraded.
    Critical,
    /// Probe failed or timed out; no reading available.
    Error,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outcome of one health probe.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Component the probe examined.
    pub component: String,

    /// Status classification.
    pub status: HealthStatus,

    /// Normalized health score in [0, 1].
    pub score: f64,

    /// How long the probe took.
    pub response_time: Duration,

    /// Optional detail, mostly set on degraded or failed probes.
    pub message: Option<String>,

    /// When the probe completed.
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    /// Create a result with an explicit status and score.
    pub fn new(
        component: impl Into<String>,
        status: HealthStatus,
        score: f64,
        response_time: Duration,
    ) -> Self {
        Self {
            component: component.into(),
            status,
            score: score.clamp(0.0, 1.0),
            response_time,
            message: None,
            checked_at: Utc::now(),
        }
    }

    /// Attach a detail message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Synthetic result for a probe that errored or timed out.
    ///
    /// Score is zero: an unreadable component contributes nothing to the
    /// weighted mean and forces the worst-of status to `Error`.
    pub fn probe_error(
        component: impl Into<String>,
        message: impl Into<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Error,
            score: 0.0,
            response_time,
            message: Some(message.into()),
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_worst_of_ordering() {
        assert!(HealthStatus::Healthy < HealthStatus::Warning);
        assert!(HealthStatus::Warning < HealthStatus::Critical);
        assert!(HealthStatus::Critical < HealthStatus::Error);

        let statuses = [
            HealthStatus::Healthy,
            HealthStatus::Error,
            HealthStatus::Warning,
        ];
        assert_eq!(statuses.iter().max(), Some(&HealthStatus::Error));
    }

    #[test]
    fn score_is_clamped() {
        let result =
            HealthCheckResult::new("api", HealthStatus::Healthy, 1.7, Duration::from_millis(3));
        assert_eq!(result.score, 1.0);

        let result =
            HealthCheckResult::new("api", HealthStatus::Critical, -0.2, Duration::from_millis(3));
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn probe_error_is_zero_scored() {
        let result = HealthCheckResult::probe_error("cache", "timeout", Duration::from_secs(5));
        assert_eq!(result.status, HealthStatus::Error);
        assert_eq!(result.score, 0.0);
        assert!(result.message.is_some());
    }
}
