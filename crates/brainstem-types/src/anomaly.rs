//! Anomaly records and their lifecycle.
//!
//! An anomaly is a metric sample whose deviation from its rolling baseline
//! exceeds a severity threshold. At most one anomaly per metric is active at
//! a time; later breaches update the active record in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::AnomalyId;

/// Severity of a detected anomaly.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    /// Noticeable deviation, worth a look.
    Low,
    /// Significant deviation, warrants investigation.
    Medium,
    /// Severe deviation, remediation candidates apply.
    High,
}

impl std::fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Lifecycle state of an anomaly record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyStatus {
    /// Deviation is ongoing.
    Active,
    /// Metric returned within threshold, or a healing action succeeded.
    Resolved,
}

impl std::fmt::Display for AnomalyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// A metric deviating from its rolling baseline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnomalyRecord {
    /// Unique identifier.
    pub id: AnomalyId,

    /// Metric that breached.
    pub metric_name: String,

    /// Baseline mean at detection time.
    pub baseline_value: f64,

    /// Observed value that triggered (or last refreshed) the anomaly.
    pub current_value: f64,

    /// Relative change against the baseline, in percent. Negative for drops.
    pub change_pct: f64,

    /// Severity classification.
    pub severity: AnomalySeverity,

    /// Lifecycle state.
    pub status: AnomalyStatus,

    /// When the anomaly was first detected.
    pub detected_at: DateTime<Utc>,

    /// When the anomaly was resolved, if it has been.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AnomalyRecord {
    /// Open a new active anomaly.
    pub fn open(
        metric_name: impl Into<String>,
        baseline_value: f64,
        current_value: f64,
        change_pct: f64,
        severity: AnomalySeverity,
    ) -> Self {
        Self {
            id: AnomalyId::generate(),
            metric_name: metric_name.into(),
            baseline_value,
            current_value,
            change_pct,
            severity,
            status: AnomalyStatus::Active,
            detected_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Whether the record is still active.
    pub fn is_active(&self) -> bool {
        self.status == AnomalyStatus::Active
    }

    /// Mark the record resolved as of now.
    pub fn resolve(&mut self) {
        self.status = AnomalyStatus::Resolved;
        self.resolved_at = Some(Utc::now());
    }
}

/// Filter for the anomaly listing on the reporting surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyFilter {
    /// Both active and resolved records.
    #[default]
    All,
    /// Only currently active records.
    Active,
    /// Only resolved records.
    Resolved,
}

impl AnomalyFilter {
    /// Whether a record passes this filter.
    pub fn matches(&self, record: &AnomalyRecord) -> bool {
        match self {
            Self::All => true,
            Self::Active => record.status == AnomalyStatus::Active,
            Self::Resolved => record.status == AnomalyStatus::Resolved,
        }
    }
}
