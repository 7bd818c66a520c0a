//! Healing action run records.
//!
//! An `ActionRun` is the append-only record of one execution of a registered
//! healing action. Skipped triggers (cooldown, in-flight, disabled) produce
//! no run record at all, so the success-rate statistics only ever see real
//! executions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ids::CorrelationId;

/// Terminal result of an action execution.
///
/// Timeouts and cancellations are failures; there is no third state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionResult {
    /// Executor returned without error inside the timeout.
    Success,
    /// Executor returned an error, or the timeout elapsed.
    Failure,
}

impl std::fmt::Display for ActionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// One execution of a healing action against a target.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionRun {
    /// Registered action name.
    pub action_name: String,

    /// Target the action ran against.
    pub target: String,

    /// When execution started.
    pub started_at: DateTime<Utc>,

    /// How long execution took (capped by the action timeout).
    pub duration: Duration,

    /// Terminal result.
    pub result: ActionResult,

    /// Correlates the run with its triggering anomaly or operator request.
    pub correlation_id: CorrelationId,

    /// Failure detail, when there is one.
    pub message: Option<String>,
}

impl ActionRun {
    /// Record a successful execution.
    pub fn success(
        action_name: impl Into<String>,
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        duration: Duration,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            action_name: action_name.into(),
            target: target.into(),
            started_at,
            duration,
            result: ActionResult::Success,
            correlation_id,
            message: None,
        }
    }

    /// Record a failed execution.
    pub fn failure(
        action_name: impl Into<String>,
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        duration: Duration,
        correlation_id: CorrelationId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action_name: action_name.into(),
            target: target.into(),
            started_at,
            duration,
            result: ActionResult::Failure,
            correlation_id,
            message: Some(message.into()),
        }
    }

    /// Whether the run succeeded.
    pub fn succeeded(&self) -> bool {
        self.result == ActionResult::Success
    }
}
