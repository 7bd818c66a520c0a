//! Healing action definitions, triggers, executors, and the registry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use brainstem_types::{AnomalyRecord, AnomalySeverity, CorrelationId};

use crate::error::{HealingError, HealingResult};

/// Predicate deciding whether an anomaly should trigger an action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionTrigger {
    /// Metric name the action remediates.
    pub metric_name: String,

    /// Minimum severity at which the action fires.
    pub min_severity: AnomalySeverity,
}

impl ActionTrigger {
    /// Create a trigger for a metric at or above a severity.
    pub fn new(metric_name: impl Into<String>, min_severity: AnomalySeverity) -> Self {
        Self {
            metric_name: metric_name.into(),
            min_severity,
        }
    }

    /// Whether the anomaly satisfies this trigger.
    pub fn matches(&self, anomaly: &AnomalyRecord) -> bool {
        anomaly.metric_name == self.metric_name && anomaly.severity >= self.min_severity
    }
}

/// A registered remediation action.
///
/// Registry entries are static: loaded once at process start, read-only
/// afterwards. Only the orchestrator's bookkeeping about them changes.
#[derive(Clone, Debug)]
pub struct HealingAction {
    /// Unique action name, e.g. `increase_database_pool_size`.
    pub name: String,

    /// Target the action operates on, e.g. `database`. The single-flight
    /// guard is keyed by this.
    pub target: String,

    /// When this action applies.
    pub trigger: ActionTrigger,

    /// Minimum wall-clock gap between runs against the same target.
    pub cooldown: Duration,

    /// Execution deadline; overrun is cancelled and recorded as failure.
    pub timeout: Duration,

    /// Consecutive-failure ceiling; reaching it disables the action until
    /// an operator reset.
    pub max_consecutive_failures: u32,
}

/// Executes the actual remediation work for an action.
///
/// Implementations may perform I/O (restart a worker, resize a pool, flush
/// a cache) and must be cancel-safe: the orchestrator drops the future on
/// timeout.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Run the action against its target.
    async fn execute(
        &self,
        action: &HealingAction,
        correlation_id: &CorrelationId,
    ) -> HealingResult<()>;
}

/// Executor that succeeds without doing anything. Useful in tests and as a
/// placeholder while wiring a deployment.
pub struct NoOpExecutor;

#[async_trait]
impl ActionExecutor for NoOpExecutor {
    async fn execute(
        &self,
        action: &HealingAction,
        correlation_id: &CorrelationId,
    ) -> HealingResult<()> {
        debug!(action = %action.name, correlation_id = %correlation_id, "No-op executing action");
        Ok(())
    }
}

/// Executor that always fails. Useful for exercising the failure ceiling.
pub struct FailingExecutor {
    reason: String,
}

impl FailingExecutor {
    /// Create a failing executor with the given failure reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ActionExecutor for FailingExecutor {
    async fn execute(
        &self,
        _action: &HealingAction,
        _correlation_id: &CorrelationId,
    ) -> HealingResult<()> {
        Err(HealingError::ExecutionFailed {
            reason: self.reason.clone(),
        })
    }
}

/// The static action registry: action definitions plus their executors.
///
/// Populated at startup, then shared read-only behind an `Arc` - concurrent
/// readers need no synchronization.
#[derive(Default)]
pub struct ActionRegistry {
    entries: Vec<(HealingAction, Arc<dyn ActionExecutor>)>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register an action with its executor.
    pub fn register(&mut self, action: HealingAction, executor: Arc<dyn ActionExecutor>) {
        self.entries.push((action, executor));
    }

    /// First registered action whose trigger matches the anomaly.
    pub fn find_match(
        &self,
        anomaly: &AnomalyRecord,
    ) -> Option<(&HealingAction, &Arc<dyn ActionExecutor>)> {
        self.entries
            .iter()
            .find(|(action, _)| action.trigger.matches(anomaly))
            .map(|(action, executor)| (action, executor))
    }

    /// Look up an action by name.
    pub fn get(&self, name: &str) -> Option<(&HealingAction, &Arc<dyn ActionExecutor>)> {
        self.entries
            .iter()
            .find(|(action, _)| action.name == name)
            .map(|(action, executor)| (action, executor))
    }

    /// Registered action definitions.
    pub fn actions(&self) -> impl Iterator<Item = &HealingAction> {
        self.entries.iter().map(|(action, _)| action)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
