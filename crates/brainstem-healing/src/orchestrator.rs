//! The healing orchestrator.
//!
//! Matches anomalies to registered actions and executes them under the
//! safety bookkeeping: single flight per target, cooldown, failure ceiling.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use brainstem_types::{ActionRun, AnomalyRecord, CorrelationId};

use crate::action::{ActionExecutor, ActionRegistry, HealingAction};
use crate::error::{HealingError, HealingResult};
use crate::stats::{ActionStats, ActionStatsSnapshot};

/// Why a trigger was skipped without executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The action crossed its failure ceiling and awaits an operator reset.
    Disabled,
    /// Another run is in progress against the same target.
    InFlight,
    /// The cooldown since the last run has not elapsed.
    Cooldown,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::InFlight => write!(f, "in-flight"),
            Self::Cooldown => write!(f, "cooldown"),
        }
    }
}

/// Outcome of a trigger request.
///
/// Skips are deliberately distinct from failed runs: they carry no
/// `ActionRun` and leave the success-rate statistics untouched.
#[derive(Clone, Debug)]
pub enum TriggerOutcome {
    /// The action ran; the run record carries the result.
    Executed(ActionRun),
    /// A pre-check short-circuited the trigger.
    Skipped {
        action: String,
        target: String,
        reason: SkipReason,
    },
    /// No registered action matches the anomaly. Not an error: it means
    /// "no remediation available", and the anomaly stays active.
    NoActionMatched,
}

impl TriggerOutcome {
    /// The run record, when the action actually executed.
    pub fn run(&self) -> Option<&ActionRun> {
        match self {
            Self::Executed(run) => Some(run),
            _ => None,
        }
    }
}

/// Events emitted by the orchestrator.
#[derive(Clone, Debug)]
pub enum HealingEvent {
    /// Execution started.
    ActionStarted {
        action: String,
        target: String,
        correlation_id: CorrelationId,
    },

    /// Execution finished; the run record carries the result.
    ActionCompleted { run: ActionRun },

    /// A trigger was skipped by a pre-check.
    ActionSkipped {
        action: String,
        target: String,
        reason: SkipReason,
    },

    /// The failure ceiling was crossed; the pair is disabled.
    ActionDisabled { action: String, target: String },

    /// An operator reset re-enabled the pair.
    ActionReset { action: String, target: String },
}

/// Orchestrator configuration.
#[derive(Clone, Debug)]
pub struct HealingConfig {
    /// Rolling window (in runs) for the success ratio.
    pub success_window: usize,

    /// Maximum run records retained in history (memory bound).
    pub max_history: usize,
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            success_window: 20,
            max_history: 256,
        }
    }
}

/// Coordinates execution of healing actions with per-target single flight,
/// cooldowns, and failure-rate bookkeeping.
pub struct HealingOrchestrator {
    config: HealingConfig,

    /// Static action registry, read-only after startup.
    registry: Arc<ActionRegistry>,

    /// Rolling statistics per (action, target).
    stats: DashMap<(String, String), ActionStats>,

    /// In-flight marker per target. Entry present = run in progress.
    in_flight: DashMap<String, CorrelationId>,

    /// Append-only run history, newest last, bounded by `max_history`.
    history: RwLock<VecDeque<ActionRun>>,

    /// Event broadcaster.
    event_tx: broadcast::Sender<HealingEvent>,
}

impl HealingOrchestrator {
    /// Create an orchestrator over a loaded registry.
    pub fn new(config: HealingConfig, registry: Arc<ActionRegistry>) -> Self {
        let (event_tx, _) = broadcast::channel(1024);

        Self {
            config,
            registry,
            stats: DashMap::new(),
            in_flight: DashMap::new(),
            history: RwLock::new(VecDeque::new()),
            event_tx,
        }
    }

    /// Subscribe to healing events.
    pub fn subscribe(&self) -> broadcast::Receiver<HealingEvent> {
        self.event_tx.subscribe()
    }

    /// Trigger remediation for an anomaly.
    ///
    /// Returns [`TriggerOutcome::NoActionMatched`] when nothing in the
    /// registry applies - the caller treats that as "no remediation
    /// available", not as a fault.
    #[instrument(skip(self, anomaly), fields(metric = %anomaly.metric_name, severity = %anomaly.severity))]
    pub async fn trigger(&self, anomaly: &AnomalyRecord) -> HealingResult<TriggerOutcome> {
        let (action, executor) = match self.registry.find_match(anomaly) {
            Some(entry) => entry,
            None => {
                debug!("No healing action matches anomaly");
                return Ok(TriggerOutcome::NoActionMatched);
            }
        };

        let action = action.clone();
        let executor = executor.clone();
        let correlation_id = CorrelationId::from_anomaly(&anomaly.id);
        self.run_action(&action, &executor, correlation_id, false)
            .await
    }

    /// Manually trigger a named action against a target.
    ///
    /// Bypasses anomaly matching but enforces the same disabled/in-flight/
    /// cooldown checks. A disabled action surfaces as
    /// [`HealingError::ActionDisabled`] here, because the operator asked
    /// explicitly and must see the refusal.
    #[instrument(skip(self))]
    pub async fn trigger_by_name(
        &self,
        name: &str,
        target: &str,
    ) -> HealingResult<TriggerOutcome> {
        let (action, executor) = self
            .registry
            .get(name)
            .ok_or_else(|| HealingError::UnknownAction {
                name: name.to_string(),
            })?;

        let mut action = action.clone();
        action.target = target.to_string();
        let executor = executor.clone();
        self.run_action(&action, &executor, CorrelationId::generate(), true)
            .await
    }

    /// Run one action through the pre-checks and, if they pass, execute it
    /// under its timeout.
    async fn run_action(
        &self,
        action: &HealingAction,
        executor: &Arc<dyn ActionExecutor>,
        correlation_id: CorrelationId,
        manual: bool,
    ) -> HealingResult<TriggerOutcome> {
        let key = (action.name.clone(), action.target.clone());

        // (a) Disabled past the failure ceiling?
        {
            let stats = self
                .stats
                .entry(key.clone())
                .or_insert_with(|| ActionStats::new(self.config.success_window));
            if stats.disabled {
                if manual {
                    return Err(HealingError::ActionDisabled {
                        name: action.name.clone(),
                        target: action.target.clone(),
                        consecutive_failures: stats.consecutive_failures,
                    });
                }
                return Ok(self.skip(action, SkipReason::Disabled));
            }
        }

        // (b) Claim the per-target in-flight marker. The entry API gives a
        // compare-and-swap: whoever inserts first wins, everyone else skips.
        match self.in_flight.entry(action.target.clone()) {
            Entry::Occupied(_) => {
                return Ok(self.skip(action, SkipReason::InFlight));
            }
            Entry::Vacant(slot) => {
                slot.insert(correlation_id.clone());
            }
        }

        // (c) Cooldown elapsed since the last run against this target?
        let cooled = self
            .stats
            .get(&key)
            .map(|stats| stats.cooldown_elapsed(action.cooldown))
            .unwrap_or(true);
        if !cooled {
            self.in_flight.remove(&action.target);
            return Ok(self.skip(action, SkipReason::Cooldown));
        }

        let started_at = Utc::now();
        if let Some(mut stats) = self.stats.get_mut(&key) {
            stats.mark_started(started_at);
        }

        info!(
            action = %action.name,
            target = %action.target,
            correlation_id = %correlation_id,
            "Executing healing action"
        );
        let _ = self.event_tx.send(HealingEvent::ActionStarted {
            action: action.name.clone(),
            target: action.target.clone(),
            correlation_id: correlation_id.clone(),
        });

        // Execute under the action's deadline. On timeout the executor
        // future is dropped; the run is recorded as a failure either way,
        // exactly once.
        let start = Instant::now();
        let result = tokio::time::timeout(
            action.timeout,
            executor.execute(action, &correlation_id),
        )
        .await;
        let duration = start.elapsed();

        self.in_flight.remove(&action.target);

        let run = match result {
            Ok(Ok(())) => ActionRun::success(
                action.name.clone(),
                action.target.clone(),
                started_at,
                duration,
                correlation_id,
            ),
            Ok(Err(e)) => {
                warn!(action = %action.name, error = %e, "Healing action failed");
                ActionRun::failure(
                    action.name.clone(),
                    action.target.clone(),
                    started_at,
                    duration,
                    correlation_id,
                    e.to_string(),
                )
            }
            Err(_) => {
                warn!(
                    action = %action.name,
                    timeout_ms = action.timeout.as_millis() as u64,
                    "Healing action timed out"
                );
                ActionRun::failure(
                    action.name.clone(),
                    action.target.clone(),
                    started_at,
                    duration,
                    correlation_id,
                    format!("timed out after {}ms", action.timeout.as_millis()),
                )
            }
        };

        let crossed_ceiling = {
            let mut stats = self
                .stats
                .entry(key.clone())
                .or_insert_with(|| ActionStats::new(self.config.success_window));
            stats.record(run.succeeded(), action.max_consecutive_failures)
        };
        if crossed_ceiling {
            warn!(
                action = %action.name,
                target = %action.target,
                ceiling = action.max_consecutive_failures,
                "Action disabled after consecutive failures"
            );
            let _ = self.event_tx.send(HealingEvent::ActionDisabled {
                action: action.name.clone(),
                target: action.target.clone(),
            });
        }

        // The run is durably recorded before the outcome is handed back, so
        // downstream resolution can never race ahead of it.
        self.push_history(run.clone())?;
        let _ = self
            .event_tx
            .send(HealingEvent::ActionCompleted { run: run.clone() });

        Ok(TriggerOutcome::Executed(run))
    }

    fn skip(&self, action: &HealingAction, reason: SkipReason) -> TriggerOutcome {
        debug!(
            action = %action.name,
            target = %action.target,
            reason = %reason,
            "Skipping healing action"
        );
        let _ = self.event_tx.send(HealingEvent::ActionSkipped {
            action: action.name.clone(),
            target: action.target.clone(),
            reason,
        });
        TriggerOutcome::Skipped {
            action: action.name.clone(),
            target: action.target.clone(),
            reason,
        }
    }

    /// Re-enable a disabled (action, target) pair and clear its failure
    /// streak. Returns false when the pair has never run.
    pub fn reset(&self, name: &str, target: &str) -> bool {
        let key = (name.to_string(), target.to_string());
        match self.stats.get_mut(&key) {
            Some(mut stats) => {
                stats.reset();
                info!(action = name, target, "Action statistics reset");
                let _ = self.event_tx.send(HealingEvent::ActionReset {
                    action: name.to_string(),
                    target: target.to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Statistics snapshot for one (action, target) pair.
    pub fn stats(&self, name: &str, target: &str) -> Option<ActionStatsSnapshot> {
        let key = (name.to_string(), target.to_string());
        self.stats.get(&key).map(|stats| ActionStatsSnapshot {
            action_name: name.to_string(),
            target: target.to_string(),
            success_rate: stats.success_rate(),
            consecutive_failures: stats.consecutive_failures,
            disabled: stats.disabled,
            total_runs: stats.total_runs,
            last_run_at: stats.last_run_at,
        })
    }

    /// Statistics snapshots for every pair that has been triggered.
    pub fn all_stats(&self) -> Vec<ActionStatsSnapshot> {
        self.stats
            .iter()
            .map(|entry| {
                let (name, target) = entry.key();
                let stats = entry.value();
                ActionStatsSnapshot {
                    action_name: name.clone(),
                    target: target.clone(),
                    success_rate: stats.success_rate(),
                    consecutive_failures: stats.consecutive_failures,
                    disabled: stats.disabled,
                    total_runs: stats.total_runs,
                    last_run_at: stats.last_run_at,
                }
            })
            .collect()
    }

    /// Run history, oldest first.
    pub fn history(&self) -> HealingResult<Vec<ActionRun>> {
        let history = self.history.read().map_err(|_| HealingError::LockPoisoned)?;
        Ok(history.iter().cloned().collect())
    }

    /// Whether a run is currently in progress against the target.
    pub fn is_in_flight(&self, target: &str) -> bool {
        self.in_flight.contains_key(target)
    }

    fn push_history(&self, run: ActionRun) -> HealingResult<()> {
        let mut history = self.history.write().map_err(|_| HealingError::LockPoisoned)?;
        if history.len() == self.config.max_history {
            history.pop_front();
        }
        history.push_back(run);
        Ok(())
    }
}
