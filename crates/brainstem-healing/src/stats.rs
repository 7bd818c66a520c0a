//! Per-(action, target) execution statistics.

use std::collections::VecDeque;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutable bookkeeping for one (action, target) pair.
///
/// The success rate is a simple ratio over the last `window` runs. Skipped
/// triggers never reach this type - only real executions are counted.
#[derive(Debug)]
pub(crate) struct ActionStats {
    /// Outcomes of the most recent runs, oldest first.
    recent: VecDeque<bool>,

    /// Rolling-window capacity.
    window: usize,

    /// Failures since the last success.
    pub consecutive_failures: u32,

    /// Set once the consecutive-failure ceiling is reached; cleared only by
    /// an operator reset.
    pub disabled: bool,

    /// Monotonic start time of the last run, for cooldown checks.
    pub last_started: Option<Instant>,

    /// Wall-clock start time of the last run, for reporting.
    pub last_run_at: Option<DateTime<Utc>>,

    /// Lifetime run count.
    pub total_runs: u64,
}

impl ActionStats {
    pub(crate) fn new(window: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(window),
            window,
            consecutive_failures: 0,
            disabled: false,
            last_started: None,
            last_run_at: None,
            total_runs: 0,
        }
    }

    /// Record the start of a run.
    pub(crate) fn mark_started(&mut self, at: DateTime<Utc>) {
        self.last_started = Some(Instant::now());
        self.last_run_at = Some(at);
    }

    /// Record a completed run. Returns true when this completion crossed
    /// the failure ceiling and disabled the pair.
    pub(crate) fn record(&mut self, success: bool, ceiling: u32) -> bool {
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(success);
        self.total_runs += 1;

        if success {
            self.consecutive_failures = 0;
            return false;
        }

        self.consecutive_failures += 1;
        if !self.disabled && self.consecutive_failures >= ceiling {
            self.disabled = true;
            return true;
        }
        false
    }

    /// Success ratio over the rolling window; `None` before the first run.
    pub(crate) fn success_rate(&self) -> Option<f64> {
        if self.recent.is_empty() {
            return None;
        }
        let successes = self.recent.iter().filter(|s| **s).count();
        Some(successes as f64 / self.recent.len() as f64)
    }

    /// Whether the cooldown since the last start has elapsed.
    pub(crate) fn cooldown_elapsed(&self, cooldown: std::time::Duration) -> bool {
        match self.last_started {
            Some(started) => started.elapsed() >= cooldown,
            None => true,
        }
    }

    /// Operator reset: clear the failure streak and re-enable.
    pub(crate) fn reset(&mut self) {
        self.consecutive_failures = 0;
        self.disabled = false;
    }
}

/// Read-only statistics snapshot for the reporting surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionStatsSnapshot {
    /// Action name.
    pub action_name: String,

    /// Target the statistics are scoped to.
    pub target: String,

    /// Success ratio over the rolling window; `None` before the first run.
    pub success_rate: Option<f64>,

    /// Failures since the last success.
    pub consecutive_failures: u32,

    /// Whether the pair is disabled pending an operator reset.
    pub disabled: bool,

    /// Lifetime run count.
    pub total_runs: u64,

    /// Wall-clock start of the most recent run.
    pub last_run_at: Option<DateTime<Utc>>,
}
