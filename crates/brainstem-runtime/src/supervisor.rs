//! The control-loop supervisor.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use brainstem_anomaly::{AnomalyDetector, Detection};
use brainstem_calibration::{CalibrationAnalyzer, CalibrationError, CalibrationReport};
use brainstem_healing::{
    ActionRegistry, ActionStatsSnapshot, HealingEvent, HealingOrchestrator, TriggerOutcome,
};
use brainstem_health::{HealthAggregator, HealthProbe, HealthSnapshot};
use brainstem_types::{ActionRun, AnomalyFilter, AnomalyRecord, Baseline};

use crate::config::BrainstemConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::reports::ReportStore;
use crate::sources::{MetricSource, OutcomeBatch, OutcomeSource};

/// Owns the four control-loop components and drives them on their
/// schedules.
///
/// Created at process start, torn down at shutdown; all collaborators are
/// injected - there are no globals. The periodic cycles are independent
/// tokio tasks; a fault in one cycle degrades that cycle's report and is
/// logged, never propagated out of the loop.
pub struct Brainstem {
    config: BrainstemConfig,
    detector: Arc<AnomalyDetector>,
    orchestrator: Arc<HealingOrchestrator>,
    aggregator: Arc<HealthAggregator>,
    analyzer: Arc<CalibrationAnalyzer>,
    metrics: Arc<dyn MetricSource>,
    outcomes: Arc<dyn OutcomeSource>,
    reports: Arc<ReportStore>,

    /// Handles of the spawned cycle tasks, keyed by cycle name.
    tasks: DashMap<String, JoinHandle<()>>,
}

impl Brainstem {
    /// Wire up the control loop from configuration and collaborators.
    pub fn new(
        config: BrainstemConfig,
        registry: Arc<ActionRegistry>,
        probes: Vec<Arc<dyn HealthProbe>>,
        metrics: Arc<dyn MetricSource>,
        outcomes: Arc<dyn OutcomeSource>,
    ) -> Self {
        let detector = Arc::new(AnomalyDetector::new(config.anomaly.clone()));
        let orchestrator = Arc::new(HealingOrchestrator::new(config.healing.clone(), registry));

        let mut aggregator = HealthAggregator::new(config.health.clone());
        for probe in probes {
            aggregator.add_probe(probe);
        }

        let analyzer = Arc::new(CalibrationAnalyzer::new(config.calibration.clone()));

        Self {
            config,
            detector,
            orchestrator,
            aggregator: Arc::new(aggregator),
            analyzer,
            metrics,
            outcomes,
            reports: Arc::new(ReportStore::new()),
            tasks: DashMap::new(),
        }
    }

    /// Spawn the periodic cycle tasks. Callers keep their own `Arc` handle
    /// for the reporting surface: `brainstem.clone().start()`.
    pub fn start(self: Arc<Self>) {
        info!(
            control_interval_ms = self.config.control_interval.as_millis() as u64,
            calibration_interval_ms = self.config.calibration_interval.as_millis() as u64,
            health_interval_ms = self.config.health_interval.as_millis() as u64,
            "Starting brainstem control loop"
        );

        let control = self.clone();
        self.tasks.insert(
            "control".to_string(),
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(control.config.control_interval);
                loop {
                    interval.tick().await;
                    if let Err(e) = control.control_cycle().await {
                        warn!(error = %e, "Control cycle failed");
                    }
                }
            }),
        );

        let calibration = self.clone();
        self.tasks.insert(
            "calibration".to_string(),
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(calibration.config.calibration_interval);
                loop {
                    interval.tick().await;
                    if let Err(e) = calibration.calibration_cycle().await {
                        warn!(error = %e, "Calibration cycle failed");
                    }
                }
            }),
        );

        let health = self.clone();
        self.tasks.insert(
            "health".to_string(),
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(health.config.health_interval);
                loop {
                    interval.tick().await;
                    if let Err(e) = health.health_cycle().await {
                        warn!(error = %e, "Health cycle failed");
                    }
                }
            }),
        );
    }

    /// Abort the cycle tasks.
    pub fn shutdown(&self) {
        info!("Stopping brainstem control loop");
        for task in self.tasks.iter() {
            task.value().abort();
        }
        self.tasks.clear();
    }

    /// One pass of the control cycle: drain the metric feed, detect, heal,
    /// and fast-path-resolve anomalies whose remediation succeeded.
    #[instrument(skip(self))]
    pub async fn control_cycle(&self) -> RuntimeResult<()> {
        let samples = self.metrics.poll().await?;
        debug!(samples = samples.len(), "Control cycle polled metric feed");

        for sample in &samples {
            let detection = self.detector.observe(sample)?;
            let record = match detection {
                Detection::Opened(record) | Detection::Refreshed(record) => record,
                _ => continue,
            };

            let outcome = self.orchestrator.trigger(&record).await?;
            match &outcome {
                TriggerOutcome::Executed(run) if run.succeeded() => {
                    // The run record is durable by the time trigger returns,
                    // so resolution cannot race ahead of it.
                    self.detector.resolve_for_metric(&record.metric_name)?;
                }
                TriggerOutcome::NoActionMatched => {
                    debug!(
                        metric = %record.metric_name,
                        "No remediation available; anomaly stays active"
                    );
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// One pass of the calibration cycle: fetch settled batches, analyze
    /// each off the scheduler thread, publish the reports.
    ///
    /// A batch below the sample floor keeps the previous report in place
    /// and is logged, not failed - the floor is an expected condition early
    /// in a period.
    #[instrument(skip(self))]
    pub async fn calibration_cycle(&self) -> RuntimeResult<()> {
        let batches = self.outcomes.fetch().await?;

        for batch in batches {
            let OutcomeBatch {
                scope,
                period,
                records,
            } = batch;

            // The analysis is CPU-bound over a potentially large record
            // set; keep it off the async scheduler.
            let analyzer = self.analyzer.clone();
            let analysis_period = period.clone();
            let result =
                tokio::task::spawn_blocking(move || analyzer.analyze(&analysis_period, &records))
                    .await
                    .map_err(|e| RuntimeError::TaskFailed(e.to_string()))?;

            match result {
                Ok(report) => {
                    info!(
                        scope = %scope,
                        period = %period,
                        buckets = report.buckets.len(),
                        slope = report.slope,
                        "Publishing calibration report"
                    );
                    self.reports.publish(scope, report);
                }
                Err(CalibrationError::InsufficientData { got, need }) => {
                    debug!(
                        scope = %scope,
                        period = %period,
                        got,
                        need,
                        "Not enough settled records for calibration"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// One pass of the health cycle.
    #[instrument(skip(self))]
    pub async fn health_cycle(&self) -> RuntimeResult<()> {
        self.aggregator.run_all().await?;
        Ok(())
    }

    // ── Reporting surface (side-effect-free reads) ──────────────────────

    /// Latest calibration report for a (scope, period).
    pub fn latest_calibration(&self, scope: &str, period: &str) -> Option<CalibrationReport> {
        self.reports.latest(scope, period)
    }

    /// (scope, period) keys with a published calibration report.
    pub fn calibration_keys(&self) -> Vec<(String, String)> {
        self.reports.keys()
    }

    /// Anomalies matching the filter, active first.
    pub fn anomalies(&self, filter: AnomalyFilter) -> RuntimeResult<Vec<AnomalyRecord>> {
        Ok(self.detector.anomalies(filter)?)
    }

    /// Currently active anomalies.
    pub fn active_anomalies(&self) -> Vec<AnomalyRecord> {
        self.detector.active_anomalies()
    }

    /// Baseline snapshot for a metric.
    pub fn baseline(&self, metric_name: &str) -> Option<Baseline> {
        self.detector.baseline(metric_name)
    }

    /// Action run history, oldest first.
    pub fn action_history(&self) -> RuntimeResult<Vec<ActionRun>> {
        Ok(self.orchestrator.history()?)
    }

    /// Statistics for every (action, target) pair that has run.
    pub fn action_stats(&self) -> Vec<ActionStatsSnapshot> {
        self.orchestrator.all_stats()
    }

    /// Latest health snapshot, if a health cycle has run.
    pub fn health(&self) -> RuntimeResult<Option<HealthSnapshot>> {
        Ok(self.aggregator.latest()?)
    }

    // ── Operator surface ────────────────────────────────────────────────

    /// Manually trigger a named action; enforces the same checks as the
    /// automatic path.
    pub async fn trigger_action(&self, name: &str, target: &str) -> RuntimeResult<TriggerOutcome> {
        Ok(self.orchestrator.trigger_by_name(name, target).await?)
    }

    /// Re-enable a disabled action and clear its failure streak.
    pub fn reset_action(&self, name: &str, target: &str) -> bool {
        self.orchestrator.reset(name, target)
    }

    /// Subscribe to healing lifecycle events.
    pub fn healing_events(&self) -> tokio::sync::broadcast::Receiver<HealingEvent> {
        self.orchestrator.subscribe()
    }
}

impl Drop for Brainstem {
    fn drop(&mut self) {
        for task in self.tasks.iter() {
            task.value().abort();
        }
    }
}
