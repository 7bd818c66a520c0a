//! End-to-end tests of the assembled control loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use brainstem_anomaly::AnomalyConfig;
use brainstem_calibration::OutcomeRecord;
use brainstem_healing::{
    ActionRegistry, ActionTrigger, FailingExecutor, HealingAction, NoOpExecutor,
};
use brainstem_health::{HealthProbe, HealthResult};
use brainstem_runtime::{
    Brainstem, BrainstemConfig, MetricSource, OutcomeBatch, OutcomeSource, RuntimeResult,
};
use brainstem_types::{
    ActionResult, AnomalyFilter, AnomalySeverity, HealthCheckResult, HealthStatus, MetricSample,
};

/// Metric source that hands out pre-scripted batches, one per poll.
struct ScriptedMetrics {
    batches: Mutex<VecDeque<Vec<MetricSample>>>,
}

impl ScriptedMetrics {
    fn new(batches: impl IntoIterator<Item = Vec<MetricSample>>) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(batches.into_iter().collect()),
        })
    }
}

#[async_trait]
impl MetricSource for ScriptedMetrics {
    async fn poll(&self) -> RuntimeResult<Vec<MetricSample>> {
        Ok(self
            .batches
            .lock()
            .expect("batches lock")
            .pop_front()
            .unwrap_or_default())
    }
}

/// Outcome source serving the same batches on every fetch.
struct StaticOutcomes {
    batches: Vec<OutcomeBatch>,
}

#[async_trait]
impl OutcomeSource for StaticOutcomes {
    async fn fetch(&self) -> RuntimeResult<Vec<OutcomeBatch>> {
        Ok(self.batches.clone())
    }
}

struct StaticProbe {
    component: &'static str,
    status: HealthStatus,
    score: f64,
}

#[async_trait]
impl HealthProbe for StaticProbe {
    fn component(&self) -> &str {
        self.component
    }

    async fn check(&self) -> HealthResult<HealthCheckResult> {
        Ok(HealthCheckResult::new(
            self.component,
            self.status,
            self.score,
            Duration::from_millis(1),
        ))
    }
}

fn pool_action() -> HealingAction {
    HealingAction {
        name: "increase_database_pool_size".into(),
        target: "database".into(),
        trigger: ActionTrigger::new("db_connection_wait_ms", AnomalySeverity::Medium),
        cooldown: Duration::ZERO,
        timeout: Duration::from_secs(5),
        max_consecutive_failures: 3,
    }
}

fn fast_config() -> BrainstemConfig {
    BrainstemConfig {
        anomaly: AnomalyConfig {
            window: 20,
            min_samples: 5,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn wait_metric_batches() -> Vec<Vec<MetricSample>> {
    let baseline: Vec<MetricSample> = (0..10)
        .map(|_| MetricSample::new("db_connection_wait_ms", 10.0))
        .collect();
    let breach = vec![MetricSample::new("db_connection_wait_ms", 20.0)];
    vec![baseline, breach]
}

#[tokio::test]
async fn breach_heals_and_fast_path_resolves() {
    let mut registry = ActionRegistry::new();
    registry.register(pool_action(), Arc::new(NoOpExecutor));

    let brainstem = Brainstem::new(
        fast_config(),
        Arc::new(registry),
        vec![],
        ScriptedMetrics::new(wait_metric_batches()),
        Arc::new(StaticOutcomes { batches: vec![] }),
    );

    // First cycle builds the baseline, second carries the breach.
    brainstem.control_cycle().await.expect("baseline cycle");
    brainstem.control_cycle().await.expect("breach cycle");

    let history = brainstem.action_history().expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].result, ActionResult::Success);
    assert_eq!(history[0].action_name, "increase_database_pool_size");

    // The successful run resolved the anomaly without waiting for the next
    // sample.
    assert!(brainstem.active_anomalies().is_empty());
    let resolved = brainstem.anomalies(AnomalyFilter::Resolved).expect("filter");
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].metric_name, "db_connection_wait_ms");

    let stats = brainstem.action_stats();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].success_rate, Some(1.0));
}

#[tokio::test]
async fn failed_remediation_leaves_anomaly_active() {
    let mut registry = ActionRegistry::new();
    registry.register(pool_action(), Arc::new(FailingExecutor::new("pool is pinned")));

    let brainstem = Brainstem::new(
        fast_config(),
        Arc::new(registry),
        vec![],
        ScriptedMetrics::new(wait_metric_batches()),
        Arc::new(StaticOutcomes { batches: vec![] }),
    );

    brainstem.control_cycle().await.expect("baseline cycle");
    brainstem.control_cycle().await.expect("breach cycle");

    let history = brainstem.action_history().expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].result, ActionResult::Failure);

    // No fast-path resolution on failure.
    assert_eq!(brainstem.active_anomalies().len(), 1);
}

#[tokio::test]
async fn unmatched_anomaly_stays_active_without_runs() {
    let brainstem = Brainstem::new(
        fast_config(),
        Arc::new(ActionRegistry::new()),
        vec![],
        ScriptedMetrics::new(wait_metric_batches()),
        Arc::new(StaticOutcomes { batches: vec![] }),
    );

    brainstem.control_cycle().await.expect("baseline cycle");
    brainstem.control_cycle().await.expect("breach cycle");

    assert_eq!(brainstem.active_anomalies().len(), 1);
    assert!(brainstem.action_history().expect("history").is_empty());
}

#[tokio::test]
async fn calibration_cycle_publishes_per_scope_reports() {
    let nba_records: Vec<OutcomeRecord> = (0..40)
        .map(|i| OutcomeRecord::new(0.55, i % 2 == 0, 100.0, if i % 2 == 0 { 200.0 } else { 0.0 }))
        .collect();
    // Below the 20-record floor: no report for this scope.
    let nfl_records: Vec<OutcomeRecord> =
        (0..5).map(|_| OutcomeRecord::new(0.7, true, 100.0, 150.0)).collect();

    let outcomes = StaticOutcomes {
        batches: vec![
            OutcomeBatch {
                scope: "nba".into(),
                period: "last_30d".into(),
                records: nba_records,
            },
            OutcomeBatch {
                scope: "nfl".into(),
                period: "last_30d".into(),
                records: nfl_records,
            },
        ],
    };

    let brainstem = Brainstem::new(
        BrainstemConfig::default(),
        Arc::new(ActionRegistry::new()),
        vec![],
        ScriptedMetrics::new(vec![]),
        Arc::new(outcomes),
    );

    brainstem.calibration_cycle().await.expect("calibration cycle");

    let report = brainstem
        .latest_calibration("nba", "last_30d")
        .expect("nba report");
    assert_eq!(report.total_samples, 40);
    assert!((report.roi_percent - 0.0).abs() < 1e-9);

    assert!(brainstem.latest_calibration("nfl", "last_30d").is_none());
    assert_eq!(brainstem.calibration_keys().len(), 1);

    // A rerun supersedes rather than merges.
    brainstem.calibration_cycle().await.expect("second cycle");
    assert_eq!(brainstem.calibration_keys().len(), 1);
}

#[tokio::test]
async fn health_cycle_caches_worst_of_snapshot() {
    let probes: Vec<Arc<dyn HealthProbe>> = vec![
        Arc::new(StaticProbe {
            component: "api",
            status: HealthStatus::Healthy,
            score: 0.95,
        }),
        Arc::new(StaticProbe {
            component: "database",
            status: HealthStatus::Critical,
            score: 0.1,
        }),
    ];

    let brainstem = Brainstem::new(
        BrainstemConfig::default(),
        Arc::new(ActionRegistry::new()),
        probes,
        ScriptedMetrics::new(vec![]),
        Arc::new(StaticOutcomes { batches: vec![] }),
    );

    assert!(brainstem.health().expect("health read").is_none());
    brainstem.health_cycle().await.expect("health cycle");

    let snapshot = brainstem.health().expect("health read").expect("snapshot");
    assert_eq!(snapshot.overall_status, HealthStatus::Critical);
    assert_eq!(snapshot.components.len(), 2);
}

#[tokio::test]
async fn manual_trigger_and_reset_through_the_surface() {
    let mut registry = ActionRegistry::new();
    registry.register(pool_action(), Arc::new(FailingExecutor::new("still pinned")));

    let brainstem = Brainstem::new(
        fast_config(),
        Arc::new(registry),
        vec![],
        ScriptedMetrics::new(vec![]),
        Arc::new(StaticOutcomes { batches: vec![] }),
    );

    for _ in 0..3 {
        brainstem
            .trigger_action("increase_database_pool_size", "database")
            .await
            .expect("manual trigger");
    }

    // The ceiling is crossed; the manual path now refuses loudly.
    let err = brainstem
        .trigger_action("increase_database_pool_size", "database")
        .await
        .expect_err("disabled action must refuse");
    assert!(err.to_string().contains("disabled"));

    assert!(brainstem.reset_action("increase_database_pool_size", "database"));
    brainstem
        .trigger_action("increase_database_pool_size", "database")
        .await
        .expect("re-enabled trigger");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cycles_run_in_background_until_shutdown() {
    let probes: Vec<Arc<dyn HealthProbe>> = vec![Arc::new(StaticProbe {
        component: "api",
        status: HealthStatus::Healthy,
        score: 1.0,
    })];

    let config = BrainstemConfig {
        control_interval: Duration::from_millis(10),
        calibration_interval: Duration::from_millis(10),
        health_interval: Duration::from_millis(10),
        ..fast_config()
    };

    let brainstem = Arc::new(Brainstem::new(
        config,
        Arc::new(ActionRegistry::new()),
        probes,
        ScriptedMetrics::new(vec![]),
        Arc::new(StaticOutcomes { batches: vec![] }),
    ));

    brainstem.clone().start();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The health cycle has run at least once on its own schedule.
    assert!(brainstem.health().expect("health read").is_some());

    brainstem.shutdown();
}
