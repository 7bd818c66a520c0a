//! The health aggregator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use brainstem_types::{HealthCheckResult, HealthStatus};

use crate::error::{HealthError, HealthResult};
use crate::probe::HealthProbe;

/// Aggregator configuration.
#[derive(Clone, Debug)]
pub struct HealthConfig {
    /// Deadline applied to each probe individually.
    pub probe_timeout: Duration,

    /// Per-component weights for the overall score. Components not listed
    /// weigh 1.0.
    pub weights: HashMap<String, f64>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            weights: HashMap::new(),
        }
    }
}

/// One aggregated view of service health.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Weighted mean of component scores, in [0, 1].
    pub overall_score: f64,

    /// Worst observed component status.
    pub overall_status: HealthStatus,

    /// Per-component probe results.
    pub components: Vec<HealthCheckResult>,

    /// When the aggregation ran.
    pub checked_at: DateTime<Utc>,
}

/// Runs registered probes concurrently and reduces them to one snapshot.
pub struct HealthAggregator {
    config: HealthConfig,
    probes: Vec<Arc<dyn HealthProbe>>,
    latest: RwLock<Option<HealthSnapshot>>,
}

impl HealthAggregator {
    /// Create an aggregator with no probes.
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            probes: Vec::new(),
            latest: RwLock::new(None),
        }
    }

    /// Register a probe. Probes are registered at startup; the set is
    /// read-only while the loop runs.
    pub fn add_probe(&mut self, probe: Arc<dyn HealthProbe>) {
        self.probes.push(probe);
    }

    /// Number of registered probes.
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Execute every probe concurrently and reduce to a snapshot.
    ///
    /// Individual probe timeouts and failures become synthetic `error`
    /// results; this method itself only fails on internal lock poisoning.
    #[instrument(skip(self), fields(probes = self.probes.len()))]
    pub async fn run_all(&self) -> HealthResult<HealthSnapshot> {
        let timeout = self.config.probe_timeout;

        let checks = self.probes.iter().map(|probe| {
            let probe = probe.clone();
            async move {
                let component = probe.component().to_string();
                let start = Instant::now();
                match tokio::time::timeout(timeout, probe.check()).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(e)) => {
                        warn!(component = %component, error = %e, "Health probe failed");
                        HealthCheckResult::probe_error(component, e.to_string(), start.elapsed())
                    }
                    Err(_) => {
                        warn!(
                            component = %component,
                            timeout_ms = timeout.as_millis() as u64,
                            "Health probe timed out"
                        );
                        HealthCheckResult::probe_error(
                            component,
                            format!("probe timed out after {}ms", timeout.as_millis()),
                            start.elapsed(),
                        )
                    }
                }
            }
        });

        let components: Vec<HealthCheckResult> = join_all(checks).await;

        let snapshot = self.reduce(components);
        debug!(
            score = snapshot.overall_score,
            status = %snapshot.overall_status,
            "Health aggregation complete"
        );

        let mut latest = self.latest.write().map_err(|_| HealthError::LockPoisoned)?;
        *latest = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Most recent snapshot, if an aggregation has run.
    pub fn latest(&self) -> HealthResult<Option<HealthSnapshot>> {
        let latest = self.latest.read().map_err(|_| HealthError::LockPoisoned)?;
        Ok(latest.clone())
    }

    /// Weighted-mean score plus worst-of status.
    fn reduce(&self, components: Vec<HealthCheckResult>) -> HealthSnapshot {
        if components.is_empty() {
            return HealthSnapshot {
                overall_score: 1.0,
                overall_status: HealthStatus::Healthy,
                components,
                checked_at: Utc::now(),
            };
        }

        let mut weight_total = 0.0;
        let mut weighted_score = 0.0;
        let mut overall_status = HealthStatus::Healthy;

        for result in &components {
            let weight = self
                .config
                .weights
                .get(&result.component)
                .copied()
                .unwrap_or(1.0);
            weight_total += weight;
            weighted_score += weight * result.score;
            overall_status = overall_status.max(result.status);
        }

        let overall_score = if weight_total > 0.0 {
            (weighted_score / weight_total).clamp(0.0, 1.0)
        } else {
            0.0
        };

        HealthSnapshot {
            overall_score,
            overall_status,
            components,
            checked_at: Utc::now(),
        }
    }
}
