//! The anomaly detector state machine.

use std::collections::VecDeque;
use std::sync::RwLock;

use dashmap::DashMap;
use tracing::{debug, info, instrument};

use brainstem_types::{AnomalyFilter, AnomalyRecord, AnomalySeverity, Baseline, MetricSample};

use crate::baseline::BaselineWindow;
use crate::config::{AnomalyConfig, SeverityThresholds};
use crate::error::{AnomalyError, AnomalyResult};

/// What one observed sample did to the per-metric state machine.
#[derive(Clone, Debug)]
pub enum Detection {
    /// Within threshold, or still warming up the baseline.
    Normal,
    /// A new anomaly was opened for the metric.
    Opened(AnomalyRecord),
    /// The already-active anomaly was refreshed in place.
    Refreshed(AnomalyRecord),
    /// The active anomaly was closed by a sample back within threshold.
    Resolved(AnomalyRecord),
}

impl Detection {
    /// The anomaly record carried by this detection, when there is one.
    pub fn record(&self) -> Option<&AnomalyRecord> {
        match self {
            Self::Normal => None,
            Self::Opened(r) | Self::Refreshed(r) | Self::Resolved(r) => Some(r),
        }
    }

    /// Whether this detection should be considered for healing.
    pub fn is_breach(&self) -> bool {
        matches!(self, Self::Opened(_) | Self::Refreshed(_))
    }
}

/// Per-metric baseline window plus the at-most-one active anomaly.
struct MetricState {
    window: BaselineWindow,
    active: Option<AnomalyRecord>,
}

/// Compares incoming samples to rolling baselines and manages the anomaly
/// lifecycle.
pub struct AnomalyDetector {
    config: AnomalyConfig,

    /// Per-metric state, keyed by metric name.
    metrics: DashMap<String, MetricState>,

    /// Resolved anomalies, newest last, bounded by `max_history`.
    history: RwLock<VecDeque<AnomalyRecord>>,
}

impl AnomalyDetector {
    /// Create a detector with the given configuration.
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            metrics: DashMap::new(),
            history: RwLock::new(VecDeque::new()),
        }
    }

    /// Feed one sample through the state machine.
    ///
    /// The sample is evaluated against the baseline of the samples before
    /// it, then folded into the window - so the baseline adapts on every
    /// sample, breaching or not.
    #[instrument(skip(self, sample), fields(metric = %sample.metric_name, value = sample.value))]
    pub fn observe(&self, sample: &MetricSample) -> AnomalyResult<Detection> {
        let mut state = self
            .metrics
            .entry(sample.metric_name.clone())
            .or_insert_with(|| MetricState {
                window: BaselineWindow::new(self.config.window),
                active: None,
            });

        // Evaluate against the prior window before this sample joins it.
        let prior_mean = if state.window.len() >= self.config.min_samples {
            state.window.mean()
        } else {
            None
        };

        state.window.push(sample.value);

        let mean = match prior_mean {
            // A near-zero baseline makes relative change meaningless; such
            // samples only build the baseline.
            Some(mean) if mean.abs() > 1e-9 => mean,
            _ => return Ok(Detection::Normal),
        };

        let change_pct = (sample.value - mean) / mean * 100.0;
        let severity = classify(change_pct.abs(), &self.config.thresholds);

        match severity {
            Some(severity) => {
                if let Some(active) = state.active.as_mut() {
                    active.current_value = sample.value;
                    active.change_pct = change_pct;
                    // Escalate but never quietly downgrade a live anomaly.
                    active.severity = active.severity.max(severity);
                    debug!(
                        change_pct,
                        severity = %active.severity,
                        "Refreshed active anomaly"
                    );
                    Ok(Detection::Refreshed(active.clone()))
                } else {
                    let record = AnomalyRecord::open(
                        sample.metric_name.clone(),
                        mean,
                        sample.value,
                        change_pct,
                        severity,
                    );
                    info!(
                        anomaly_id = %record.id,
                        baseline = mean,
                        value = sample.value,
                        change_pct,
                        severity = %severity,
                        "Opened anomaly"
                    );
                    state.active = Some(record.clone());
                    Ok(Detection::Opened(record))
                }
            }
            None => {
                if let Some(mut active) = state.active.take() {
                    active.resolve();
                    info!(
                        anomaly_id = %active.id,
                        value = sample.value,
                        "Anomaly resolved by recovering sample"
                    );
                    drop(state);
                    self.push_history(active.clone())?;
                    Ok(Detection::Resolved(active))
                } else {
                    Ok(Detection::Normal)
                }
            }
        }
    }

    /// Fast-path resolution after a successful healing action against the
    /// metric's target - no need to wait for the next sample.
    #[instrument(skip(self))]
    pub fn resolve_for_metric(&self, metric_name: &str) -> AnomalyResult<Option<AnomalyRecord>> {
        let resolved = {
            let mut state = match self.metrics.get_mut(metric_name) {
                Some(state) => state,
                None => return Ok(None),
            };
            match state.active.take() {
                Some(mut active) => {
                    active.resolve();
                    active
                }
                None => return Ok(None),
            }
        };

        info!(
            anomaly_id = %resolved.id,
            metric = metric_name,
            "Anomaly resolved by healing action"
        );
        self.push_history(resolved.clone())?;
        Ok(Some(resolved))
    }

    /// Currently active anomalies across all metrics.
    pub fn active_anomalies(&self) -> Vec<AnomalyRecord> {
        self.metrics
            .iter()
            .filter_map(|entry| entry.value().active.clone())
            .collect()
    }

    /// Active and resolved anomalies matching the filter, active first.
    pub fn anomalies(&self, filter: AnomalyFilter) -> AnomalyResult<Vec<AnomalyRecord>> {
        let mut records: Vec<AnomalyRecord> = self
            .active_anomalies()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();

        let history = self.history.read().map_err(|_| AnomalyError::LockPoisoned)?;
        records.extend(history.iter().filter(|r| filter.matches(r)).cloned());
        Ok(records)
    }

    /// Baseline snapshot for one metric, if it has any samples.
    pub fn baseline(&self, metric_name: &str) -> Option<Baseline> {
        self.metrics
            .get(metric_name)
            .and_then(|state| state.window.snapshot(metric_name))
    }

    fn push_history(&self, record: AnomalyRecord) -> AnomalyResult<()> {
        let mut history = self.history.write().map_err(|_| AnomalyError::LockPoisoned)?;
        if history.len() == self.config.max_history {
            history.pop_front();
        }
        history.push_back(record);
        Ok(())
    }
}

/// Map an absolute percentage change to a severity, if it breaches at all.
fn classify(change_abs_pct: f64, thresholds: &SeverityThresholds) -> Option<AnomalySeverity> {
    if change_abs_pct >= thresholds.high_pct {
        Some(AnomalySeverity::High)
    } else if change_abs_pct >= thresholds.medium_pct {
        Some(AnomalySeverity::Medium)
    } else if change_abs_pct >= thresholds.low_pct {
        Some(AnomalySeverity::Low)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainstem_types::AnomalyStatus;

    fn feed(detector: &AnomalyDetector, metric: &str, value: f64, times: usize) {
        for _ in 0..times {
            detector.observe(&MetricSample::new(metric, value)).unwrap();
        }
    }

    #[test]
    fn warmup_never_breaches() {
        let detector = AnomalyDetector::new(AnomalyConfig::default());
        for _ in 0..9 {
            let detection = detector.observe(&MetricSample::new("hit_rate", 0.6)).unwrap();
            assert!(matches!(detection, Detection::Normal));
        }
        // Even a wild value during warmup is just baseline material.
        let detection = detector.observe(&MetricSample::new("hit_rate", 10.0)).unwrap();
        assert!(matches!(detection, Detection::Normal));
    }

    #[test]
    fn hit_rate_drop_opens_anomaly() {
        // Deployment tuned to treat a 40% swing as high severity.
        let config = AnomalyConfig {
            thresholds: SeverityThresholds {
                low_pct: 10.0,
                medium_pct: 25.0,
                high_pct: 40.0,
            },
            ..Default::default()
        };
        let detector = AnomalyDetector::new(config);
        feed(&detector, "hit_rate", 0.60, 20);

        let detection = detector.observe(&MetricSample::new("hit_rate", 0.35)).unwrap();
        let record = match detection {
            Detection::Opened(record) => record,
            other => panic!("expected Opened, got {other:?}"),
        };

        assert!((record.change_pct + 41.7).abs() < 0.1, "{}", record.change_pct);
        assert_eq!(record.severity, AnomalySeverity::High);
        assert!((record.baseline_value - 0.60).abs() < 1e-9);
        assert_eq!(detector.active_anomalies().len(), 1);
    }

    #[test]
    fn default_thresholds_classify_41_pct_as_medium() {
        let detector = AnomalyDetector::new(AnomalyConfig::default());
        feed(&detector, "hit_rate", 0.60, 20);

        let detection = detector.observe(&MetricSample::new("hit_rate", 0.35)).unwrap();
        assert_eq!(
            detection.record().unwrap().severity,
            AnomalySeverity::Medium
        );
    }

    #[test]
    fn second_breach_refreshes_in_place() {
        let detector = AnomalyDetector::new(AnomalyConfig::default());
        feed(&detector, "error_rate", 1.0, 20);

        let first = detector.observe(&MetricSample::new("error_rate", 1.4)).unwrap();
        let opened_id = first.record().unwrap().id.clone();
        assert!(matches!(first, Detection::Opened(_)));

        let second = detector.observe(&MetricSample::new("error_rate", 2.5)).unwrap();
        let record = match second {
            Detection::Refreshed(record) => record,
            other => panic!("expected Refreshed, got {other:?}"),
        };

        // Same record, updated values, escalated severity.
        assert_eq!(record.id, opened_id);
        assert_eq!(record.current_value, 2.5);
        assert_eq!(record.severity, AnomalySeverity::High);
        assert_eq!(detector.active_anomalies().len(), 1);
    }

    #[test]
    fn never_two_active_for_one_metric() {
        let detector = AnomalyDetector::new(AnomalyConfig::default());
        feed(&detector, "latency_ms", 100.0, 20);

        // A storm of breaching samples in both directions.
        for value in [160.0, 40.0, 200.0, 155.0, 30.0, 180.0] {
            detector.observe(&MetricSample::new("latency_ms", value)).unwrap();
            assert!(detector.active_anomalies().len() <= 1);
        }
        assert_eq!(detector.active_anomalies().len(), 1);
    }

    #[test]
    fn recovering_sample_resolves() {
        let detector = AnomalyDetector::new(AnomalyConfig::default());
        feed(&detector, "hit_rate", 0.60, 20);

        detector.observe(&MetricSample::new("hit_rate", 0.35)).unwrap();
        assert_eq!(detector.active_anomalies().len(), 1);

        // Back near the (slightly adapted) baseline.
        let detection = detector.observe(&MetricSample::new("hit_rate", 0.59)).unwrap();
        let record = match detection {
            Detection::Resolved(record) => record,
            other => panic!("expected Resolved, got {other:?}"),
        };

        assert_eq!(record.status, AnomalyStatus::Resolved);
        assert!(record.resolved_at.is_some());
        assert!(detector.active_anomalies().is_empty());

        // The resolved record is queryable through the filter.
        let resolved = detector.anomalies(AnomalyFilter::Resolved).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, record.id);
    }

    #[test]
    fn persistent_step_change_converges() {
        let config = AnomalyConfig {
            window: 10,
            min_samples: 5,
            ..Default::default()
        };
        let detector = AnomalyDetector::new(config);
        feed(&detector, "memory_mb", 0.6, 10);

        let mut saw_open = false;
        let mut saw_resolve = false;
        for _ in 0..12 {
            match detector.observe(&MetricSample::new("memory_mb", 1.2)).unwrap() {
                Detection::Opened(_) => saw_open = true,
                Detection::Resolved(_) => saw_resolve = true,
                _ => {}
            }
        }

        // The baseline absorbed the new level instead of alarming forever.
        assert!(saw_open);
        assert!(saw_resolve);
        assert!(detector.active_anomalies().is_empty());
    }

    #[test]
    fn healing_fast_path_resolves() {
        let detector = AnomalyDetector::new(AnomalyConfig::default());
        feed(&detector, "db_connections", 50.0, 20);
        detector.observe(&MetricSample::new("db_connections", 90.0)).unwrap();

        let resolved = detector.resolve_for_metric("db_connections").unwrap().unwrap();
        assert_eq!(resolved.status, AnomalyStatus::Resolved);
        assert!(detector.active_anomalies().is_empty());

        // Idempotent: nothing left to resolve.
        assert!(detector.resolve_for_metric("db_connections").unwrap().is_none());
        assert!(detector.resolve_for_metric("unknown_metric").unwrap().is_none());
    }

    #[test]
    fn near_zero_baseline_never_breaches() {
        let detector = AnomalyDetector::new(AnomalyConfig::default());
        feed(&detector, "queue_depth", 0.0, 15);

        let detection = detector.observe(&MetricSample::new("queue_depth", 5.0)).unwrap();
        assert!(matches!(detection, Detection::Normal));
        assert!(detector.active_anomalies().is_empty());
    }

    #[test]
    fn baseline_snapshot_accessor() {
        let detector = AnomalyDetector::new(AnomalyConfig::default());
        assert!(detector.baseline("hit_rate").is_none());

        feed(&detector, "hit_rate", 0.6, 12);
        let baseline = detector.baseline("hit_rate").unwrap();
        assert_eq!(baseline.window_len, 12);
        assert!((baseline.mean - 0.6).abs() < 1e-9);
    }

    #[test]
    fn history_is_bounded() {
        let config = AnomalyConfig {
            window: 10,
            min_samples: 5,
            max_history: 3,
            ..Default::default()
        };
        let detector = AnomalyDetector::new(config);
        feed(&detector, "m", 1.0, 10);

        // Alternate breach and recovery to churn resolved records.
        for _ in 0..10 {
            detector.observe(&MetricSample::new("m", 2.0)).unwrap();
            for _ in 0..6 {
                detector.observe(&MetricSample::new("m", 1.0)).unwrap();
            }
        }

        let resolved = detector.anomalies(AnomalyFilter::Resolved).unwrap();
        assert!(resolved.len() <= 3);
    }
}
