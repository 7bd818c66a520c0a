//! Latest-report store for the reporting surface.

use dashmap::DashMap;

use brainstem_calibration::CalibrationReport;

/// Holds the most recent calibration report per (scope, period).
///
/// Reports are superseded wholesale: publishing under an existing key
/// replaces the old report, never merges into it.
#[derive(Default)]
pub struct ReportStore {
    reports: DashMap<(String, String), CalibrationReport>,
}

impl ReportStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            reports: DashMap::new(),
        }
    }

    /// Publish a report, superseding any previous one for the key.
    pub fn publish(&self, scope: impl Into<String>, report: CalibrationReport) {
        self.reports
            .insert((scope.into(), report.period.clone()), report);
    }

    /// Latest report for a (scope, period), if one has been published.
    pub fn latest(&self, scope: &str, period: &str) -> Option<CalibrationReport> {
        self.reports
            .get(&(scope.to_string(), period.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// All (scope, period) keys with a published report.
    pub fn keys(&self) -> Vec<(String, String)> {
        self.reports.iter().map(|entry| entry.key().clone()).collect()
    }
}
