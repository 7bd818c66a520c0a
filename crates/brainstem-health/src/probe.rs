//! The health probe trait.

use async_trait::async_trait;

use brainstem_types::HealthCheckResult;

use crate::error::HealthResult;

/// A read-only health check against one named component.
///
/// Probes may perform I/O (ping a database, stat a queue) but must not
/// mutate anything - remediation belongs to the healing orchestrator, not
/// here. The aggregator runs every registered probe concurrently under its
/// own timeout.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Component this probe examines, e.g. `database` or `prediction_feed`.
    fn component(&self) -> &str;

    /// Take one reading.
    ///
    /// An `Err` is recovered by the aggregator into a synthetic zero-score
    /// `error` result; prefer returning a scored `critical`/`warning`
    /// result when the component is reachable but degraded.
    async fn check(&self) -> HealthResult<HealthCheckResult>;
}
