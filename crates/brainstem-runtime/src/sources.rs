//! External collaborator traits.
//!
//! Metric ingestion and outcome settlement are external systems. The
//! runtime consumes them through these traits so deployments can plug in
//! whatever transport they have - and tests can plug in queues.

use async_trait::async_trait;

use brainstem_calibration::OutcomeRecord;
use brainstem_types::MetricSample;

use crate::error::RuntimeResult;

/// Pull-based feed of metric samples.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Samples that arrived since the previous poll. An empty vec is a
    /// normal quiet cycle, not an error.
    async fn poll(&self) -> RuntimeResult<Vec<MetricSample>>;
}

/// One scope's worth of settled records for a period.
#[derive(Clone, Debug)]
pub struct OutcomeBatch {
    /// Report scope, e.g. a sport id or `overall`.
    pub scope: String,

    /// Period label the records cover, e.g. `last_30d`.
    pub period: String,

    /// The settled records.
    pub records: Vec<OutcomeRecord>,
}

/// Feed of settled prediction outcomes, grouped into report batches.
#[async_trait]
pub trait OutcomeSource: Send + Sync {
    /// Batches to analyze this cycle. Each (scope, period) batch produces
    /// one report that supersedes the previous one under the same key.
    async fn fetch(&self) -> RuntimeResult<Vec<OutcomeBatch>>;
}
