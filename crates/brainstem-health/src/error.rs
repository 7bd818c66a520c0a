//! Health aggregation error types.

use thiserror::Error;

/// Result alias for health operations.
pub type HealthResult<T> = Result<T, HealthError>;

/// Errors surfaced by probes and the aggregator.
#[derive(Debug, Error)]
pub enum HealthError {
    /// A probe could not produce a reading. Recovered into a synthetic
    /// `error` result by the aggregator, never propagated out of `run_all`.
    #[error("probe for component '{component}' failed: {reason}")]
    ProbeFailed { component: String, reason: String },

    /// A shared-state lock was poisoned by a panicking writer.
    #[error("health snapshot lock poisoned")]
    LockPoisoned,
}
