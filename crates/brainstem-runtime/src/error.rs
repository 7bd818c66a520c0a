//! Runtime error types.

use thiserror::Error;

/// Result alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors surfaced by the control-loop runtime.
///
/// Every variant is a local fault: a cycle that hits one logs it and keeps
/// looping. Nothing here is fatal to the host process.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Anomaly detection fault.
    #[error(transparent)]
    Anomaly(#[from] brainstem_anomaly::AnomalyError),

    /// Healing fault.
    #[error(transparent)]
    Healing(#[from] brainstem_healing::HealingError),

    /// Health aggregation fault.
    #[error(transparent)]
    Health(#[from] brainstem_health::HealthError),

    /// Calibration fault.
    #[error(transparent)]
    Calibration(#[from] brainstem_calibration::CalibrationError),

    /// A metric or outcome source failed to deliver.
    #[error("source failed: {0}")]
    Source(String),

    /// An offloaded analysis task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskFailed(String),
}
