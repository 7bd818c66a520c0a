//! Anomaly detection error types.

use thiserror::Error;

/// Result alias for anomaly detection operations.
pub type AnomalyResult<T> = Result<T, AnomalyError>;

/// Errors surfaced by the anomaly detector.
#[derive(Debug, Error)]
pub enum AnomalyError {
    /// The detector configuration is unusable.
    #[error("invalid anomaly config: {0}")]
    InvalidConfig(String),

    /// A shared-state lock was poisoned by a panicking writer.
    #[error("anomaly history lock poisoned")]
    LockPoisoned,
}
