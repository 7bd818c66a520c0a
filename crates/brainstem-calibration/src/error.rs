//! Calibration error types.

use thiserror::Error;

/// Result alias for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Errors surfaced by the calibration analyzer.
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// Not enough settled records to produce a statistically meaningful
    /// report. Callers must surface this distinctly from an all-clear report.
    #[error("insufficient data for calibration: got {got} records, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    /// A record from the settlement feed failed validation.
    #[error("invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// The analyzer configuration is unusable.
    #[error("invalid calibration config: {0}")]
    InvalidConfig(String),
}
