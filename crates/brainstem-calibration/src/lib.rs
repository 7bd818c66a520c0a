//! Brainstem Calibration - Prediction-vs-outcome statistics
//!
//! Compares predicted probabilities against realized outcomes in fixed-width
//! probability buckets and fits a linear calibration regression across them.
//!
//! ## Reading the numbers
//!
//! - `slope > 1`: overconfident - predictions are more extreme than reality
//! - `slope < 1`: underconfident - predictions are too timid
//! - `slope = 1, intercept = 0`: perfect calibration
//! - per-bucket `barrier_score`: calibration quality, 1.0 at zero deviation,
//!   0.0 at or beyond the configured deviation ceiling
//!
//! ## Purity
//!
//! [`CalibrationAnalyzer::analyze`] has no side effects and no internal
//! state: the same records always produce the same report, so it is safe to
//! re-run on every cycle and cheap to property-test.
//!
//! ## Example
//!
//! ```rust
//! use brainstem_calibration::{CalibrationAnalyzer, CalibrationConfig, OutcomeRecord};
//!
//! let analyzer = CalibrationAnalyzer::new(CalibrationConfig::default());
//! let records: Vec<OutcomeRecord> = (0..40)
//!     .map(|i| OutcomeRecord::new(0.6, i % 2 == 0, 100.0, if i % 2 == 0 { 190.0 } else { 0.0 }))
//!     .collect();
//!
//! let report = analyzer.analyze("2026-07", &records).unwrap();
//! assert_eq!(report.total_samples, 40);
//! ```

#![deny(unsafe_code)]

pub mod analyzer;
pub mod config;
pub mod error;
pub mod record;
pub mod report;

// Re-export main types
pub use analyzer::CalibrationAnalyzer;
pub use config::CalibrationConfig;
pub use error::{CalibrationError, CalibrationResult};
pub use record::OutcomeRecord;
pub use report::{BucketRange, CalibrationBucket, CalibrationReport};
