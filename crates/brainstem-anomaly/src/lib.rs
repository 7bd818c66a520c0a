//! Brainstem Anomaly - Rolling baselines and metric anomaly detection
//!
//! Each incoming metric sample is compared against a rolling baseline of the
//! samples before it. A deviation beyond the configured thresholds opens an
//! anomaly record; a later sample back within threshold - or a successful
//! healing action - resolves it.
//!
//! ## Lifecycle guarantees
//!
//! - At most one active anomaly per metric. A second breach before
//!   resolution refreshes the active record in place instead of opening a
//!   duplicate.
//! - The baseline is recomputed on every sample, breaching or not, so a
//!   persistent step change converges into the new normal instead of
//!   alarming forever.
//!
//! ## Example
//!
//! ```rust
//! use brainstem_anomaly::{AnomalyConfig, AnomalyDetector, Detection};
//! use brainstem_types::MetricSample;
//!
//! let detector = AnomalyDetector::new(AnomalyConfig::default());
//!
//! // Build a baseline around 0.60.
//! for _ in 0..20 {
//!     detector.observe(&MetricSample::new("hit_rate", 0.60)).unwrap();
//! }
//!
//! // A 40%+ drop breaches.
//! let detection = detector.observe(&MetricSample::new("hit_rate", 0.35)).unwrap();
//! assert!(matches!(detection, Detection::Opened(_)));
//! ```

#![deny(unsafe_code)]

pub mod baseline;
pub mod config;
pub mod detector;
pub mod error;

// Re-export main types
pub use baseline::BaselineWindow;
pub use config::{AnomalyConfig, SeverityThresholds};
pub use detector::{AnomalyDetector, Detection};
pub use error::{AnomalyError, AnomalyResult};
