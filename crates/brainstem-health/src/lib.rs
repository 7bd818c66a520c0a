//! Brainstem Health - Component health probes and aggregation
//!
//! Read-only health probes run concurrently across the service's named
//! components and reduce to a single snapshot:
//!
//! - **Overall score**: weighted mean of per-component scores (weights are
//!   configurable, default 1.0 each).
//! - **Overall status**: worst observed status - any `critical` forces the
//!   whole service critical, any probe error forces `error`. Never averaged.
//!
//! A probe that times out or fails produces a synthetic zero-score `error`
//! result; the aggregation itself never aborts.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use brainstem_health::{HealthAggregator, HealthConfig, HealthProbe, HealthResult};
//! use brainstem_types::{HealthCheckResult, HealthStatus};
//!
//! struct QueueProbe;
//!
//! #[async_trait]
//! impl HealthProbe for QueueProbe {
//!     fn component(&self) -> &str {
//!         "queue"
//!     }
//!
//!     async fn check(&self) -> HealthResult<HealthCheckResult> {
//!         Ok(HealthCheckResult::new(
//!             "queue",
//!             HealthStatus::Healthy,
//!             0.98,
//!             Duration::from_millis(2),
//!         ))
//!     }
//! }
//!
//! # async fn example() {
//! let mut aggregator = HealthAggregator::new(HealthConfig::default());
//! aggregator.add_probe(Arc::new(QueueProbe));
//!
//! let snapshot = aggregator.run_all().await.unwrap();
//! assert_eq!(snapshot.overall_status, HealthStatus::Healthy);
//! # }
//! ```

#![deny(unsafe_code)]

pub mod aggregator;
pub mod error;
pub mod probe;

// Re-export main types
pub use aggregator::{HealthAggregator, HealthConfig, HealthSnapshot};
pub use error::{HealthError, HealthResult};
pub use probe::HealthProbe;
